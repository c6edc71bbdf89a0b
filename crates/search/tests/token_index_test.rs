//! Token index over a mixed batch of products

use catalog_search::{
    build_token_index, LanguageAnalyzer, Manufacturer, PassThroughFilter, SearchAnalyzer,
    SearchContext, SearchableProduct, StopwordFilter, TokenScoreMap, WhitespaceTokenizer,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;

fn english() -> SearchContext {
    SearchContext::new(1, "en")
}

fn analyzer() -> LanguageAnalyzer {
    let filter = StopwordFilter::new(3).with_stopwords("en", ["the", "and", "for"]);
    LanguageAnalyzer::new(Arc::new(WhitespaceTokenizer::default()), Arc::new(filter))
}

#[test]
fn test_missing_products_are_skipped() {
    let shoes = SearchableProduct::new(3, "Red Shoes").with_description("best shoes ever");
    let lamp = SearchableProduct::new(7, "Desk Lamp");

    let index = build_token_index(
        &analyzer(),
        [(3, Some(&shoes)), (5, None), (7, Some(&lamp))],
        &english(),
    );

    assert_eq!(index.entries.keys().copied().collect::<Vec<_>>(), vec![3, 7]);
    assert_eq!(index.skipped, vec![5]);
    assert_eq!(index.entries[&3].get("shoes"), Some(500.0));
    assert_eq!(index.entries[&7].get("lamp"), Some(500.0));
    assert_eq!(index.token_count(), 6);
}

#[test]
fn test_score_is_maximum_over_sources() {
    let product = SearchableProduct::new(1, "Trail Runner")
        .with_keywords("running trail")
        .with_meta_title("Trail Runner by Acme")
        .with_description("The runner for the trail and the road")
        .with_manufacturer(Manufacturer {
            name: "Acme".to_string(),
            meta_title: Some("Acme running".to_string()),
        });

    let map = analyzer().analyze(&product, &english());

    let expected: TokenScoreMap = [
        ("trail".to_string(), 500.0),
        ("runner".to_string(), 500.0),
        ("running".to_string(), 400.0),
        ("by".to_string(), 200.0),
        ("acme".to_string(), 200.0),
        ("road".to_string(), 5.0),
    ]
    .into_iter()
    .collect();
    assert_eq!(map, expected);
}

#[test]
fn test_filter_context_selects_stopwords() {
    let product = SearchableProduct::new(1, "Lamp").with_description("und the glow");
    let filter = StopwordFilter::new(0)
        .with_stopwords("en", ["the"])
        .with_stopwords("de", ["und"]);
    let analyzer = LanguageAnalyzer::new(
        Arc::new(WhitespaceTokenizer::default()),
        Arc::new(filter),
    );

    let english = analyzer.analyze(&product, &english());
    let german = analyzer.analyze(&product, &SearchContext::new(2, "de"));

    assert!(english.contains("und") && !english.contains("the"));
    assert!(german.contains("the") && !german.contains("und"));
}

#[test]
fn test_analyzer_usable_as_trait_object() {
    let analyzer: Arc<dyn SearchAnalyzer> = Arc::new(LanguageAnalyzer::new(
        Arc::new(WhitespaceTokenizer::default()),
        Arc::new(PassThroughFilter),
    ));
    let product = SearchableProduct::new(1, "Chair");

    let index = build_token_index(analyzer.as_ref(), [(1, Some(&product))], &english());
    assert_eq!(index.entries[&1].get("chair"), Some(500.0));
    assert!(index.skipped.is_empty());
}
