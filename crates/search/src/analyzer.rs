//! Token ranking analysis

use crate::filter::{SearchContext, SearchFilter};
use crate::product::SearchableProduct;
use crate::tokenizer::Tokenizer;
use crate::tokens::{RankedField, TokenScoreMap};
use catalog_core::error::{Error, Result};
use std::sync::Arc;

/// Builds the weighted token map of a product
pub trait SearchAnalyzer: Send + Sync {
    fn analyze(&self, product: &SearchableProduct, context: &SearchContext) -> TokenScoreMap;

    /// Analyze a product that may be missing, failing with `Error::InvalidInput` if it is
    fn try_analyze(
        &self,
        product: Option<&SearchableProduct>,
        context: &SearchContext,
    ) -> Result<TokenScoreMap> {
        let product =
            product.ok_or_else(|| Error::invalid_input("Cannot analyze a missing product"))?;
        Ok(self.analyze(product, context))
    }
}

/// Scores each text field at its [`RankedField`] weight
///
/// Only the description pair goes through the filter.
pub struct LanguageAnalyzer {
    tokenizer: Arc<dyn Tokenizer>,
    filter: Arc<dyn SearchFilter>,
}

impl LanguageAnalyzer {
    pub fn new(tokenizer: Arc<dyn Tokenizer>, filter: Arc<dyn SearchFilter>) -> Self {
        Self { tokenizer, filter }
    }

    fn tokenize(&self, text: Option<&str>) -> Vec<String> {
        self.tokenizer.tokenize(text.unwrap_or_default())
    }
}

impl SearchAnalyzer for LanguageAnalyzer {
    fn analyze(&self, product: &SearchableProduct, context: &SearchContext) -> TokenScoreMap {
        let mut tokens = TokenScoreMap::new();

        let weighted = [
            (RankedField::Name, product.name.as_deref()),
            (RankedField::Keywords, product.keywords.as_deref()),
            (RankedField::MetaTitle, product.meta_title.as_deref()),
        ];
        for (field, text) in weighted {
            tokens.merge(self.tokenize(text), field.weight());
        }

        if let Some(manufacturer) = &product.manufacturer {
            tokens.merge(
                self.tokenize(Some(&manufacturer.name)),
                RankedField::ManufacturerName.weight(),
            );
            tokens.merge(
                self.tokenize(manufacturer.meta_title.as_deref()),
                RankedField::ManufacturerMetaTitle.weight(),
            );
        }

        let mut long_tokens = self.tokenize(product.description.as_deref());
        long_tokens.extend(self.tokenize(product.description_long.as_deref()));
        let long_tokens = self.filter.filter(long_tokens, context);
        tokens.merge(long_tokens, RankedField::Description.weight());

        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::{PassThroughFilter, StopwordFilter};
    use crate::product::Manufacturer;
    use crate::tokenizer::WhitespaceTokenizer;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex;

    fn analyzer(filter: Arc<dyn SearchFilter>) -> LanguageAnalyzer {
        LanguageAnalyzer::new(Arc::new(WhitespaceTokenizer::default()), filter)
    }

    fn context() -> SearchContext {
        SearchContext::new(1, "en")
    }

    fn scores(map: &TokenScoreMap) -> Vec<(String, f32)> {
        map.iter().map(|(t, s)| (t.to_string(), s)).collect()
    }

    /// Records every token list it is asked to filter
    #[derive(Default)]
    struct RecordingFilter(Mutex<Vec<Vec<String>>>);

    impl SearchFilter for RecordingFilter {
        fn filter(&self, tokens: Vec<String>, _context: &SearchContext) -> Vec<String> {
            self.0.lock().unwrap().push(tokens.clone());
            tokens
        }
    }

    #[test]
    fn test_name_beats_description() {
        let product = SearchableProduct::new(1, "Red Shoes").with_description("best shoes ever");

        let map = analyzer(Arc::new(PassThroughFilter)).analyze(&product, &context());

        assert_eq!(
            scores(&map),
            vec![
                ("red".to_string(), 500.0),
                ("shoes".to_string(), 500.0),
                ("best".to_string(), 5.0),
                ("ever".to_string(), 5.0),
            ]
        );
    }

    #[test]
    fn test_every_field_weight() {
        let product = SearchableProduct::new(1, "alpha")
            .with_keywords("bravo")
            .with_meta_title("charlie")
            .with_description("delta")
            .with_description_long("echo")
            .with_manufacturer(Manufacturer {
                name: "foxtrot".to_string(),
                meta_title: Some("golf".to_string()),
            });

        let map = analyzer(Arc::new(PassThroughFilter)).analyze(&product, &context());

        assert_eq!(map.get("alpha"), Some(500.0));
        assert_eq!(map.get("bravo"), Some(400.0));
        assert_eq!(map.get("charlie"), Some(200.0));
        assert_eq!(map.get("foxtrot"), Some(100.0));
        assert_eq!(map.get("golf"), Some(50.0));
        assert_eq!(map.get("delta"), Some(5.0));
        assert_eq!(map.get("echo"), Some(5.0));
        assert_eq!(map.len(), 7);
    }

    #[test]
    fn test_missing_manufacturer_adds_nothing() {
        let product = SearchableProduct::new(1, "lamp");

        let map = analyzer(Arc::new(PassThroughFilter)).analyze(&product, &context());
        assert_eq!(scores(&map), vec![("lamp".to_string(), 500.0)]);
    }

    #[test]
    fn test_descriptions_filtered_once_together() {
        let filter = Arc::new(RecordingFilter::default());
        let product = SearchableProduct::new(1, "Lamp")
            .with_meta_title("Desk Lamp")
            .with_description("warm light")
            .with_description_long("brass base");

        analyzer(filter.clone()).analyze(&product, &context());

        let calls = filter.0.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![vec![
                "warm".to_string(),
                "light".to_string(),
                "brass".to_string(),
                "base".to_string(),
            ]]
        );
    }

    #[test]
    fn test_filter_only_touches_descriptions() {
        let filter = StopwordFilter::new(0).with_stopwords("en", ["the"]);
        let product = SearchableProduct::new(1, "The Lamp").with_description("the best lamp");

        let map = analyzer(Arc::new(filter)).analyze(&product, &context());

        assert_eq!(map.get("the"), Some(500.0));
        assert_eq!(map.get("best"), Some(5.0));
        assert_eq!(map.get("lamp"), Some(500.0));
    }

    #[test]
    fn test_empty_product_has_no_tokens() {
        let product = SearchableProduct {
            id: 1,
            ..SearchableProduct::default()
        };

        let map = analyzer(Arc::new(PassThroughFilter)).analyze(&product, &context());
        assert!(map.is_empty());
    }

    #[test]
    fn test_missing_product_is_invalid_input() {
        let err = analyzer(Arc::new(PassThroughFilter))
            .try_analyze(None, &context())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }
}
