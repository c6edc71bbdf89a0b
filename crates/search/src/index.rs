//! Batch token indexing

use crate::analyzer::SearchAnalyzer;
use crate::filter::SearchContext;
use crate::product::SearchableProduct;
use crate::tokens::TokenScoreMap;
use catalog_core::ProductId;
use indexmap::IndexMap;
use tracing::{debug, warn};

/// Token maps for a batch of products, plus the ids that could not be analyzed
#[derive(Debug, Clone, Default)]
pub struct TokenIndex {
    pub entries: IndexMap<ProductId, TokenScoreMap>,
    pub skipped: Vec<ProductId>,
}

impl TokenIndex {
    /// Total number of distinct (product, token) pairs
    pub fn token_count(&self) -> usize {
        self.entries.values().map(TokenScoreMap::len).sum()
    }
}

/// Analyze every product of a batch, skipping and logging the ones that fail
///
/// A failing product does not stop the batch.
pub fn build_token_index<'a, A, I>(analyzer: &A, products: I, context: &SearchContext) -> TokenIndex
where
    A: SearchAnalyzer + ?Sized,
    I: IntoIterator<Item = (ProductId, Option<&'a SearchableProduct>)>,
{
    let mut index = TokenIndex::default();

    for (product_id, product) in products {
        match analyzer.try_analyze(product, context) {
            Ok(tokens) => {
                index.entries.insert(product_id, tokens);
            }
            Err(e) => {
                warn!(
                    product_id,
                    shop_id = context.shop_id,
                    "Skipping product in token index: {e}"
                );
                index.skipped.push(product_id);
            }
        }
    }

    debug!(
        indexed = index.entries.len(),
        skipped = index.skipped.len(),
        tokens = index.token_count(),
        "Built token index"
    );

    index
}
