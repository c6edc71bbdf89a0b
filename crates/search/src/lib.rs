//! Search token ranking for catalog products
//!
//! [`LanguageAnalyzer`] turns a product's text fields into a [`TokenScoreMap`]:
//! every field is tokenized on its own, scored with the field's fixed weight,
//! and a token seen in several fields keeps the highest weight.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod analyzer;
mod filter;
mod index;
mod product;
mod tokenizer;
mod tokens;

pub use analyzer::{LanguageAnalyzer, SearchAnalyzer};
pub use filter::{PassThroughFilter, SearchContext, SearchFilter, StopwordFilter};
pub use index::{build_token_index, TokenIndex};
pub use product::{Manufacturer, SearchableProduct};
pub use tokenizer::{Tokenizer, WhitespaceTokenizer};
pub use tokens::{RankedField, TokenScoreMap};

// Re-export error types from core
pub use catalog_core::error::{Error, Result};
