//! Catalog exporter - incremental, checkpointed product export
//!
//! Each batch walks one scope (shop) forward from its persisted watermark:
//! resolve the scope's category closure, select the next page of product ids,
//! enrich them with variants, properties and images, then advance the cursor.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod enricher;
mod exporter;
mod provider;
mod scope;
mod selector;

pub use enricher::ProductEnricher;
pub use exporter::{CatalogExporter, ExportBatch, ExportStats};
pub use provider::{ExportProvider, ProductsProvider};
pub use scope::{resolve_category_ids, CategoryClosure};
pub use selector::next_product_ids;

// Re-export error types from core
pub use catalog_core::error::{Error, Result};
