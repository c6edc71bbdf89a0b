//! Core types for the catalog export system
//!
//! This crate provides the foundational pieces shared by every other crate:
//!
//! - **Catalog model**: product, variant, image and cursor types
//! - **Configuration**: storage and exporter settings
//! - **Error handling**: unified error types
//!

pub mod catalog;
pub mod config;
pub mod error;

// Re-export main types for convenience
pub use catalog::{
    BasicProduct, CategoryId, Cursor, DetailAttributes, Image, MediaId, ProductId, Properties,
    Scope, ShopId, ValueId, Variant,
};
pub use config::{Config, ExporterConfig, StorageConfig};
pub use error::{Error, Result, ResultExt};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::catalog::{BasicProduct, Cursor, ProductId, Scope};
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
}
