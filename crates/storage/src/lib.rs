//! Storage layer for the catalog exporter
//!
//! [`CatalogStore`] is the full query surface the exporter needs from the
//! catalog database. [`PostgresCatalogStore`] runs it against Postgres through
//! sqlx; [`MockCatalogStore`] keeps the same tables in memory for tests.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

pub mod error;
pub mod fetch;
pub mod mock;
pub mod postgres;
pub mod rows;

pub use error::StorageError;
pub use mock::MockCatalogStore;
pub use postgres::{create_postgres_store, PostgresCatalogStore};

use async_trait::async_trait;
use catalog_core::error::Result;
use catalog_core::{
    BasicProduct, CategoryId, Cursor, Image, MediaId, ProductId, Properties, ShopId, ValueId,
    Variant,
};
use indexmap::IndexMap;

/// Queries issued by the exporter, one per [`CatalogStore`] method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    LoadCursor,
    EnsureCursor,
    AdvanceCursor,
    CategoryClosure,
    ProductIds,
    BaseProducts,
    Variants,
    PropertyValueIds,
    PropertyValues,
    MediaIds,
    Media,
}

impl std::fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::LoadCursor => "load_cursor",
            Self::EnsureCursor => "ensure_cursor",
            Self::AdvanceCursor => "advance_cursor",
            Self::CategoryClosure => "category_closure",
            Self::ProductIds => "product_ids_in_categories",
            Self::BaseProducts => "fetch_base_products",
            Self::Variants => "fetch_variants",
            Self::PropertyValueIds => "fetch_property_value_ids",
            Self::PropertyValues => "resolve_property_values",
            Self::MediaIds => "fetch_media_ids",
            Self::Media => "resolve_media",
        };
        f.write_str(name)
    }
}

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Cursor row of a shop, `None` when the shop was never configured
    async fn load_cursor(&self, shop_id: ShopId) -> Result<Option<Cursor>>;

    /// Create the cursor row at watermark 0 if it does not exist yet
    async fn ensure_cursor(&self, shop_id: ShopId, batch_size: u32) -> Result<Cursor>;

    /// Move the watermark from `expected` to `watermark`
    ///
    /// The write only applies while the stored watermark still equals
    /// `expected`; otherwise it fails with `Error::Conflict` and nothing is
    /// written. A `watermark` below `expected` is rejected as invalid input.
    async fn advance_cursor(
        &self,
        shop_id: ShopId,
        expected: ProductId,
        watermark: ProductId,
    ) -> Result<()>;

    /// `root` plus every category whose ancestor path contains it
    async fn category_closure(&self, root: CategoryId) -> Result<Vec<CategoryId>>;

    /// Distinct products of `category_ids` with id above `after`, ascending, at most `limit`
    async fn product_ids_in_categories(
        &self,
        category_ids: &[CategoryId],
        after: ProductId,
        limit: u32,
    ) -> Result<Vec<ProductId>>;

    /// One base record per product, in product id order
    async fn fetch_base_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, BasicProduct>>;

    /// Variant detail rows per product; products without variants are absent
    async fn fetch_variants(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<Variant>>>;

    /// Property value ids per product; products without properties are absent
    async fn fetch_property_value_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<ValueId>>>;

    /// Values grouped under their option name
    async fn resolve_property_values(&self, value_ids: &[ValueId]) -> Result<Properties>;

    /// Media ids per product in image position order; products without images are absent
    async fn fetch_media_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<MediaId>>>;

    /// Media records in the order of `media_ids`
    async fn resolve_media(&self, media_ids: &[MediaId]) -> Result<Vec<Image>>;
}
