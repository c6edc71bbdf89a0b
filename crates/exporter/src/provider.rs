//! Named export providers producing JSON payloads

use crate::exporter::CatalogExporter;
use async_trait::async_trait;
use catalog_core::error::{Error, Result};
use catalog_core::Scope;
use serde_json::{json, Value};
use std::sync::Arc;

/// A source of export payloads, addressed by name
#[async_trait]
pub trait ExportProvider: Send + Sync {
    /// Name the provider is registered under
    fn name(&self) -> &'static str;

    /// Produce the next payload for `scope`
    async fn collect(&self, scope: &Scope) -> Result<Value>;
}

/// Exports the next product batch as `{"list": [...]}`
pub struct ProductsProvider {
    exporter: Arc<CatalogExporter>,
}

impl ProductsProvider {
    pub const NAME: &'static str = "products";

    pub fn new(exporter: Arc<CatalogExporter>) -> Self {
        Self { exporter }
    }
}

#[async_trait]
impl ExportProvider for ProductsProvider {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    async fn collect(&self, scope: &Scope) -> Result<Value> {
        let products = self.exporter.run_batch(scope).await?;
        let list = serde_json::to_value(products)
            .map_err(|e| Error::with_context("Failed to serialize product batch", e))?;
        Ok(json!({ "list": list }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::ExporterConfig;
    use catalog_storage::mock::DetailSeed;
    use catalog_storage::MockCatalogStore;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_products_payload_shape() {
        let store = MockCatalogStore::new();
        store
            .add_cursor(1, 10, 0)
            .add_category(12, None)
            .add_product(4, DetailSeed::with_stock(3))
            .assign_category(4, 12)
            .add_property(4, "Color", "red");

        let exporter = CatalogExporter::new(Arc::new(store.clone()), ExporterConfig::default());
        let provider = ProductsProvider::new(Arc::new(exporter));
        assert_eq!(provider.name(), "products");

        let payload = provider.collect(&Scope::new(1, 12)).await.unwrap();
        let list = payload["list"].as_array().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0]["id"], 4);
        assert_eq!(list[0]["shippingReady"], true);
        assert_eq!(list[0]["properties"]["Color"], json!(["red"]));
        assert!(list[0].get("variants").is_none());

        let drained = provider.collect(&Scope::new(1, 12)).await.unwrap();
        assert_eq!(drained, json!({ "list": [] }));
    }

    #[tokio::test]
    async fn test_sales_flags_reach_record_and_payload() {
        let store = MockCatalogStore::new();
        store
            .add_cursor(1, 10, 0)
            .add_cursor(2, 10, 0)
            .add_category(12, None)
            .add_product(3, DetailSeed::default())
            .set_sales_flags(3, 42, true, true)
            .assign_category(3, 12);

        let exporter = Arc::new(CatalogExporter::new(
            Arc::new(store.clone()),
            ExporterConfig::default(),
        ));

        let records = exporter.run_batch(&Scope::new(1, 12)).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].pseudo_sales, 42);
        assert!(records[0].top_seller);
        assert!(records[0].notification_enabled);

        let provider = ProductsProvider::new(exporter);
        let payload = provider.collect(&Scope::new(2, 12)).await.unwrap();
        let product = &payload["list"][0];
        assert_eq!(product["id"], 3);
        assert_eq!(product["pseudoSales"], 42);
        assert_eq!(product["topSeller"], true);
        assert_eq!(product["notificationEnabled"], true);
    }
}
