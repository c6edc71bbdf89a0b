//! Product enrichment: base records plus their variant, property and image facets

use catalog_core::error::{Error, Result};
use catalog_core::{BasicProduct, Image, ProductId, Properties, Variant};
use catalog_storage::CatalogStore;
use futures::{stream, StreamExt, TryStreamExt};
use indexmap::IndexMap;
use std::sync::Arc;
use tracing::debug;

/// Fetches base products and attaches their facets
pub struct ProductEnricher {
    store: Arc<dyn CatalogStore>,
    max_concurrent_facet_queries: usize,
}

impl ProductEnricher {
    pub fn new(store: Arc<dyn CatalogStore>, max_concurrent_facet_queries: usize) -> Self {
        Self {
            store,
            max_concurrent_facet_queries: max_concurrent_facet_queries.max(1),
        }
    }

    /// Enrich `product_ids` into full records, in base-fetch order
    ///
    /// Ids with no base row are dropped. Each facet is attached only when the
    /// product has one; any facet query failure fails the whole call.
    pub async fn enrich(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, BasicProduct>> {
        if product_ids.is_empty() {
            return Ok(IndexMap::new());
        }

        let mut products = self.store.fetch_base_products(product_ids).await?;
        if products.is_empty() {
            return Ok(products);
        }

        let ids: Vec<ProductId> = products.keys().copied().collect();
        let (variants, properties, images) = futures::try_join!(
            self.store.fetch_variants(&ids),
            self.fetch_properties(&ids),
            self.fetch_images(&ids),
        )?;

        debug!(
            products = products.len(),
            with_variants = variants.len(),
            with_properties = properties.len(),
            with_images = images.len(),
            "Fetched product facets"
        );

        attach_facets(&mut products, variants, properties, images);
        Ok(products)
    }

    async fn fetch_properties(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Properties>> {
        let value_ids = self.store.fetch_property_value_ids(product_ids).await?;
        let store = &self.store;

        stream::iter(value_ids)
            .map(|(product_id, value_ids)| async move {
                let properties = store.resolve_property_values(&value_ids).await?;
                Ok::<_, Error>((product_id, properties))
            })
            .buffered(self.max_concurrent_facet_queries)
            .try_collect()
            .await
    }

    async fn fetch_images(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<Image>>> {
        let media_ids = self.store.fetch_media_ids(product_ids).await?;
        let store = &self.store;

        stream::iter(media_ids)
            .map(|(product_id, media_ids)| async move {
                let images = store.resolve_media(&media_ids).await?;
                Ok::<_, Error>((product_id, images))
            })
            .buffered(self.max_concurrent_facet_queries)
            .try_collect()
            .await
    }
}

fn attach_facets(
    products: &mut IndexMap<ProductId, BasicProduct>,
    mut variants: IndexMap<ProductId, Vec<Variant>>,
    mut properties: IndexMap<ProductId, Properties>,
    mut images: IndexMap<ProductId, Vec<Image>>,
) {
    for (product_id, product) in products.iter_mut() {
        if let Some(found) = variants.swap_remove(product_id) {
            product.variants = Some(found);
        }
        if let Some(found) = properties.swap_remove(product_id) {
            product.properties = Some(found);
        }
        if let Some(found) = images.swap_remove(product_id) {
            product.images = Some(found);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_storage::mock::DetailSeed;
    use catalog_storage::{MockCatalogStore, StoreOperation};
    use pretty_assertions::assert_eq;

    fn image(width: i32) -> Image {
        Image {
            width: Some(width),
            height: Some(width),
            extension: "jpg".to_string(),
            file_size: 2048,
        }
    }

    fn enricher(store: &MockCatalogStore) -> ProductEnricher {
        ProductEnricher::new(Arc::new(store.clone()), 2)
    }

    #[tokio::test]
    async fn test_facets_attached_only_when_present() {
        let store = MockCatalogStore::new();
        store
            .add_product(1, DetailSeed::with_stock(5))
            .add_variant(1, DetailSeed::with_stock(2))
            .add_variant(1, DetailSeed::with_stock(0))
            .add_property(1, "Color", "blue")
            .add_image(1, image(640))
            .add_product(2, DetailSeed::with_stock(0));

        let products = enricher(&store).enrich(&[1, 2]).await.unwrap();

        let first = &products[&1];
        let variants = first.variants.as_ref().unwrap();
        assert_eq!(variants.len(), 2);
        assert!(variants[0].shipping_ready);
        assert!(!variants[1].shipping_ready);
        assert_eq!(first.properties.as_ref().unwrap()["Color"], vec!["blue"]);
        assert_eq!(first.images.as_ref().unwrap(), &vec![image(640)]);

        let second = &products[&2];
        assert_eq!(second.variants, None);
        assert_eq!(second.properties, None);
        assert_eq!(second.images, None);
    }

    #[tokio::test]
    async fn test_order_follows_base_fetch() {
        let store = MockCatalogStore::new();
        for id in [8, 3, 5] {
            store.add_product(id, DetailSeed::default());
        }
        store.add_image(8, image(1)).add_image(3, image(2));

        let products = enricher(&store).enrich(&[8, 3, 5]).await.unwrap();
        assert_eq!(products.keys().copied().collect::<Vec<_>>(), vec![3, 5, 8]);
        assert_eq!(products[&8].images.as_ref().unwrap(), &vec![image(1)]);
        assert_eq!(products[&3].images.as_ref().unwrap(), &vec![image(2)]);
    }

    #[tokio::test]
    async fn test_product_without_details_is_dropped() {
        let store = MockCatalogStore::new();
        store
            .add_product(1, DetailSeed::default())
            .add_product_without_details(2);

        let products = enricher(&store).enrich(&[1, 2]).await.unwrap();
        assert_eq!(products.keys().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[tokio::test]
    async fn test_facet_failure_propagates() {
        let store = MockCatalogStore::new();
        store
            .add_product(1, DetailSeed::default())
            .add_image(1, image(10))
            .fail_on(StoreOperation::Media);

        let err = enricher(&store).enrich(&[1]).await.unwrap_err();
        assert!(matches!(err, Error::Storage(_)));
    }

    #[tokio::test]
    async fn test_empty_input_issues_no_queries() {
        let store = MockCatalogStore::new();

        let products = enricher(&store).enrich(&[]).await.unwrap();
        assert!(products.is_empty());
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_one_resolve_query_per_product() {
        let store = MockCatalogStore::new();
        for id in 1..=4 {
            store
                .add_product(id, DetailSeed::default())
                .add_property(id, "Size", "M");
        }

        let products = enricher(&store).enrich(&[1, 2, 3, 4]).await.unwrap();
        assert_eq!(products.len(), 4);
        assert_eq!(store.call_count(StoreOperation::PropertyValueIds), 1);
        assert_eq!(store.call_count(StoreOperation::PropertyValues), 4);
        assert_eq!(store.call_count(StoreOperation::MediaIds), 1);
        assert_eq!(store.call_count(StoreOperation::Media), 0);
    }
}
