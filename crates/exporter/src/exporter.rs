//! Export batch assembly and cursor advancement

use crate::enricher::ProductEnricher;
use crate::scope::resolve_category_ids;
use crate::selector::next_product_ids;
use catalog_core::config::ExporterConfig;
use catalog_core::error::{Error, Result};
use catalog_core::{BasicProduct, ProductId, Scope};
use catalog_storage::CatalogStore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// One exported page of a scope
#[derive(Debug, Clone, Default)]
pub struct ExportBatch {
    /// Enriched products in base-fetch order
    pub products: Vec<BasicProduct>,
    /// Number of ids the selector returned
    pub selected: usize,
    /// Watermark the batch started from
    pub previous_watermark: ProductId,
    /// Watermark written after the batch, `None` when the scope was drained
    pub watermark: Option<ProductId>,
}

impl ExportBatch {
    /// Whether the scope had nothing left to export
    pub fn is_drained(&self) -> bool {
        self.selected == 0
    }
}

/// Statistics for a drain run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportStats {
    pub batches: usize,
    pub products_selected: usize,
    pub products_exported: usize,
    pub last_product_id: Option<ProductId>,
    pub processing_time_ms: u64,
}

impl ExportStats {
    /// Ids selected but without a base record
    pub fn products_dropped(&self) -> usize {
        self.products_selected
            .saturating_sub(self.products_exported)
    }
}

/// Runs checkpointed export batches against a catalog store
///
/// Batches for the same scope must not run concurrently. If they do, the
/// cursor's optimistic check makes the losing batch fail with
/// `Error::Conflict` instead of skipping or repeating products. Batches for
/// different scopes are independent.
pub struct CatalogExporter {
    store: Arc<dyn CatalogStore>,
    enricher: ProductEnricher,
    config: ExporterConfig,
}

impl CatalogExporter {
    pub fn new(store: Arc<dyn CatalogStore>, config: ExporterConfig) -> Self {
        let enricher = ProductEnricher::new(store.clone(), config.max_concurrent_facet_queries);
        Self {
            store,
            enricher,
            config,
        }
    }

    /// Export the next page of `scope` and advance its cursor
    pub async fn run_batch(&self, scope: &Scope) -> Result<Vec<BasicProduct>> {
        Ok(self.export_batch(scope).await?.products)
    }

    /// Export the next page of `scope`, returning the products with batch metadata
    ///
    /// The cursor is written only after every enrichment query succeeded, so a
    /// failed or abandoned batch leaves the watermark where it was. An empty
    /// selection returns an empty batch without touching the cursor.
    pub async fn export_batch(&self, scope: &Scope) -> Result<ExportBatch> {
        let cursor = self.store.load_cursor(scope.shop_id).await?.ok_or_else(|| {
            Error::config(format!(
                "No export cursor configured for shop {}",
                scope.shop_id
            ))
        })?;

        let closure = resolve_category_ids(self.store.as_ref(), scope).await?;
        let product_ids = next_product_ids(self.store.as_ref(), &closure, &cursor).await?;

        let Some(&watermark) = product_ids.iter().max() else {
            debug!(
                shop_id = scope.shop_id,
                watermark = cursor.last_product_id,
                "Scope drained, cursor unchanged"
            );
            return Ok(ExportBatch {
                previous_watermark: cursor.last_product_id,
                ..ExportBatch::default()
            });
        };

        let products = self.enricher.enrich(&product_ids).await?;

        self.store
            .advance_cursor(scope.shop_id, cursor.last_product_id, watermark)
            .await
            .inspect_err(|e| {
                if matches!(e, Error::Conflict(_)) {
                    warn!(shop_id = scope.shop_id, "Discarding batch: {e}");
                }
            })?;

        if products.len() < product_ids.len() {
            warn!(
                shop_id = scope.shop_id,
                "{} selected products had no base record",
                product_ids.len() - products.len()
            );
        }

        info!(
            shop_id = scope.shop_id,
            selected = product_ids.len(),
            exported = products.len(),
            watermark,
            "Exported batch"
        );

        Ok(ExportBatch {
            products: products.into_values().collect(),
            selected: product_ids.len(),
            previous_watermark: cursor.last_product_id,
            watermark: Some(watermark),
        })
    }

    /// Run batches until the scope is drained, handing each batch to `on_batch`
    ///
    /// The cursor of a batch is already advanced when `on_batch` sees it; an
    /// error from the callback stops the drain after that batch.
    pub async fn drain<F>(&self, scope: &Scope, mut on_batch: F) -> Result<ExportStats>
    where
        F: FnMut(&[BasicProduct]) -> Result<()>,
    {
        let start_time = Instant::now();
        let mut stats = ExportStats::default();

        loop {
            if let Some(max_batches) = self.config.max_batches_per_drain {
                if stats.batches >= max_batches {
                    info!(
                        shop_id = scope.shop_id,
                        "Stopping drain after {max_batches} batches"
                    );
                    break;
                }
            }

            let batch = self.export_batch(scope).await?;
            if batch.is_drained() {
                break;
            }

            stats.batches += 1;
            stats.products_selected += batch.selected;
            stats.products_exported += batch.products.len();
            stats.last_product_id = batch.watermark;

            on_batch(&batch.products)?;
        }

        stats.processing_time_ms = start_time.elapsed().as_millis() as u64;
        info!(
            shop_id = scope.shop_id,
            batches = stats.batches,
            exported = stats.products_exported,
            dropped = stats.products_dropped(),
            "Drain completed in {}ms",
            stats.processing_time_ms
        );

        Ok(stats)
    }

    /// Run one batch per scope concurrently
    pub async fn export_scopes(&self, scopes: &[Scope]) -> Vec<Result<ExportBatch>> {
        futures::future::join_all(scopes.iter().map(|scope| self.export_batch(scope))).await
    }
}
