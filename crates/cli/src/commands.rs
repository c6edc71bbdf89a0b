//! Command handlers shared by the binary and its tests

use anyhow::{Context, Result};
use catalog_core::config::ExporterConfig;
use catalog_core::{BasicProduct, Cursor, Error, Scope, ShopId};
use catalog_exporter::{CatalogExporter, ExportStats};
use catalog_storage::CatalogStore;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tracing::info;

/// Create the export cursor of a shop if it does not exist yet
///
/// An existing cursor is returned untouched, including its batch size.
pub async fn configure(
    store: &dyn CatalogStore,
    shop_id: ShopId,
    batch_size: u32,
) -> Result<Cursor> {
    if batch_size == 0 {
        anyhow::bail!("--batch-size must be greater than 0");
    }

    let cursor = store
        .ensure_cursor(shop_id, batch_size)
        .await
        .with_context(|| format!("Failed to configure export cursor for shop {shop_id}"))?;

    info!(
        shop_id,
        batch_size = cursor.batch_size,
        last_product_id = cursor.last_product_id,
        "Export cursor ready"
    );
    Ok(cursor)
}

/// Render the export cursor of a shop
pub async fn status(store: &dyn CatalogStore, shop_id: ShopId) -> Result<String> {
    let cursor = store
        .load_cursor(shop_id)
        .await
        .with_context(|| format!("Failed to load export cursor for shop {shop_id}"))?;

    Ok(match cursor {
        Some(cursor) => format!(
            "shop {shop_id}: last_product_id={} batch_size={}",
            cursor.last_product_id, cursor.batch_size
        ),
        None => format!("shop {shop_id}: no export cursor (run `catalog configure --shop-id {shop_id}`)"),
    })
}

/// Export one batch, or every remaining batch when `drain` is set
///
/// Each batch is written to `out` as one `{"list": [...]}` JSON line.
pub async fn export<W: Write>(
    store: Arc<dyn CatalogStore>,
    config: ExporterConfig,
    scope: Scope,
    drain: bool,
    out: &mut W,
) -> Result<ExportStats> {
    let exporter = CatalogExporter::new(store, config);

    if !drain {
        let batch = exporter
            .export_batch(&scope)
            .await
            .with_context(|| format!("Export of shop {} failed", scope.shop_id))?;
        write_batch(&mut *out, &batch.products)?;

        return Ok(ExportStats {
            batches: usize::from(batch.selected > 0),
            products_selected: batch.selected,
            products_exported: batch.products.len(),
            last_product_id: batch.watermark,
            ..ExportStats::default()
        });
    }

    let stats = exporter
        .drain(&scope, |products| write_batch(&mut *out, products))
        .await
        .with_context(|| format!("Drain of shop {} failed", scope.shop_id))?;
    Ok(stats)
}

fn write_batch<W: Write>(out: &mut W, products: &[BasicProduct]) -> catalog_core::Result<()> {
    serde_json::to_writer(&mut *out, &json!({ "list": products }))
        .map_err(|e| Error::with_context("Failed to write product batch", e))?;
    writeln!(out)?;
    Ok(())
}
