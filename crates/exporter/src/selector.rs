//! Batch selection: the next page of product ids after the cursor

use crate::scope::CategoryClosure;
use catalog_core::error::Result;
use catalog_core::{Cursor, ProductId};
use catalog_storage::CatalogStore;
use tracing::debug;

/// Select the next ascending, distinct page of product ids above the watermark
///
/// An empty result means the scope is drained.
pub async fn next_product_ids(
    store: &dyn CatalogStore,
    closure: &CategoryClosure,
    cursor: &Cursor,
) -> Result<Vec<ProductId>> {
    if closure.is_empty() {
        return Ok(Vec::new());
    }

    let mut ids = store
        .product_ids_in_categories(
            &closure.to_vec(),
            cursor.last_product_id,
            cursor.batch_size,
        )
        .await?;

    // Hold every backend to the cursor contract
    ids.retain(|id| *id > cursor.last_product_id);
    ids.sort_unstable();
    ids.dedup();
    ids.truncate(cursor.batch_size as usize);

    debug!(
        after = cursor.last_product_id,
        batch_size = cursor.batch_size,
        selected = ids.len(),
        "Selected product ids"
    );

    Ok(ids)
}
