use crate::error::StorageError;
use crate::fetch;
use crate::rows::{
    category_path_pattern, BaseProductRow, CursorRow, DetailRow, MediaRow, DETAIL_KIND_VARIANT,
};
use crate::CatalogStore;
use async_trait::async_trait;
use catalog_core::config::StorageConfig;
use catalog_core::error::{Error, Result, ResultExt};
use catalog_core::{
    BasicProduct, CategoryId, Cursor, Image, MediaId, ProductId, Properties, ShopId, ValueId,
    Variant,
};
use indexmap::IndexMap;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const DETAIL_COLUMNS: &str = "d.product_id, d.active, d.in_stock, d.stock_min, d.last_stock, \
     d.min_purchase, d.max_purchase, d.purchase_steps, d.shipping_free, d.shipping_time";

/// Catalog store backed by a Postgres connection pool
pub struct PostgresCatalogStore {
    pool: PgPool,
}

/// Connect to the database described by `config`
pub async fn create_postgres_store(config: &StorageConfig) -> Result<Arc<PostgresCatalogStore>> {
    let pool = PgPoolOptions::new()
        .max_connections(config.postgres_pool_size)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&config.connection_url())
        .await
        .map_err(|e| {
            StorageError::ConnectionFailed(format!(
                "{}:{}/{}: {e}",
                config.postgres_host, config.postgres_port, config.postgres_database
            ))
        })?;

    info!(
        host = %config.postgres_host,
        database = %config.postgres_database,
        "Connected to catalog database"
    );

    Ok(Arc::new(PostgresCatalogStore::new(pool)))
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Apply the schema migrations shipped with the workspace
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn load_cursor(&self, shop_id: ShopId) -> Result<Option<Cursor>> {
        let rows = sqlx::query_as::<_, CursorRow>(
            "SELECT shop_id, batch_size, last_product_id
             FROM export_cursors
             WHERE shop_id = $1",
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await
        .storage_err("Failed to load export cursor")?;

        fetch::single(rows).map(CursorRow::into_cursor).transpose()
    }

    async fn ensure_cursor(&self, shop_id: ShopId, batch_size: u32) -> Result<Cursor> {
        let batch_size = i32::try_from(batch_size)
            .map_err(|_| Error::invalid_input(format!("batch_size {batch_size} out of range")))?;

        sqlx::query(
            "INSERT INTO export_cursors (shop_id, batch_size, last_product_id)
             VALUES ($1, $2, 0)
             ON CONFLICT (shop_id) DO NOTHING",
        )
        .bind(shop_id)
        .bind(batch_size)
        .execute(&self.pool)
        .await
        .storage_err("Failed to create export cursor")?;

        self.load_cursor(shop_id).await?.ok_or_else(|| {
            Error::storage(format!("Export cursor for shop {shop_id} vanished after insert"))
        })
    }

    async fn advance_cursor(
        &self,
        shop_id: ShopId,
        expected: ProductId,
        watermark: ProductId,
    ) -> Result<()> {
        if watermark < expected {
            return Err(Error::invalid_input(format!(
                "Refusing to move cursor of shop {shop_id} backwards ({expected} -> {watermark})"
            )));
        }

        let result = sqlx::query(
            "UPDATE export_cursors
             SET last_product_id = $3
             WHERE shop_id = $1 AND last_product_id = $2",
        )
        .bind(shop_id)
        .bind(expected)
        .bind(watermark)
        .execute(&self.pool)
        .await
        .storage_err("Failed to advance export cursor")?;

        if result.rows_affected() == 1 {
            return Ok(());
        }

        match self.load_cursor(shop_id).await? {
            None => Err(Error::config(format!(
                "No export cursor configured for shop {shop_id}"
            ))),
            Some(current) => Err(Error::conflict(format!(
                "Cursor of shop {shop_id} moved to {} while a batch expected {expected}",
                current.last_product_id
            ))),
        }
    }

    async fn category_closure(&self, root: CategoryId) -> Result<Vec<CategoryId>> {
        let rows = sqlx::query_as::<_, (CategoryId,)>(
            "SELECT id FROM categories
             WHERE path LIKE $1 OR id = $2
             ORDER BY id",
        )
        .bind(category_path_pattern(root))
        .bind(root)
        .fetch_all(&self.pool)
        .await
        .storage_err("Failed to resolve category closure")?;

        Ok(fetch::column(rows))
    }

    async fn product_ids_in_categories(
        &self,
        category_ids: &[CategoryId],
        after: ProductId,
        limit: u32,
    ) -> Result<Vec<ProductId>> {
        let rows = sqlx::query_as::<_, (ProductId,)>(
            "SELECT DISTINCT product_id FROM product_categories
             WHERE category_id = ANY($1) AND product_id > $2
             ORDER BY product_id
             LIMIT $3",
        )
        .bind(category_ids)
        .bind(after)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .storage_err("Failed to select product ids")?;

        Ok(fetch::column(rows))
    }

    async fn fetch_base_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, BasicProduct>> {
        let sql = format!(
            "SELECT {DETAIL_COLUMNS}, p.pseudo_sales, p.topseller, p.notification
             FROM product_details d
             INNER JOIN products p ON p.id = d.product_id
             WHERE p.id = ANY($1)
             ORDER BY d.product_id, d.id"
        );
        let rows = sqlx::query_as::<_, BaseProductRow>(&sql)
            .bind(product_ids)
            .fetch_all(&self.pool)
            .await
            .storage_err("Failed to fetch base products")?;

        debug!("Fetched {} base detail rows", rows.len());
        Ok(fetch::group_unique(
            rows.into_iter().map(BaseProductRow::into_keyed),
        ))
    }

    async fn fetch_variants(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<Variant>>> {
        let sql = format!(
            "SELECT {DETAIL_COLUMNS}
             FROM product_details d
             WHERE d.product_id = ANY($1) AND d.kind = $2
             ORDER BY d.product_id, d.id"
        );
        let rows = sqlx::query_as::<_, DetailRow>(&sql)
            .bind(product_ids)
            .bind(DETAIL_KIND_VARIANT)
            .fetch_all(&self.pool)
            .await
            .storage_err("Failed to fetch variants")?;

        debug!("Fetched {} variant rows", rows.len());
        Ok(fetch::group(rows.into_iter().map(DetailRow::into_keyed)))
    }

    async fn fetch_property_value_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<ValueId>>> {
        let rows = sqlx::query_as::<_, (ProductId, Vec<ValueId>)>(
            "SELECT product_id, array_agg(value_id ORDER BY value_id)
             FROM product_filter_values
             WHERE product_id = ANY($1)
             GROUP BY product_id
             ORDER BY product_id",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .storage_err("Failed to fetch property value ids")?;

        Ok(fetch::key_pairs(rows))
    }

    async fn resolve_property_values(&self, value_ids: &[ValueId]) -> Result<Properties> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT o.name, v.value
             FROM filter_values v
             INNER JOIN filter_options o ON o.id = v.option_id
             WHERE v.id = ANY($1)
             ORDER BY o.id, v.id",
        )
        .bind(value_ids)
        .fetch_all(&self.pool)
        .await
        .storage_err("Failed to resolve property values")?;

        Ok(fetch::group(rows))
    }

    async fn fetch_media_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<MediaId>>> {
        let rows = sqlx::query_as::<_, (ProductId, Vec<MediaId>)>(
            "SELECT product_id, array_agg(media_id ORDER BY position, id)
             FROM product_images
             WHERE product_id = ANY($1)
             GROUP BY product_id
             ORDER BY product_id",
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await
        .storage_err("Failed to fetch media ids")?;

        Ok(fetch::key_pairs(rows))
    }

    async fn resolve_media(&self, media_ids: &[MediaId]) -> Result<Vec<Image>> {
        let rows = sqlx::query_as::<_, MediaRow>(
            "SELECT m.width, m.height, m.extension, m.file_size
             FROM media m
             WHERE m.id = ANY($1)
             ORDER BY array_position($1, m.id)",
        )
        .bind(media_ids)
        .fetch_all(&self.pool)
        .await
        .storage_err("Failed to resolve media")?;

        Ok(rows.into_iter().map(Image::from).collect())
    }
}
