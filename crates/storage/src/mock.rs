//! In-memory catalog store for testing
//!
//! Seeded through the `add_*` methods, it answers every [`CatalogStore`] query
//! with the same filtering, ordering and grouping the Postgres queries use.
//! Individual operations can be made to fail with [`MockCatalogStore::fail_on`].

use crate::error::StorageError;
use crate::fetch;
use crate::rows::{
    path_contains, BaseProductRow, DetailRow, DETAIL_KIND_MASTER, DETAIL_KIND_VARIANT,
};
use crate::{CatalogStore, StoreOperation};
use async_trait::async_trait;
use catalog_core::error::{Error, Result};
use catalog_core::{
    BasicProduct, CategoryId, Cursor, Image, MediaId, ProductId, Properties, ShopId, ValueId,
    Variant,
};
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone)]
struct MockCategory {
    id: CategoryId,
    path: Option<String>,
}

#[derive(Debug, Clone)]
struct MockMaster {
    id: ProductId,
    pseudo_sales: i32,
    topseller: bool,
    notification: bool,
}

#[derive(Debug, Clone)]
struct MockDetail {
    id: i64,
    kind: i16,
    row: DetailRow,
}

#[derive(Debug, Clone)]
struct MockMedia {
    id: MediaId,
    image: Image,
}

#[derive(Debug, Default)]
struct MockData {
    cursors: HashMap<ShopId, (i64, i64)>, // shop_id -> (batch_size, last_product_id)
    categories: Vec<MockCategory>,
    masters: Vec<MockMaster>,
    details: Vec<MockDetail>,
    product_categories: Vec<(ProductId, CategoryId)>,
    options: Vec<(i64, String)>,    // (option_id, name)
    values: Vec<(ValueId, i64, String)>, // (value_id, option_id, value)
    product_values: Vec<(ProductId, ValueId)>,
    media: Vec<MockMedia>,
    product_images: Vec<(ProductId, MediaId)>,
    next_id: i64,
    failures: HashSet<StoreOperation>,
    calls: Vec<StoreOperation>,
}

impl MockData {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// Mock catalog store for testing
#[derive(Clone, Default)]
pub struct MockCatalogStore {
    data: Arc<Mutex<MockData>>,
}

/// Attributes of a seeded detail row
#[derive(Debug, Clone)]
pub struct DetailSeed {
    pub active: bool,
    pub in_stock: i32,
    pub stock_min: i32,
    pub last_stock: bool,
    pub min_purchase: i32,
    pub max_purchase: Option<i32>,
    pub purchase_steps: Option<i32>,
    pub shipping_free: bool,
    pub shipping_time: Option<String>,
}

impl Default for DetailSeed {
    fn default() -> Self {
        Self {
            active: true,
            in_stock: 10,
            stock_min: 0,
            last_stock: false,
            min_purchase: 1,
            max_purchase: None,
            purchase_steps: None,
            shipping_free: false,
            shipping_time: None,
        }
    }
}

impl DetailSeed {
    pub fn with_stock(in_stock: i32) -> Self {
        Self {
            in_stock,
            ..Self::default()
        }
    }

    fn into_row(self, product_id: ProductId) -> DetailRow {
        DetailRow {
            product_id,
            active: self.active,
            in_stock: self.in_stock,
            stock_min: self.stock_min,
            last_stock: self.last_stock,
            min_purchase: self.min_purchase,
            max_purchase: self.max_purchase,
            purchase_steps: self.purchase_steps,
            shipping_free: self.shipping_free,
            shipping_time: self.shipping_time,
        }
    }
}

fn sorted_unique(ids: &[i64]) -> BTreeSet<i64> {
    ids.iter().copied().collect()
}

impl MockCatalogStore {
    /// Create a new, empty mock store
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockData> {
        // A poisoned lock only happens after a panicking test thread; keep serving its data
        self.data.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call and fail it if a failure was injected for `operation`
    fn enter(&self, operation: StoreOperation) -> Result<MutexGuard<'_, MockData>> {
        let mut data = self.lock();
        data.calls.push(operation);
        if data.failures.contains(&operation) {
            return Err(StorageError::Injected(operation.to_string()).into());
        }
        Ok(data)
    }

    pub fn add_cursor(&self, shop_id: ShopId, batch_size: i64, last_product_id: i64) -> &Self {
        self.lock()
            .cursors
            .insert(shop_id, (batch_size, last_product_id));
        self
    }

    /// Overwrite a watermark directly, as a concurrent exporter would
    pub fn set_watermark(&self, shop_id: ShopId, last_product_id: ProductId) -> &Self {
        if let Some(cursor) = self.lock().cursors.get_mut(&shop_id) {
            cursor.1 = last_product_id;
        }
        self
    }

    pub fn add_category(&self, id: CategoryId, path: Option<&str>) -> &Self {
        self.lock().categories.push(MockCategory {
            id,
            path: path.map(str::to_string),
        });
        self
    }

    /// Product master row with its master detail row
    pub fn add_product(&self, id: ProductId, master: DetailSeed) -> &Self {
        let mut data = self.lock();
        data.masters.push(MockMaster {
            id,
            pseudo_sales: 0,
            topseller: false,
            notification: false,
        });
        let detail_id = data.next_id();
        data.details.push(MockDetail {
            id: detail_id,
            kind: DETAIL_KIND_MASTER,
            row: master.into_row(id),
        });
        drop(data);
        self
    }

    /// Product master row without any detail rows; the base join drops it
    pub fn add_product_without_details(&self, id: ProductId) -> &Self {
        self.lock().masters.push(MockMaster {
            id,
            pseudo_sales: 0,
            topseller: false,
            notification: false,
        });
        self
    }

    pub fn set_sales_flags(
        &self,
        id: ProductId,
        pseudo_sales: i32,
        topseller: bool,
        notification: bool,
    ) -> &Self {
        if let Some(master) = self.lock().masters.iter_mut().find(|m| m.id == id) {
            master.pseudo_sales = pseudo_sales;
            master.topseller = topseller;
            master.notification = notification;
        }
        self
    }

    pub fn add_variant(&self, product_id: ProductId, variant: DetailSeed) -> &Self {
        let mut data = self.lock();
        let detail_id = data.next_id();
        data.details.push(MockDetail {
            id: detail_id,
            kind: DETAIL_KIND_VARIANT,
            row: variant.into_row(product_id),
        });
        drop(data);
        self
    }

    pub fn assign_category(&self, product_id: ProductId, category_id: CategoryId) -> &Self {
        self.lock()
            .product_categories
            .push((product_id, category_id));
        self
    }

    /// Attach a property value; repeated calls add further value rows, never merge them
    pub fn add_property(&self, product_id: ProductId, option: &str, value: &str) -> &Self {
        let mut data = self.lock();
        let option_id = match data.options.iter().find(|(_, name)| name == option) {
            Some((id, _)) => *id,
            None => {
                let id = data.next_id();
                data.options.push((id, option.to_string()));
                id
            }
        };
        let value_id = data.next_id();
        data.values.push((value_id, option_id, value.to_string()));
        data.product_values.push((product_id, value_id));
        drop(data);
        self
    }

    pub fn add_image(&self, product_id: ProductId, image: Image) -> &Self {
        let mut data = self.lock();
        let media_id = data.next_id();
        data.media.push(MockMedia { id: media_id, image });
        data.product_images.push((product_id, media_id));
        drop(data);
        self
    }

    /// Make every later call of `operation` fail with a storage error
    pub fn fail_on(&self, operation: StoreOperation) -> &Self {
        self.lock().failures.insert(operation);
        self
    }

    pub fn clear_failures(&self) -> &Self {
        self.lock().failures.clear();
        self
    }

    /// Stored cursor of a shop, bypassing call tracking
    pub fn cursor(&self, shop_id: ShopId) -> Option<(i64, i64)> {
        self.lock().cursors.get(&shop_id).copied()
    }

    /// Operations called so far, in call order
    pub fn calls(&self) -> Vec<StoreOperation> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self, operation: StoreOperation) -> usize {
        self.lock().calls.iter().filter(|c| **c == operation).count()
    }
}

#[async_trait]
impl CatalogStore for MockCatalogStore {
    async fn load_cursor(&self, shop_id: ShopId) -> Result<Option<Cursor>> {
        let data = self.enter(StoreOperation::LoadCursor)?;
        data.cursors
            .get(&shop_id)
            .map(|(batch_size, last)| Cursor::new(*last, *batch_size))
            .transpose()
    }

    async fn ensure_cursor(&self, shop_id: ShopId, batch_size: u32) -> Result<Cursor> {
        let mut data = self.enter(StoreOperation::EnsureCursor)?;
        let (batch_size, last) = *data
            .cursors
            .entry(shop_id)
            .or_insert((i64::from(batch_size), 0));
        Cursor::new(last, batch_size)
    }

    async fn advance_cursor(
        &self,
        shop_id: ShopId,
        expected: ProductId,
        watermark: ProductId,
    ) -> Result<()> {
        let mut data = self.enter(StoreOperation::AdvanceCursor)?;
        if watermark < expected {
            return Err(Error::invalid_input(format!(
                "Refusing to move cursor of shop {shop_id} backwards ({expected} -> {watermark})"
            )));
        }
        match data.cursors.get_mut(&shop_id) {
            None => Err(Error::config(format!(
                "No export cursor configured for shop {shop_id}"
            ))),
            Some((_, last)) if *last != expected => Err(Error::conflict(format!(
                "Cursor of shop {shop_id} moved to {last} while a batch expected {expected}"
            ))),
            Some((_, last)) => {
                *last = watermark;
                Ok(())
            }
        }
    }

    async fn category_closure(&self, root: CategoryId) -> Result<Vec<CategoryId>> {
        let data = self.enter(StoreOperation::CategoryClosure)?;
        let mut ids: Vec<(CategoryId,)> = data
            .categories
            .iter()
            .filter(|c| {
                c.id == root
                    || c.path
                        .as_deref()
                        .is_some_and(|path| path_contains(path, root))
            })
            .map(|c| (c.id,))
            .collect();
        ids.sort_unstable();
        Ok(fetch::column(ids))
    }

    async fn product_ids_in_categories(
        &self,
        category_ids: &[CategoryId],
        after: ProductId,
        limit: u32,
    ) -> Result<Vec<ProductId>> {
        let data = self.enter(StoreOperation::ProductIds)?;
        let wanted = sorted_unique(category_ids);
        let distinct: BTreeSet<ProductId> = data
            .product_categories
            .iter()
            .filter(|(product_id, category_id)| wanted.contains(category_id) && *product_id > after)
            .map(|(product_id, _)| *product_id)
            .collect();
        let rows = distinct
            .into_iter()
            .take(limit as usize)
            .map(|id| (id,));
        Ok(fetch::column(rows))
    }

    async fn fetch_base_products(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, BasicProduct>> {
        let data = self.enter(StoreOperation::BaseProducts)?;
        let wanted = sorted_unique(product_ids);
        let mut details: Vec<&MockDetail> = data
            .details
            .iter()
            .filter(|d| wanted.contains(&d.row.product_id))
            .collect();
        details.sort_by_key(|d| (d.row.product_id, d.id));

        let rows = details.into_iter().filter_map(|detail| {
            let master = data.masters.iter().find(|m| m.id == detail.row.product_id)?;
            Some(BaseProductRow {
                detail: detail.row.clone(),
                pseudo_sales: master.pseudo_sales,
                topseller: master.topseller,
                notification: master.notification,
            })
        });
        Ok(fetch::group_unique(rows.map(BaseProductRow::into_keyed)))
    }

    async fn fetch_variants(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<Variant>>> {
        let data = self.enter(StoreOperation::Variants)?;
        let wanted = sorted_unique(product_ids);
        let mut details: Vec<&MockDetail> = data
            .details
            .iter()
            .filter(|d| d.kind == DETAIL_KIND_VARIANT && wanted.contains(&d.row.product_id))
            .collect();
        details.sort_by_key(|d| (d.row.product_id, d.id));

        Ok(fetch::group(
            details.into_iter().map(|d| d.row.clone().into_keyed()),
        ))
    }

    async fn fetch_property_value_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<ValueId>>> {
        let data = self.enter(StoreOperation::PropertyValueIds)?;
        let wanted = sorted_unique(product_ids);
        let mut links: Vec<(ProductId, ValueId)> = data
            .product_values
            .iter()
            .filter(|(product_id, _)| wanted.contains(product_id))
            .copied()
            .collect();
        links.sort_unstable();
        Ok(fetch::key_pairs(fetch::group(links)))
    }

    async fn resolve_property_values(&self, value_ids: &[ValueId]) -> Result<Properties> {
        let data = self.enter(StoreOperation::PropertyValues)?;
        let wanted = sorted_unique(value_ids);
        let mut rows: Vec<(i64, ValueId, String, String)> = data
            .values
            .iter()
            .filter(|(value_id, _, _)| wanted.contains(value_id))
            .filter_map(|(value_id, option_id, value)| {
                let (_, name) = data.options.iter().find(|(id, _)| id == option_id)?;
                Some((*option_id, *value_id, name.clone(), value.clone()))
            })
            .collect();
        rows.sort_by_key(|(option_id, value_id, _, _)| (*option_id, *value_id));

        Ok(fetch::group(
            rows.into_iter().map(|(_, _, name, value)| (name, value)),
        ))
    }

    async fn fetch_media_ids(
        &self,
        product_ids: &[ProductId],
    ) -> Result<IndexMap<ProductId, Vec<MediaId>>> {
        let data = self.enter(StoreOperation::MediaIds)?;
        let wanted = sorted_unique(product_ids);
        let mut links: Vec<(ProductId, MediaId)> = data
            .product_images
            .iter()
            .filter(|(product_id, _)| wanted.contains(product_id))
            .copied()
            .collect();
        // Stable sort keeps insertion (position) order within a product
        links.sort_by_key(|(product_id, _)| *product_id);
        Ok(fetch::key_pairs(fetch::group(links)))
    }

    async fn resolve_media(&self, media_ids: &[MediaId]) -> Result<Vec<Image>> {
        let data = self.enter(StoreOperation::Media)?;
        let mut found: Vec<(usize, Image)> = data
            .media
            .iter()
            .filter_map(|m| {
                let position = media_ids.iter().position(|id| *id == m.id)?;
                Some((position, m.image.clone()))
            })
            .collect();
        found.sort_by_key(|(position, _)| *position);
        Ok(found.into_iter().map(|(_, image)| image).collect())
    }
}
