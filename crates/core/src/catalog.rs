//! Catalog model shared by the storage, exporter and search crates
//!
//! Products are exported in the shape the benchmark payload expects: camelCase
//! field names, facet keys (`variants`, `properties`, `images`) present only
//! when the product actually has that facet.

use crate::error::{Error, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub type ShopId = i64;
pub type CategoryId = i64;
pub type ProductId = i64;
pub type ValueId = i64;
pub type MediaId = i64;

/// Property values grouped by option name, in storage order
pub type Properties = IndexMap<String, Vec<String>>;

/// A shop/catalog context bounding which categories and products a batch covers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scope {
    pub shop_id: ShopId,
    pub root_category_id: Option<CategoryId>,
}

impl Scope {
    pub fn new(shop_id: ShopId, root_category_id: CategoryId) -> Self {
        Self {
            shop_id,
            root_category_id: Some(root_category_id),
        }
    }

    /// Scope whose shop has no category assigned
    pub fn without_category(shop_id: ShopId) -> Self {
        Self {
            shop_id,
            root_category_id: None,
        }
    }

    /// Root category of the scope, or a configuration error if the shop has none
    pub fn root_category(&self) -> Result<CategoryId> {
        self.root_category_id.ok_or_else(|| {
            Error::config(format!(
                "Shop {} has no root category assigned",
                self.shop_id
            ))
        })
    }
}

/// Persisted watermark and page size for one scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cursor {
    pub last_product_id: ProductId,
    pub batch_size: u32,
}

impl Cursor {
    /// Builds a cursor from raw column values, rejecting values that cannot drive a batch
    pub fn new(last_product_id: i64, batch_size: i64) -> Result<Self> {
        if last_product_id < 0 {
            return Err(Error::config(format!(
                "last_product_id must not be negative (got {last_product_id})"
            )));
        }
        if batch_size <= 0 {
            return Err(Error::config(format!(
                "batch_size must be greater than 0 (got {batch_size})"
            )));
        }
        let batch_size = u32::try_from(batch_size)
            .map_err(|_| Error::config(format!("batch_size too large (got {batch_size})")))?;

        Ok(Self {
            last_product_id,
            batch_size,
        })
    }

    /// Cursor moved forward to `watermark`; never moves backwards
    pub fn advanced_to(self, watermark: ProductId) -> Self {
        Self {
            last_product_id: self.last_product_id.max(watermark),
            ..self
        }
    }
}

/// Stock and purchase attributes of a single detail row (master or variant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailAttributes {
    pub active: bool,
    #[serde(rename = "instock")]
    pub in_stock: i32,
    pub instock_minimum: i32,
    pub sale: bool,
    pub min_purchase: i32,
    pub max_purchase: Option<i32>,
    pub purchase_steps: Option<i32>,
    pub shipping_ready: bool,
    pub shipping_free: bool,
    pub shipping_time: Option<String>,
}

/// A variant detail row of a product
pub type Variant = DetailAttributes;

/// Media record attached to a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub extension: String,
    pub file_size: i64,
}

/// Base product record, optionally extended in place with its facets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicProduct {
    pub id: ProductId,
    #[serde(flatten)]
    pub details: DetailAttributes,
    pub pseudo_sales: i32,
    pub top_seller: bool,
    pub notification_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<Vec<Variant>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<Image>>,
}

impl BasicProduct {
    pub fn new(
        id: ProductId,
        details: DetailAttributes,
        pseudo_sales: i32,
        top_seller: bool,
        notification_enabled: bool,
    ) -> Self {
        Self {
            id,
            details,
            pseudo_sales,
            top_seller,
            notification_enabled,
            variants: None,
            properties: None,
            images: None,
        }
    }
}
