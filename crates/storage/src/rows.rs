//! Row types read from the catalog tables

use catalog_core::error::Result;
use catalog_core::{BasicProduct, CategoryId, Cursor, DetailAttributes, Image, ProductId, ShopId};

/// `product_details.kind` of the master row
pub const DETAIL_KIND_MASTER: i16 = 1;
/// `product_details.kind` of a variant row
pub const DETAIL_KIND_VARIANT: i16 = 2;

/// LIKE pattern matching every category whose ancestor path contains `root`
pub fn category_path_pattern(root: CategoryId) -> String {
    format!("%|{root}|%")
}

/// Whether a stored ancestor path lists `root` as one of its ancestors
pub fn path_contains(path: &str, root: CategoryId) -> bool {
    path.contains(&format!("|{root}|"))
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CursorRow {
    pub shop_id: ShopId,
    pub batch_size: i32,
    pub last_product_id: ProductId,
}

impl CursorRow {
    pub fn into_cursor(self) -> Result<Cursor> {
        Cursor::new(self.last_product_id, i64::from(self.batch_size))
    }
}

/// One `product_details` row
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct DetailRow {
    pub product_id: ProductId,
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

impl DetailRow {
    /// Splits the row into its product key and exported attributes
    pub fn into_keyed(self) -> (ProductId, DetailAttributes) {
        let attributes = DetailAttributes {
            active: self.active,
            in_stock: self.in_stock,
            instock_minimum: self.stock_min,
            sale: self.last_stock,
            min_purchase: self.min_purchase,
            max_purchase: self.max_purchase,
            purchase_steps: self.purchase_steps,
            shipping_ready: self.in_stock > 0,
            shipping_free: self.shipping_free,
            shipping_time: self.shipping_time,
        };
        (self.product_id, attributes)
    }
}

/// Detail row joined to its product master row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct BaseProductRow {
    #[sqlx(flatten)]
    pub detail: DetailRow,
    pub pseudo_sales: i32,
    pub topseller: bool,
    pub notification: bool,
}

impl BaseProductRow {
    pub fn into_keyed(self) -> (ProductId, BasicProduct) {
        let (id, details) = self.detail.into_keyed();
        let product = BasicProduct::new(
            id,
            details,
            self.pseudo_sales,
            self.topseller,
            self.notification,
        );
        (id, product)
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct MediaRow {
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub extension: String,
    pub file_size: i64,
}

impl From<MediaRow> for Image {
    fn from(row: MediaRow) -> Self {
        Image {
            width: row.width,
            height: row.height,
            extension: row.extension,
            file_size: row.file_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_matching_requires_whole_id() {
        assert!(path_contains("|1|12|", 12));
        assert!(path_contains("|12|", 12));
        assert!(!path_contains("|112|", 12));
        assert!(!path_contains("|1|120|", 12));
        assert_eq!(category_path_pattern(12), "%|12|%");
    }

    #[test]
    fn test_shipping_ready_follows_stock() {
        let row = DetailRow {
            product_id: 4,
            active: true,
            in_stock: 0,
            stock_min: 2,
            last_stock: true,
            min_purchase: 1,
            max_purchase: Some(10),
            purchase_steps: None,
            shipping_free: false,
            shipping_time: None,
        };
        let (id, attributes) = row.clone().into_keyed();
        assert_eq!(id, 4);
        assert!(!attributes.shipping_ready);
        assert_eq!(attributes.instock_minimum, 2);
        assert!(attributes.sale);

        let (_, attributes) = DetailRow { in_stock: 3, ..row }.into_keyed();
        assert!(attributes.shipping_ready);
    }

    #[test]
    fn test_cursor_row_validation() {
        let row = CursorRow {
            shop_id: 1,
            batch_size: 0,
            last_product_id: 0,
        };
        assert!(row.into_cursor().is_err());
    }
}
