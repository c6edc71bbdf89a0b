use catalog_core::ProductId;
use serde::{Deserialize, Serialize};

/// Manufacturer text attached to a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manufacturer {
    pub name: String,
    #[serde(default)]
    pub meta_title: Option<String>,
}

/// The translated text fields of a product that feed the search index
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchableProduct {
    pub id: ProductId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub keywords: Option<String>,
    #[serde(default)]
    pub meta_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub description_long: Option<String>,
    #[serde(default)]
    pub manufacturer: Option<Manufacturer>,
}

impl SearchableProduct {
    pub fn new(id: ProductId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_keywords(mut self, keywords: impl Into<String>) -> Self {
        self.keywords = Some(keywords.into());
        self
    }

    pub fn with_meta_title(mut self, meta_title: impl Into<String>) -> Self {
        self.meta_title = Some(meta_title.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_description_long(mut self, description_long: impl Into<String>) -> Self {
        self.description_long = Some(description_long.into());
        self
    }

    pub fn with_manufacturer(mut self, manufacturer: Manufacturer) -> Self {
        self.manufacturer = Some(manufacturer);
        self
    }
}
