//! Scope resolution: which categories a shop's batch may draw products from

use catalog_core::error::{Error, Result};
use catalog_core::{CategoryId, Scope};
use catalog_storage::CatalogStore;
use std::collections::BTreeSet;
use tracing::debug;

/// A root category plus every descendant, recomputed on each run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryClosure {
    root: CategoryId,
    ids: BTreeSet<CategoryId>,
}

impl CategoryClosure {
    pub fn new(root: CategoryId, ids: impl IntoIterator<Item = CategoryId>) -> Self {
        Self {
            root,
            ids: ids.into_iter().collect(),
        }
    }

    pub fn root(&self) -> CategoryId {
        self.root
    }

    pub fn ids(&self) -> &BTreeSet<CategoryId> {
        &self.ids
    }

    pub fn contains(&self, id: CategoryId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in ascending order, ready to bind as a set parameter
    pub fn to_vec(&self) -> Vec<CategoryId> {
        self.ids.iter().copied().collect()
    }
}

/// Resolve the category closure of `scope`
///
/// Fails with `Error::Config` when the scope has no root category, or when the
/// root category id has no row in the category table.
pub async fn resolve_category_ids(
    store: &dyn CatalogStore,
    scope: &Scope,
) -> Result<CategoryClosure> {
    let root = scope.root_category()?;
    let closure = CategoryClosure::new(root, store.category_closure(root).await?);

    if !closure.contains(root) {
        return Err(Error::config(format!(
            "Root category {root} of shop {} not found",
            scope.shop_id
        )));
    }

    debug!(
        shop_id = scope.shop_id,
        root,
        categories = closure.len(),
        "Resolved category closure"
    );

    Ok(closure)
}
