//! Result-set shapes shared by every `CatalogStore` implementation
//!
//! Each query the exporter issues reads its rows into one of five shapes. The
//! shapes differ in how they treat repeated keys, and the exporter depends on
//! those differences:
//!
//! | shape          | repeated key                      |
//! |----------------|-----------------------------------|
//! | [`column`]     | n/a, one scalar per row           |
//! | [`single`]     | n/a, first row only               |
//! | [`group`]      | every row appended to the key     |
//! | [`group_unique`] | first row kept, later ones dropped |
//! | [`key_pairs`]  | last row overwrites               |
//!
//! All grouped shapes keep keys in first-occurrence order.

use indexmap::map::Entry;
use indexmap::IndexMap;
use std::hash::Hash;

/// Scalar column list
pub fn column<T>(rows: impl IntoIterator<Item = (T,)>) -> Vec<T> {
    rows.into_iter().map(|(value,)| value).collect()
}

/// First row of the result, if any
pub fn single<T>(rows: impl IntoIterator<Item = T>) -> Option<T> {
    rows.into_iter().next()
}

/// Rows grouped by their leading column, every row retained
pub fn group<K, V>(rows: impl IntoIterator<Item = (K, V)>) -> IndexMap<K, Vec<V>>
where
    K: Hash + Eq,
{
    let mut grouped: IndexMap<K, Vec<V>> = IndexMap::new();
    for (key, value) in rows {
        grouped.entry(key).or_default().push(value);
    }
    grouped
}

/// Rows grouped by their leading column, one row kept per key (first seen wins)
pub fn group_unique<K, V>(rows: impl IntoIterator<Item = (K, V)>) -> IndexMap<K, V>
where
    K: Hash + Eq,
{
    let mut grouped = IndexMap::new();
    for (key, value) in rows {
        if let Entry::Vacant(slot) = grouped.entry(key) {
            slot.insert(value);
        }
    }
    grouped
}

/// Two-column rows as a flat key/value mapping
pub fn key_pairs<K, V>(rows: impl IntoIterator<Item = (K, V)>) -> IndexMap<K, V>
where
    K: Hash + Eq,
{
    let mut pairs = IndexMap::new();
    for (key, value) in rows {
        pairs.insert(key, value);
    }
    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_column_unwraps_single_field_rows() {
        assert_eq!(column(vec![(3_i64,), (5,), (7,)]), vec![3, 5, 7]);
    }

    #[test]
    fn test_single_takes_first_row() {
        assert_eq!(single(vec!["a", "b"]), Some("a"));
        assert_eq!(single(Vec::<&str>::new()), None);
    }

    #[test]
    fn test_group_keeps_every_row_in_order() {
        let grouped = group(vec![(2, "x"), (1, "y"), (2, "z")]);

        assert_eq!(grouped.keys().copied().collect::<Vec<_>>(), vec![2, 1]);
        assert_eq!(grouped[&2], vec!["x", "z"]);
        assert_eq!(grouped[&1], vec!["y"]);
    }

    #[test]
    fn test_group_unique_keeps_first_row() {
        let grouped = group_unique(vec![(2, "first"), (1, "only"), (2, "second")]);

        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped[&2], "first");
        assert_eq!(grouped.get_index(0), Some((&2, &"first")));
    }

    #[test]
    fn test_key_pairs_last_row_wins() {
        let pairs = key_pairs(vec![("a", 1), ("b", 2), ("a", 3)]);

        assert_eq!(pairs["a"], 3);
        assert_eq!(pairs.keys().copied().collect::<Vec<_>>(), vec!["a", "b"]);
    }
}
