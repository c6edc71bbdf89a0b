//! CLI command handlers against the in-memory catalog store

use catalog::commands;
use catalog_core::config::ExporterConfig;
use catalog_core::Scope;
use catalog_storage::mock::DetailSeed;
use catalog_storage::MockCatalogStore;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;

fn shop_catalog() -> MockCatalogStore {
    let store = MockCatalogStore::new();
    store.add_category(12, None).add_category(99, Some("|12|"));
    for id in [3, 5, 7] {
        store
            .add_product(id, DetailSeed::with_stock(2))
            .assign_category(id, 99);
    }
    store
}

fn exported_ids(output: &[u8]) -> Vec<Vec<i64>> {
    String::from_utf8_lossy(output)
        .lines()
        .map(|line| {
            let payload: Value = serde_json::from_str(line).unwrap();
            payload["list"]
                .as_array()
                .unwrap()
                .iter()
                .map(|p| p["id"].as_i64().unwrap())
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn test_configure_keeps_existing_cursor() {
    let store = shop_catalog();

    let created = commands::configure(&store, 1, 25).await.unwrap();
    assert_eq!((created.last_product_id, created.batch_size), (0, 25));

    store.set_watermark(1, 7);
    let existing = commands::configure(&store, 1, 50).await.unwrap();
    assert_eq!((existing.last_product_id, existing.batch_size), (7, 25));
}

#[tokio::test]
async fn test_configure_rejects_zero_batch_size() {
    let store = shop_catalog();

    assert!(commands::configure(&store, 1, 0).await.is_err());
    assert_eq!(store.cursor(1), None);
}

#[tokio::test]
async fn test_status_reports_cursor() {
    let store = shop_catalog();
    store.add_cursor(1, 2, 5);

    assert_eq!(
        commands::status(&store, 1).await.unwrap(),
        "shop 1: last_product_id=5 batch_size=2"
    );
    assert!(commands::status(&store, 2)
        .await
        .unwrap()
        .contains("no export cursor"));
}

#[tokio::test]
async fn test_export_writes_one_batch() {
    let store = shop_catalog();
    store.add_cursor(1, 2, 0);
    let mut output = Vec::new();

    let stats = commands::export(
        Arc::new(store.clone()),
        ExporterConfig::default(),
        Scope::new(1, 12),
        false,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(exported_ids(&output), vec![vec![3, 5]]);
    assert_eq!(stats.products_exported, 2);
    assert_eq!(store.cursor(1), Some((2, 5)));
}

#[tokio::test]
async fn test_export_counts_batch_without_base_records() {
    let store = shop_catalog();
    store
        .add_cursor(1, 10, 7)
        .add_product_without_details(9)
        .assign_category(9, 99);
    let mut output = Vec::new();

    let stats = commands::export(
        Arc::new(store.clone()),
        ExporterConfig::default(),
        Scope::new(1, 12),
        false,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(exported_ids(&output), vec![Vec::<i64>::new()]);
    assert_eq!(stats.batches, 1);
    assert_eq!(stats.products_selected, 1);
    assert_eq!(stats.products_exported, 0);
    assert_eq!(stats.last_product_id, Some(9));
    assert_eq!(store.cursor(1), Some((10, 9)));
}

#[tokio::test]
async fn test_export_unknown_category_fails() {
    let store = shop_catalog();
    store.add_cursor(1, 2, 0);
    let mut output = Vec::new();

    let result = commands::export(
        Arc::new(store.clone()),
        ExporterConfig::default(),
        Scope::new(1, 777),
        false,
        &mut output,
    )
    .await;

    assert!(result.is_err());
    assert!(output.is_empty());
    assert_eq!(store.cursor(1), Some((2, 0)));
}

#[tokio::test]
async fn test_export_drain_writes_every_batch() {
    let store = shop_catalog();
    store.add_cursor(1, 2, 0);
    let mut output = Vec::new();

    let stats = commands::export(
        Arc::new(store.clone()),
        ExporterConfig::default(),
        Scope::new(1, 12),
        true,
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(exported_ids(&output), vec![vec![3, 5], vec![7]]);
    assert_eq!(stats.batches, 2);
    assert_eq!(stats.last_product_id, Some(7));
}

#[tokio::test]
async fn test_export_without_cursor_fails() {
    let store = shop_catalog();
    let mut output = Vec::new();

    let result = commands::export(
        Arc::new(store),
        ExporterConfig::default(),
        Scope::new(1, 12),
        false,
        &mut output,
    )
    .await;

    assert!(result.is_err());
    assert!(output.is_empty());
}
