mod client;

pub use client::{create_postgres_store, PostgresCatalogStore};
