//! Configuration module for the catalog export system
//!
//! This module provides configuration structures and loading mechanisms.
//! Configuration can be loaded from TOML files and/or environment variables.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.catalog/config.toml`.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".catalog").join("config.toml"))
}

/// Main configuration structure for the catalog export system
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Exporter configuration
    #[serde(default)]
    pub exporter: ExporterConfig,
}

/// Configuration for the Postgres catalog database
#[derive(Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Postgres host address
    #[serde(default = "default_postgres_host")]
    pub postgres_host: String,

    /// Postgres port
    #[serde(default = "default_postgres_port")]
    pub postgres_port: u16,

    /// Postgres database name
    #[serde(default = "default_postgres_database")]
    pub postgres_database: String,

    /// Postgres username
    #[serde(default = "default_postgres_user")]
    pub postgres_user: String,

    /// Postgres password
    #[serde(default = "default_postgres_password")]
    pub postgres_password: String,

    /// Postgres connection pool size (max connections)
    #[serde(default = "default_postgres_pool_size")]
    pub postgres_pool_size: u32,
}

impl std::fmt::Debug for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageConfig")
            .field("postgres_host", &self.postgres_host)
            .field("postgres_port", &self.postgres_port)
            .field("postgres_database", &self.postgres_database)
            .field("postgres_user", &self.postgres_user)
            .field("postgres_password", &"***REDACTED***")
            .field("postgres_pool_size", &self.postgres_pool_size)
            .finish()
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            postgres_host: default_postgres_host(),
            postgres_port: default_postgres_port(),
            postgres_database: default_postgres_database(),
            postgres_user: default_postgres_user(),
            postgres_password: default_postgres_password(),
            postgres_pool_size: default_postgres_pool_size(),
        }
    }
}

impl StorageConfig {
    /// Connection URL for the configured Postgres database
    pub fn connection_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.postgres_user,
            self.postgres_password,
            self.postgres_host,
            self.postgres_port,
            self.postgres_database
        )
    }
}

/// Exporter tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExporterConfig {
    /// Bound on concurrent per-product facet queries (properties, images)
    #[serde(default = "default_max_concurrent_facet_queries")]
    pub max_concurrent_facet_queries: usize,

    /// Page size written when a cursor row is first created
    #[serde(default = "default_batch_size")]
    pub default_batch_size: u32,

    /// Upper bound on batches run by a single drain; unbounded when unset
    #[serde(default)]
    pub max_batches_per_drain: Option<usize>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            max_concurrent_facet_queries: default_max_concurrent_facet_queries(),
            default_batch_size: default_batch_size(),
            max_batches_per_drain: None,
        }
    }
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.storage.postgres_pool_size == 0 {
            return Err(Error::config(
                "storage.postgres_pool_size must be greater than 0".to_string(),
            ));
        }

        if self.exporter.max_concurrent_facet_queries == 0 {
            return Err(Error::config(
                "exporter.max_concurrent_facet_queries must be greater than 0".to_string(),
            ));
        }
        if self.exporter.max_concurrent_facet_queries > 256 {
            return Err(Error::config(format!(
                "exporter.max_concurrent_facet_queries too large (max 256, got {})",
                self.exporter.max_concurrent_facet_queries
            )));
        }

        if self.exporter.default_batch_size == 0 {
            return Err(Error::config(
                "exporter.default_batch_size must be greater than 0".to_string(),
            ));
        }

        if self.exporter.max_batches_per_drain == Some(0) {
            return Err(Error::config(
                "exporter.max_batches_per_drain must be greater than 0 when set".to_string(),
            ));
        }

        Ok(())
    }
}
