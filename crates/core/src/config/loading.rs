//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, Environment, File};
use std::path::Path;
use tracing::debug;

use super::{global_config_path, Config};

const POSTGRES_ENV_OVERRIDES: [(&str, &str); 5] = [
    ("POSTGRES_HOST", "storage.postgres_host"),
    ("POSTGRES_PORT", "storage.postgres_port"),
    ("POSTGRES_DATABASE", "storage.postgres_database"),
    ("POSTGRES_USER", "storage.postgres_user"),
    ("POSTGRES_PASSWORD", "storage.postgres_password"),
];

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `CATALOG_` and use double underscores
    /// for nested values. For example:
    /// - `CATALOG_EXPORTER__MAX_CONCURRENT_FACET_QUERIES=16`
    pub fn from_file(path: &Path) -> Result<Self> {
        let mut builder = ConfigLib::builder();

        // Add the config file if it exists
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        // Add environment variables with CATALOG_ prefix
        builder = builder.add_source(
            Environment::with_prefix("CATALOG")
                .separator("__")
                .try_parsing(true),
        );

        // Conventional libpq-style variables win over everything else
        for (var, key) in POSTGRES_ENV_OVERRIDES {
            let Ok(value) = std::env::var(var) else {
                continue;
            };
            builder = if key == "storage.postgres_port" {
                let port: u16 = value
                    .parse()
                    .map_err(|e| Error::config(format!("Invalid {var} '{value}': {e}")))?;
                builder.set_override(key, port)
            } else {
                builder.set_override(key, value)
            }
            .map_err(|e| Error::config(format!("Failed to apply {var}: {e}")))?;
        }

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration from a single file
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.catalog/config.toml or custom --config path)
    /// 3. Environment variables (CATALOG_*, POSTGRES_*)
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => p.to_path_buf(),
            None => global_config_path()?,
        };
        let config = Self::from_file(&path)?;
        config.validate()?;
        debug!(
            path = %path.display(),
            file_present = path.exists(),
            "Loaded configuration"
        );
        Ok(config)
    }
}
