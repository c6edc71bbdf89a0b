//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_POSTGRES_HOST: &str = "localhost";
pub(crate) const DEFAULT_POSTGRES_DATABASE: &str = "catalog";
pub(crate) const DEFAULT_POSTGRES_USER: &str = "catalog";
pub(crate) const DEFAULT_POSTGRES_PASSWORD: &str = "catalog";

pub(crate) fn default_postgres_host() -> String {
    DEFAULT_POSTGRES_HOST.to_string()
}

pub(crate) fn default_postgres_port() -> u16 {
    5432
}

pub(crate) fn default_postgres_database() -> String {
    DEFAULT_POSTGRES_DATABASE.to_string()
}

pub(crate) fn default_postgres_user() -> String {
    DEFAULT_POSTGRES_USER.to_string()
}

pub(crate) fn default_postgres_password() -> String {
    DEFAULT_POSTGRES_PASSWORD.to_string()
}

pub(crate) fn default_postgres_pool_size() -> u32 {
    10
}

pub(crate) fn default_max_concurrent_facet_queries() -> usize {
    8
}

pub(crate) fn default_batch_size() -> u32 {
    100
}
