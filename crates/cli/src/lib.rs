//! Library interface for the catalog CLI
//!
//! The command handlers live here so integration tests can drive them against
//! the in-memory store, while argument parsing and logging setup stay in main.rs.

pub mod commands;

pub use anyhow::Result;
pub use catalog_core::config::Config;
