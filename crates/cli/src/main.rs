//! Catalog CLI - incremental product catalog export
//!
//! This binary provides the command-line interface for the catalog exporter.

#![deny(warnings)]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use catalog::commands;
use catalog_core::config::Config;
use catalog_core::Scope;
use catalog_storage::{create_postgres_store, PostgresCatalogStore};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "catalog")]
#[command(about = "Incremental, checkpointed product catalog export")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Create the export cursor of a shop if it is missing
    Configure {
        #[arg(long)]
        shop_id: i64,
        /// Page size of the new cursor (defaults to exporter.default_batch_size)
        #[arg(long)]
        batch_size: Option<u32>,
    },
    /// Show the export cursor of a shop
    Status {
        #[arg(long)]
        shop_id: i64,
    },
    /// Export the next product batch of a shop as JSON
    Export {
        #[arg(long)]
        shop_id: i64,
        /// Root category of the shop
        #[arg(long)]
        category_id: i64,
        /// Keep exporting until the shop is drained
        #[arg(long)]
        drain: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Migrate => migrate(&config).await,
        Commands::Configure {
            shop_id,
            batch_size,
        } => {
            let store = connect(&config).await?;
            let batch_size = batch_size.unwrap_or(config.exporter.default_batch_size);
            let cursor = commands::configure(store.as_ref(), shop_id, batch_size).await?;
            println!(
                "shop {shop_id}: last_product_id={} batch_size={}",
                cursor.last_product_id, cursor.batch_size
            );
            Ok(())
        }
        Commands::Status { shop_id } => {
            let store = connect(&config).await?;
            println!("{}", commands::status(store.as_ref(), shop_id).await?);
            Ok(())
        }
        Commands::Export {
            shop_id,
            category_id,
            drain,
        } => {
            let store = connect(&config).await?;
            let mut stdout = std::io::stdout().lock();
            let stats = commands::export(
                store,
                config.exporter.clone(),
                Scope::new(shop_id, category_id),
                drain,
                &mut stdout,
            )
            .await?;
            info!(
                shop_id,
                batches = stats.batches,
                exported = stats.products_exported,
                "Export finished"
            );
            Ok(())
        }
    }
}

/// Initialize logging system
///
/// Logs go to stderr; stdout carries the exported JSON.
fn init_logging(verbose: bool) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "catalog={level},catalog_core={level},catalog_storage={level},catalog_exporter={level}"
        ))
        .with_writer(std::io::stderr)
        .init();

    Ok(())
}

async fn connect(config: &Config) -> Result<Arc<PostgresCatalogStore>> {
    create_postgres_store(&config.storage)
        .await
        .context("Failed to connect to Postgres")
}

async fn migrate(config: &Config) -> Result<()> {
    let store = connect(config).await?;

    info!("Running database migrations");
    store
        .run_migrations()
        .await
        .context("Failed to run database migrations")?;
    info!("Database migrations completed successfully");

    Ok(())
}

