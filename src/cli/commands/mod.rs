//! CLI command implementations.

pub mod link;
pub mod migrate;
pub mod serve;

use anyhow::{Context, Result};

use crate::adapters::sqlite::{initialize_database, PoolConfig};
use crate::domain::models::DatabaseConfig;

/// Open the link database, applying pending migrations.
pub(crate) async fn open_database(config: &DatabaseConfig) -> Result<sqlx::SqlitePool> {
    initialize_database(
        &config.url,
        Some(PoolConfig::with_max_connections(config.max_connections)),
    )
    .await
    .with_context(|| format!("Failed to open database {}", config.url))
}
