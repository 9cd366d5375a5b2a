//! `migrate`: bring the link database schema up to date.

use anyhow::Result;
use serde::Serialize;

use super::open_database;
use crate::adapters::sqlite::Migrator;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

#[derive(Debug, Serialize)]
pub struct MigrateOutput {
    pub database_url: String,
    pub schema_version: i64,
}

impl CommandOutput for MigrateOutput {
    fn to_human(&self) -> String {
        format!(
            "Database {} is at schema version {}.",
            self.database_url, self.schema_version
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(&config.database).await?;
    let schema_version = Migrator::new(pool.clone()).get_current_version().await?;
    pool.close().await;

    output(
        &MigrateOutput {
            database_url: config.database.url.clone(),
            schema_version,
        },
        json_mode,
    );
    Ok(())
}
