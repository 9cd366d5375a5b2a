use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::models::config::Config;

/// Config file read when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "relay.yaml";

/// Environment variables of the original deployment and the keys they set
const LEGACY_ENV: &[(&str, &str)] = &[
    ("GITHUB_API_KEY", "github.api_key"),
    ("GITHUB_OWNER", "github.owner"),
    ("GITHUB_REPO", "github.default_repo"),
    ("REDMINE_API_KEY", "redmine.api_key"),
    ("REDMINE_URL", "redmine.url"),
    ("DATABASE_URL", "database.url"),
];

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    MissingFile(PathBuf),

    #[error("Invalid port: 0")]
    InvalidPort,

    #[error("Database url cannot be empty")]
    EmptyDatabaseUrl,

    #[error("Invalid max_connections: {0}. Must be at least 1")]
    InvalidMaxConnections(u32),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("GitHub owner cannot be empty (set github.owner or GITHUB_OWNER)")]
    MissingGithubOwner,

    #[error("Redmine url cannot be empty (set redmine.url or REDMINE_URL)")]
    MissingRedmineUrl,

    #[error("Invalid {0} timeout: must be at least 1 second")]
    InvalidTimeout(&'static str),

    #[error("Invalid default_project_id: {0}. Must be positive")]
    InvalidDefaultProject(i64),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. `relay.yaml`, or the file given with `--config` (which must exist)
    /// 3. Legacy variables (`GITHUB_API_KEY`, `REDMINE_URL`, ...)
    /// 4. Environment variables (`RELAY_*` prefix, `__` for nesting)
    pub fn load(path: Option<&Path>) -> Result<Config> {
        let file = match path {
            Some(path) if !path.exists() => {
                return Err(ConfigError::MissingFile(path.to_path_buf()).into());
            }
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let config: Config = Self::figment(&file)
            .extract()
            .with_context(|| format!("Failed to load config from {}", file.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    fn figment(file: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(file))
            .merge(legacy_env())
            .merge(Env::prefixed("RELAY_").split("__"))
    }

    /// Validate settings every command depends on
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.server.port == 0 {
            return Err(ConfigError::InvalidPort);
        }

        if config.database.url.trim().is_empty() {
            return Err(ConfigError::EmptyDatabaseUrl);
        }

        if config.database.max_connections == 0 {
            return Err(ConfigError::InvalidMaxConnections(
                config.database.max_connections,
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }

    /// Validate the tracker settings the webhook server needs
    pub fn validate_trackers(config: &Config) -> Result<(), ConfigError> {
        if config.github.owner.trim().is_empty() {
            return Err(ConfigError::MissingGithubOwner);
        }

        if config.redmine.url.trim().is_empty() {
            return Err(ConfigError::MissingRedmineUrl);
        }

        if config.github.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("github"));
        }

        if config.redmine.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout("redmine"));
        }

        if config.redmine.default_project_id <= 0 {
            return Err(ConfigError::InvalidDefaultProject(
                config.redmine.default_project_id,
            ));
        }

        Ok(())
    }
}

fn legacy_env() -> Env {
    let names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        LEGACY_ENV
            .iter()
            .find(|(name, _)| key.as_str().eq_ignore_ascii_case(name))
            .map_or_else(|| key.as_str().into(), |(_, path)| (*path).into())
    })
}
