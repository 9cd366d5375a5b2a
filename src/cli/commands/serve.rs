//! `serve`: run the webhook relay.

use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::sync::Arc;

use super::open_database;
use crate::adapters::http::{WebhookHttpConfig, WebhookServer};
use crate::adapters::sqlite::SqliteLinkRepository;
use crate::domain::models::Config;
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::trackers::{
    GithubClient, GithubClientConfig, RedmineClient, RedmineClientConfig,
};
use crate::services::{Reconciler, SyncAdapters, SyncSettings};

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Host to bind to (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

impl ServeArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
    }
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    args.apply(&mut config);
    ConfigLoader::validate(&config)?;
    ConfigLoader::validate_trackers(&config)?;

    let pool = open_database(&config.database).await?;

    let github = GithubClient::new(GithubClientConfig::from(&config.github))
        .context("Failed to build GitHub client")?;
    let redmine = RedmineClient::new(RedmineClientConfig::from(&config.redmine))
        .context("Failed to build Redmine client")?;

    let adapters = SyncAdapters::new(
        Arc::new(SqliteLinkRepository::new(pool.clone())),
        Arc::new(github),
        Arc::new(redmine),
        SyncSettings::from_config(&config),
    );
    let server = WebhookServer::new(
        Reconciler::new(adapters),
        WebhookHttpConfig::from(&config.server),
    );

    tracing::info!(
        github_owner = %config.github.owner,
        redmine_url = %config.redmine.url,
        "starting issue relay"
    );

    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|err| anyhow!(err))
        .context("Webhook server failed")?;

    pool.close().await;
    tracing::info!("issue relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("shutdown signal received"),
        Err(err) => {
            tracing::error!(error = %err, "failed to listen for shutdown signal");
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let mut config = Config::default();
        let args = ServeArgs {
            host: Some("127.0.0.1".to_string()),
            port: Some(9000),
        };
        args.apply(&mut config);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);

        let mut config = Config::default();
        ServeArgs { host: None, port: None }.apply(&mut config);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 4567);
    }
}
