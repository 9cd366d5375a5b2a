//! Webhook HTTP server.
//!
//! Receives issue webhooks from both trackers and hands them to the
//! reconciler. Both hooks answer `OK`; only a link store failure turns the
//! status into 500. Every other path or method answers `Not Found` with 200.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::post,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use crate::domain::models::ServerConfig;
use crate::services::{EventNormalizer, GithubNormalizer, Outcome, Reconciler, RedmineNormalizer};

const ACK: &str = "OK";
const NOT_FOUND: &str = "Not Found";

/// GitHub caps webhook payloads at 25 MB.
const MAX_WEBHOOK_BYTES: usize = 25 * 1024 * 1024;

/// Configuration for the webhook server.
#[derive(Debug, Clone)]
pub struct WebhookHttpConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
}

impl Default for WebhookHttpConfig {
    fn default() -> Self {
        let server = ServerConfig::default();
        Self {
            host: server.host,
            port: server.port,
        }
    }
}

impl From<&ServerConfig> for WebhookHttpConfig {
    fn from(config: &ServerConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
        }
    }
}

/// Shared state for the webhook handlers.
pub struct WebhookState {
    pub reconciler: Reconciler,
}

impl WebhookState {
    pub fn new(reconciler: Reconciler) -> Self {
        Self { reconciler }
    }
}

/// Build the webhook router.
pub fn router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/github_hook", post(github_hook).fallback(not_found))
        .route("/redmine_hook", post(redmine_hook).fallback(not_found))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_WEBHOOK_BYTES))
        .layer(TraceLayer::new_for_http())
}

/// Webhook HTTP server.
pub struct WebhookServer {
    state: Arc<WebhookState>,
    config: WebhookHttpConfig,
}

impl WebhookServer {
    pub fn new(reconciler: Reconciler, config: WebhookHttpConfig) -> Self {
        Self {
            state: Arc::new(WebhookState::new(reconciler)),
            config,
        }
    }

    fn addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.config.host, self.config.port).parse()
    }

    /// Start the server with a shutdown signal.
    pub async fn serve_with_shutdown<F>(
        self,
        shutdown: F,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr()?;
        let router = router(self.state);

        tracing::info!("Webhook server listening on {}", addr);

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

async fn github_hook(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    relay(&state, &GithubNormalizer, &body).await
}

async fn redmine_hook(
    State(state): State<Arc<WebhookState>>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    relay(&state, &RedmineNormalizer, &body).await
}

async fn relay(
    state: &WebhookState,
    normalizer: &dyn EventNormalizer,
    body: &[u8],
) -> (StatusCode, &'static str) {
    let tracker = normalizer.tracker();
    let event = match normalizer.normalize(body) {
        Ok(event) => event,
        Err(reason) => {
            debug!(%tracker, %reason, "skipping webhook");
            return (StatusCode::OK, ACK);
        }
    };

    match state.reconciler.handle(&event).await {
        Ok(outcome) => {
            if let Outcome::Relayed(reports) = &outcome {
                let applied = reports.iter().filter(|r| r.result.is_applied()).count();
                debug!(%tracker, operations = reports.len(), applied, "webhook relayed");
            }
            (StatusCode::OK, ACK)
        }
        Err(err) => {
            error!(
                %tracker,
                external_id = event.external_id,
                error = %err,
                "webhook handling failed"
            );
            (StatusCode::INTERNAL_SERVER_ERROR, ACK)
        }
    }
}

async fn not_found() -> &'static str {
    NOT_FOUND
}
