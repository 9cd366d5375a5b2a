//! HTTP inbound adapter: the webhook endpoints.

pub mod webhook_server;

pub use webhook_server::{router, WebhookHttpConfig, WebhookServer, WebhookState};
