//! Common test utilities for integration tests
//!
//! Builds the full webhook router against wiremock servers standing in for
//! GitHub and Redmine, with an in-memory link store.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wiremock::MockServer;

use issue_relay::adapters::http::{router, WebhookState};
use issue_relay::adapters::sqlite::{create_migrated_test_pool, SqliteLinkRepository};
use issue_relay::domain::models::Config;
use issue_relay::infrastructure::trackers::{
    GithubClient, GithubClientConfig, RedmineClient, RedmineClientConfig,
};
use issue_relay::services::{Reconciler, SyncAdapters, SyncSettings};

pub const GITHUB_TOKEN: &str = "gh-test-token";
pub const REDMINE_KEY: &str = "redmine-test-key";
pub const OWNER: &str = "softguard";
pub const REDMINE_PUBLIC_URL: &str = "https://redmine.example.test";

/// A relay wired to mock trackers.
pub struct TestRelay {
    pub app: Router,
    pub links: Arc<SqliteLinkRepository>,
    pub github: MockServer,
    pub redmine: MockServer,
}

impl TestRelay {
    pub async fn start() -> Self {
        let github = MockServer::start().await;
        let redmine = MockServer::start().await;

        let config = test_config(&github.uri(), &redmine.uri());
        let pool = create_migrated_test_pool()
            .await
            .expect("Failed to create test database");
        let links = Arc::new(SqliteLinkRepository::new(pool));

        let adapters = SyncAdapters::new(
            links.clone(),
            Arc::new(GithubClient::new(GithubClientConfig::from(&config.github)).unwrap()),
            Arc::new(RedmineClient::new(RedmineClientConfig::from(&config.redmine)).unwrap()),
            SyncSettings::from_config(&config),
        );
        let app = router(Arc::new(WebhookState::new(Reconciler::new(adapters))));

        Self {
            app,
            links,
            github,
            redmine,
        }
    }

    /// POST a JSON webhook and return status and body text.
    pub async fn post_json(&self, path: &str, payload: &Value) -> (StatusCode, String) {
        self.post_raw(path, payload.to_string()).await
    }

    pub async fn post_raw(&self, path: &str, body: impl Into<Body>) -> (StatusCode, String) {
        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header("content-type", "application/json")
            .body(body.into())
            .unwrap();
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, String) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Total requests received by both mock trackers.
    pub async fn outbound_calls(&self) -> usize {
        self.github.received_requests().await.unwrap_or_default().len()
            + self.redmine.received_requests().await.unwrap_or_default().len()
    }
}

pub fn test_config(github_uri: &str, redmine_uri: &str) -> Config {
    let mut config = Config::default();
    config.github.api_url = github_uri.to_string();
    config.github.owner = OWNER.to_string();
    config.github.api_key = GITHUB_TOKEN.to_string();
    config.github.timeout_secs = 5;
    config.redmine.url = redmine_uri.to_string();
    config.redmine.public_url = Some(REDMINE_PUBLIC_URL.to_string());
    config.redmine.api_key = REDMINE_KEY.to_string();
    config.redmine.timeout_secs = 5;
    config
}

/// GitHub `issues` webhook body.
pub fn github_payload(action: &str, number: i64, repo: &str, title: &str, body: &str) -> Value {
    json!({
        "action": action,
        "issue": {
            "number": number,
            "title": title,
            "body": body,
            "assignee": null
        },
        "repository": {
            "full_name": format!("{OWNER}/{repo}")
        }
    })
}

/// Redmine webhook body, optionally with a journal.
pub fn redmine_payload(action: &str, id: i64, project_id: i64, journal: Option<Value>) -> Value {
    let mut payload = json!({
        "payload": {
            "action": action,
            "issue": {
                "id": id,
                "subject": "Crash on login",
                "description": "Stack trace attached",
                "status": { "id": 1 },
                "author": { "name": "Paul Mercier" },
                "assignee": { "login": "pmercier" },
                "project": { "id": project_id }
            }
        }
    });
    if let Some(journal) = journal {
        payload["payload"]["journal"] = journal;
    }
    payload
}

/// Journal detail moving an issue between projects.
pub fn project_move(old_project: i64, new_project: i64) -> Value {
    json!({
        "details": [
            { "prop_key": "project_id", "old_value": old_project.to_string(), "value": new_project.to_string() }
        ]
    })
}
