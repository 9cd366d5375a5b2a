//! Redmine REST client.

use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, Method, RequestBuilder};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{failure, json_body};
use crate::domain::errors::TrackerError;
use crate::domain::models::RedmineConfig;
use crate::domain::ports::{NewRedmineIssue, RedmineApi, RedmineIssueUpdate};

const API_KEY_HEADER: &str = "X-Redmine-API-Key";

/// Configuration for the Redmine client
#[derive(Debug, Clone)]
pub struct RedmineClientConfig {
    /// Base URL of the Redmine instance
    pub base_url: String,
    pub api_key: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl From<&RedmineConfig> for RedmineClientConfig {
    fn from(config: &RedmineConfig) -> Self {
        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            user_agent: config.user_agent.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

pub struct RedmineClient {
    http_client: ReqwestClient,
    config: RedmineClientConfig,
}

impl RedmineClient {
    pub fn new(config: RedmineClientConfig) -> Result<Self, TrackerError> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(API_KEY_HEADER, &self.config.api_key)
            .header(header::USER_AGENT, &self.config.user_agent)
    }
}

#[async_trait]
impl RedmineApi for RedmineClient {
    #[instrument(skip(self, issue), fields(project_id = issue.project_id))]
    async fn create_issue(&self, issue: &NewRedmineIssue) -> Result<i64, TrackerError> {
        let url = format!("{}/issues.json", self.config.base_url);
        debug!(%url, subject = %issue.subject, "sending Redmine create request");

        let response = self
            .request(Method::POST, &url)
            .json(&json!({ "issue": issue }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(failure(response).await);
        }

        let body = json_body(response).await?;
        debug!(status = status.as_u16(), "Redmine create response");
        body.pointer("/issue/id")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| TrackerError::InvalidResponse(format!("missing issue id: {body}")))
    }

    #[instrument(skip(self, update))]
    async fn update_issue(&self, id: i64, update: &RedmineIssueUpdate) -> Result<(), TrackerError> {
        let url = format!("{}/issues/{id}.json", self.config.base_url);
        debug!(%url, "sending Redmine update request");

        let response = self
            .request(Method::PUT, &url)
            .json(&json!({ "issue": update }))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(failure(response).await);
        }
        debug!(status = status.as_u16(), "Redmine update response");
        Ok(())
    }
}
