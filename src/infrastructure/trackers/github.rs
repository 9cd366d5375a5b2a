//! GitHub REST client.

use async_trait::async_trait;
use reqwest::{header, Client as ReqwestClient, Method, RequestBuilder, StatusCode};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use super::{failure, json_body};
use crate::domain::errors::TrackerError;
use crate::domain::models::GithubConfig;
use crate::domain::ports::{GithubApi, GithubIssueUpdate, NewGithubIssue, TokenScopes};

const ACCEPT: &str = "application/vnd.github.v3+json";

/// Configuration for the GitHub client
#[derive(Debug, Clone)]
pub struct GithubClientConfig {
    /// Base URL for the REST API
    pub api_url: String,
    /// Repository owner
    pub owner: String,
    /// Personal access token
    pub api_key: String,
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl From<&GithubConfig> for GithubClientConfig {
    fn from(config: &GithubConfig) -> Self {
        Self {
            api_url: config.api_url.trim_end_matches('/').to_string(),
            owner: config.owner.clone(),
            api_key: config.api_key.clone(),
            user_agent: config.user_agent.clone(),
            timeout_secs: config.timeout_secs,
        }
    }
}

/// GitHub issues client with a shared connection pool.
pub struct GithubClient {
    http_client: ReqwestClient,
    config: GithubClientConfig,
}

impl GithubClient {
    pub fn new(config: GithubClientConfig) -> Result<Self, TrackerError> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn issues_url(&self, repo: &str) -> String {
        format!(
            "{}/repos/{}/{}/issues",
            self.config.api_url, self.config.owner, repo
        )
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(header::AUTHORIZATION, format!("token {}", self.config.api_key))
            .header(header::ACCEPT, ACCEPT)
            .header(header::USER_AGENT, &self.config.user_agent)
    }
}

#[async_trait]
impl GithubApi for GithubClient {
    #[instrument(skip(self, issue), fields(owner = %self.config.owner))]
    async fn create_issue(&self, repo: &str, issue: &NewGithubIssue) -> Result<i64, TrackerError> {
        let url = self.issues_url(repo);
        debug!(%url, title = %issue.title, assignees = ?issue.assignees, "sending GitHub create request");

        let response = self.request(Method::POST, &url).json(issue).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(failure(response).await);
        }

        let body = json_body(response).await?;
        debug!(status = status.as_u16(), "GitHub create response");
        body.get("number")
            .and_then(serde_json::Value::as_i64)
            .ok_or_else(|| TrackerError::InvalidResponse(format!("missing issue number: {body}")))
    }

    #[instrument(skip(self, update), fields(owner = %self.config.owner))]
    async fn update_issue(
        &self,
        repo: &str,
        number: i64,
        update: &GithubIssueUpdate,
    ) -> Result<(), TrackerError> {
        let url = format!("{}/{number}", self.issues_url(repo));
        debug!(%url, assignees = ?update.assignees, "sending GitHub update request");

        let response = self.request(Method::PATCH, &url).json(update).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(failure(response).await);
        }
        debug!(status = status.as_u16(), "GitHub update response");
        Ok(())
    }

    #[instrument(skip(self), fields(owner = %self.config.owner))]
    async fn transfer_issue(
        &self,
        repo: &str,
        number: i64,
        new_repo: &str,
    ) -> Result<(), TrackerError> {
        let url = format!("{}/{number}/transfer", self.issues_url(repo));
        debug!(%url, "sending GitHub transfer request");

        let response = self
            .request(Method::POST, &url)
            .json(&json!({ "new_repository": new_repo }))
            .send()
            .await?;
        debug!(status = response.status().as_u16(), "GitHub transfer response");

        // Any other status, 2xx included, means the issue did not move.
        if response.status() != StatusCode::CREATED {
            return Err(failure(response).await);
        }
        Ok(())
    }

    async fn token_scopes(&self) -> Result<TokenScopes, TrackerError> {
        let url = format!("{}/user", self.config.api_url);
        let response = self.request(Method::GET, &url).send().await?;

        let scopes = response
            .headers()
            .get("x-oauth-scopes")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        Ok(TokenScopes {
            status: response.status().as_u16(),
            scopes,
        })
    }
}
