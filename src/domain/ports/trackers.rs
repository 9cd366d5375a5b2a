//! Outbound tracker ports.
//!
//! One trait per tracker. Each method is a single API call; deciding
//! what to send and what to persist afterwards belongs to the services.

use async_trait::async_trait;
use serde::Serialize;

use crate::domain::errors::TrackerError;

/// Issue to create on Redmine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRedmineIssue {
    pub project_id: i64,
    pub subject: String,
    pub description: String,
    pub tracker_id: i64,
    pub status_id: i64,
}

/// Fields sent when updating a Redmine issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RedmineIssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    pub description: String,
}

/// Issue to create on GitHub.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewGithubIssue {
    pub title: String,
    pub body: String,
    pub assignees: Vec<String>,
}

/// Fields sent when updating a GitHub issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GithubIssueUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub body: String,
    pub assignees: Vec<String>,
}

/// Result of the token diagnostic call made after a failed transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenScopes {
    pub status: u16,
    pub scopes: Option<String>,
}

/// GitHub issue operations.
#[async_trait]
pub trait GithubApi: Send + Sync {
    /// Create an issue and return its number.
    async fn create_issue(&self, repo: &str, issue: &NewGithubIssue) -> Result<i64, TrackerError>;

    async fn update_issue(
        &self,
        repo: &str,
        number: i64,
        update: &GithubIssueUpdate,
    ) -> Result<(), TrackerError>;

    /// Move an issue to another repository of the same owner.
    ///
    /// Only HTTP 201 counts as success.
    async fn transfer_issue(&self, repo: &str, number: i64, new_repo: &str)
        -> Result<(), TrackerError>;

    /// Report the status and OAuth scopes of the configured token.
    async fn token_scopes(&self) -> Result<TokenScopes, TrackerError>;
}

/// Redmine issue operations.
#[async_trait]
pub trait RedmineApi: Send + Sync {
    /// Create an issue and return its id.
    async fn create_issue(&self, issue: &NewRedmineIssue) -> Result<i64, TrackerError>;

    async fn update_issue(&self, id: i64, update: &RedmineIssueUpdate) -> Result<(), TrackerError>;
}
