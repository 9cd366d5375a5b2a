//! HTTP clients for the GitHub and Redmine REST APIs.

pub mod github;
pub mod redmine;

pub use github::{GithubClient, GithubClientConfig};
pub use redmine::{RedmineClient, RedmineClientConfig};

use reqwest::Response;

use crate::domain::errors::TrackerError;

impl From<reqwest::Error> for TrackerError {
    fn from(err: reqwest::Error) -> Self {
        TrackerError::Transport(err.to_string())
    }
}

/// Turn a rejected response into a [`TrackerError`] carrying its status and body.
async fn failure(response: Response) -> TrackerError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error response".to_string());
    TrackerError::from_status(status, body)
}

/// Read a success body as JSON, reporting undecodable bodies as invalid responses.
async fn json_body(response: Response) -> Result<serde_json::Value, TrackerError> {
    let text = response.text().await?;
    serde_json::from_str(&text)
        .map_err(|e| TrackerError::InvalidResponse(format!("{e}: {text}")))
}
