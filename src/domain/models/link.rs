//! Issue link domain model.
//!
//! A link pairs a GitHub issue with its Redmine counterpart. Either side
//! may still be missing while the counterpart is being created.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Persisted association between a GitHub issue and a Redmine issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLink {
    /// Row identifier
    pub id: i64,
    /// GitHub issue number
    pub github_id: Option<i64>,
    /// Redmine issue id
    pub redmine_id: Option<i64>,
    /// GitHub repository name (without owner)
    pub github_repo: Option<String>,
    /// When created
    pub created_at: DateTime<Utc>,
    /// When last touched
    pub updated_at: DateTime<Utc>,
}

impl IssueLink {
    /// Both sides are known.
    pub fn is_synced(&self) -> bool {
        self.github_id.is_some() && self.redmine_id.is_some()
    }
}

/// Fields for a link that has not been stored yet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewLink {
    pub github_id: Option<i64>,
    pub redmine_id: Option<i64>,
    pub github_repo: Option<String>,
}

impl NewLink {
    /// Link seeded from a GitHub issue.
    pub fn from_github(github_id: i64, repo: impl Into<String>) -> Self {
        Self {
            github_id: Some(github_id),
            redmine_id: None,
            github_repo: Some(repo.into()),
        }
    }

    /// Link seeded from a Redmine issue.
    pub fn from_redmine(redmine_id: i64) -> Self {
        Self {
            github_id: None,
            redmine_id: Some(redmine_id),
            github_repo: None,
        }
    }
}

/// Partial update of a link. `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkUpdate {
    pub github_id: Option<i64>,
    pub redmine_id: Option<i64>,
    pub github_repo: Option<String>,
}

impl LinkUpdate {
    pub fn redmine_created(redmine_id: i64, repo: impl Into<String>) -> Self {
        Self {
            redmine_id: Some(redmine_id),
            github_repo: Some(repo.into()),
            ..Default::default()
        }
    }

    pub fn github_created(github_id: i64, repo: impl Into<String>) -> Self {
        Self {
            github_id: Some(github_id),
            github_repo: Some(repo.into()),
            ..Default::default()
        }
    }

    pub fn transferred(repo: impl Into<String>) -> Self {
        Self {
            github_repo: Some(repo.into()),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.github_id.is_none() && self.redmine_id.is_none() && self.github_repo.is_none()
    }
}
