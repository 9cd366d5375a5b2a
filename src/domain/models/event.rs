//! Canonical issue events produced from tracker webhooks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Footer marker written into issues created on Redmine from GitHub.
pub const SYNCED_FROM_GITHUB: &str = "Synced from GitHub";

/// Footer marker written into issues created on GitHub from Redmine.
pub const SYNCED_FROM_REDMINE: &str = "Synced from Redmine";

/// The two trackers the relay connects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tracker {
    Github,
    Redmine,
}

impl Tracker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Redmine => "redmine",
        }
    }

    /// Marker that the *other* tracker's relayed issues carry in their body.
    ///
    /// A GitHub issue containing this text was produced by the relay from
    /// a Redmine issue, and vice versa.
    pub fn echo_marker(&self) -> &'static str {
        match self {
            Self::Github => SYNCED_FROM_REDMINE,
            Self::Redmine => SYNCED_FROM_GITHUB,
        }
    }
}

impl fmt::Display for Tracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Webhook action, normalized across both trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueAction {
    Created,
    Opened,
    Edited,
    Updated,
    Unknown,
}

impl IssueAction {
    pub fn parse(s: &str) -> Self {
        match s {
            "created" => Self::Created,
            "opened" => Self::Opened,
            "edited" => Self::Edited,
            "updated" => Self::Updated,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Opened => "opened",
            Self::Edited => "edited",
            Self::Updated => "updated",
            Self::Unknown => "unknown",
        }
    }

    pub fn is_creation(&self) -> bool {
        matches!(self, Self::Created | Self::Opened)
    }

    pub fn is_edit(&self) -> bool {
        matches!(self, Self::Edited | Self::Updated)
    }
}

impl fmt::Display for IssueAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Project change found in a Redmine journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTransfer {
    pub old_project_id: i64,
    pub new_project_id: i64,
}

/// Tracker-independent view of one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalIssueEvent {
    /// Tracker that sent the webhook
    pub origin: Tracker,
    pub action: IssueAction,
    /// Issue number on GitHub, issue id on Redmine
    pub external_id: i64,
    pub title: Option<String>,
    pub body: String,
    /// Repository name on GitHub, project id on Redmine
    pub channel: Option<String>,
    /// Redmine project id
    pub project_id: Option<i64>,
    pub assignee_handle: Option<String>,
    pub author: Option<String>,
    pub status_id: Option<i64>,
    pub project_transfer: Option<ProjectTransfer>,
}

impl CanonicalIssueEvent {
    /// True when the body carries the footer the relay writes into issues
    /// it created on the origin tracker.
    pub fn is_relayed_echo(&self) -> bool {
        self.body.contains(self.origin.echo_marker())
    }

    /// Relayed issues are ignored unless the event is an edit.
    pub fn trips_loop_guard(&self) -> bool {
        self.is_relayed_echo() && !self.action.is_edit()
    }
}

/// Why a webhook produced no event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Body is not valid JSON for the tracker's webhook shape.
    Malformed(String),
    /// Payload carries no issue object.
    NoIssue,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(reason) => write!(f, "malformed payload: {reason}"),
            Self::NoIssue => f.write_str("no issue in payload"),
        }
    }
}
