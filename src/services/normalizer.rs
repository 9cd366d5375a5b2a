//! Webhook payload normalization.
//!
//! Each tracker posts its own JSON shape. The normalizers deserialize it
//! into typed payload structs and reduce it to a [`CanonicalIssueEvent`].
//! A payload without an issue, or one that does not parse, yields a
//! [`SkipReason`] rather than an error: the webhook is acknowledged and
//! nothing else happens.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::models::{CanonicalIssueEvent, IssueAction, ProjectTransfer, SkipReason, Tracker};

/// Journal property key Redmine uses for a project move.
const PROJECT_PROP_KEY: &str = "project_id";

/// Converts one tracker's raw webhook body into a canonical event.
pub trait EventNormalizer: Send + Sync {
    fn tracker(&self) -> Tracker;

    fn normalize(&self, raw: &[u8]) -> Result<CanonicalIssueEvent, SkipReason>;
}

// ---------------------------------------------------------------------------
// GitHub
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GithubWebhook {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub issue: Option<GithubIssuePayload>,
    #[serde(default)]
    pub repository: Option<GithubRepository>,
}

#[derive(Debug, Deserialize)]
pub struct GithubIssuePayload {
    /// Per-repository issue number, not the global issue id
    pub number: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub assignee: Option<LoginRef>,
}

#[derive(Debug, Deserialize)]
pub struct GithubRepository {
    pub full_name: String,
}

impl GithubRepository {
    /// Repository name without the owner: `org/livelaps-api` → `livelaps-api`.
    pub fn name(&self) -> &str {
        self.full_name.rsplit('/').next().unwrap_or(&self.full_name)
    }
}

/// Normalizer for `POST /github_hook`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GithubNormalizer;

impl EventNormalizer for GithubNormalizer {
    fn tracker(&self) -> Tracker {
        Tracker::Github
    }

    fn normalize(&self, raw: &[u8]) -> Result<CanonicalIssueEvent, SkipReason> {
        let webhook: GithubWebhook =
            serde_json::from_slice(raw).map_err(|e| SkipReason::Malformed(e.to_string()))?;

        let issue = webhook.issue.ok_or(SkipReason::NoIssue)?;
        let repository = webhook
            .repository
            .ok_or_else(|| SkipReason::Malformed("issue without repository".to_string()))?;

        Ok(CanonicalIssueEvent {
            origin: Tracker::Github,
            action: IssueAction::parse(webhook.action.as_deref().unwrap_or_default()),
            external_id: issue.number,
            title: issue.title,
            body: issue.body.unwrap_or_default(),
            channel: Some(repository.name().to_string()),
            project_id: None,
            assignee_handle: issue.assignee.and_then(|a| a.login),
            author: None,
            status_id: None,
            project_transfer: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Redmine
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct RedmineWebhook {
    #[serde(default)]
    pub payload: Option<RedminePayload>,
}

#[derive(Debug, Deserialize)]
pub struct RedminePayload {
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub issue: Option<RedmineIssuePayload>,
    #[serde(default)]
    pub journal: Option<OneOrMany<RedmineJournal>>,
}

#[derive(Debug, Deserialize)]
pub struct RedmineIssuePayload {
    pub id: i64,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<IdRef>,
    #[serde(default)]
    pub author: Option<NameRef>,
    #[serde(default)]
    pub assignee: Option<LoginRef>,
    #[serde(default)]
    pub project: Option<IdRef>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RedmineJournal {
    /// Redmine sends `null` for journals without attribute changes.
    #[serde(default)]
    pub details: Option<Vec<JournalDetail>>,
}

#[derive(Debug, Deserialize)]
pub struct JournalDetail {
    #[serde(default)]
    pub prop_key: Option<String>,
    #[serde(default)]
    pub old_value: Option<Value>,
    #[serde(default)]
    pub value: Option<Value>,
}

/// Redmine sends `journal` either as one object or as a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        match self {
            Self::Many(items) => items.iter(),
            Self::One(item) => std::slice::from_ref(item).iter(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdRef {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct NameRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRef {
    #[serde(default)]
    pub login: Option<String>,
}

/// Normalizer for `POST /redmine_hook`.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedmineNormalizer;

impl EventNormalizer for RedmineNormalizer {
    fn tracker(&self) -> Tracker {
        Tracker::Redmine
    }

    fn normalize(&self, raw: &[u8]) -> Result<CanonicalIssueEvent, SkipReason> {
        let webhook: RedmineWebhook =
            serde_json::from_slice(raw).map_err(|e| SkipReason::Malformed(e.to_string()))?;

        let payload = webhook.payload.ok_or(SkipReason::NoIssue)?;
        let project_transfer = payload.journal.as_ref().and_then(find_project_transfer);
        let issue = payload.issue.ok_or(SkipReason::NoIssue)?;
        let project_id = issue.project.map(|p| p.id);

        Ok(CanonicalIssueEvent {
            origin: Tracker::Redmine,
            action: IssueAction::parse(payload.action.as_deref().unwrap_or_default()),
            external_id: issue.id,
            title: issue.subject,
            body: issue.description.unwrap_or_default(),
            channel: project_id.map(|id| id.to_string()),
            project_id,
            assignee_handle: issue.assignee.and_then(|a| a.login),
            author: issue.author.and_then(|a| a.name),
            status_id: issue.status.map(|s| s.id),
            project_transfer,
        })
    }
}

/// First `project_id` change across the journals, in delivery order.
///
/// Scanning stops at the first match; later project changes in the same
/// delivery are ignored.
fn find_project_transfer(journals: &OneOrMany<RedmineJournal>) -> Option<ProjectTransfer> {
    journals
        .iter()
        .flat_map(|journal| journal.details.iter().flatten())
        .find(|detail| detail.prop_key.as_deref() == Some(PROJECT_PROP_KEY))
        .map(|detail| ProjectTransfer {
            old_project_id: detail.old_value.as_ref().map_or(0, lenient_int),
            new_project_id: detail.value.as_ref().map_or(0, lenient_int),
        })
}

/// Integer from a JSON number or a numeric string; anything else is 0.
///
/// Strings are read up to the first non-digit, so `"60"` and `" 60 "` give
/// 60 and `"abc"` gives 0.
fn lenient_int(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim_start();
            let (sign, digits) = match s.strip_prefix('-') {
                Some(rest) => (-1, rest),
                None => (1, s.strip_prefix('+').unwrap_or(s)),
            };
            let end = digits
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(digits.len());
            digits[..end].parse::<i64>().map_or(0, |n| sign * n)
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn bytes(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    #[test]
    fn test_github_opened_event() {
        let raw = bytes(&json!({
            "action": "opened",
            "issue": {"number": 70, "title": "Bug", "body": "desc", "assignee": {"login": "merc74"}},
            "repository": {"full_name": "org/livelaps-api"}
        }));

        let event = GithubNormalizer.normalize(&raw).unwrap();
        assert_eq!(event.origin, Tracker::Github);
        assert_eq!(event.action, IssueAction::Opened);
        assert_eq!(event.external_id, 70);
        assert_eq!(event.title.as_deref(), Some("Bug"));
        assert_eq!(event.body, "desc");
        assert_eq!(event.channel.as_deref(), Some("livelaps-api"));
        assert_eq!(event.assignee_handle.as_deref(), Some("merc74"));
    }

    #[test]
    fn test_github_without_issue_is_skipped() {
        let raw = bytes(&json!({"zen": "Keep it logically awesome.", "hook_id": 1}));
        assert_eq!(GithubNormalizer.normalize(&raw), Err(SkipReason::NoIssue));
    }

    #[test]
    fn test_github_null_body_and_unknown_action() {
        let raw = bytes(&json!({
            "action": "labeled",
            "issue": {"number": 3, "title": "t", "body": null},
            "repository": {"full_name": "livelaps-ui"}
        }));
        let event = GithubNormalizer.normalize(&raw).unwrap();
        assert_eq!(event.action, IssueAction::Unknown);
        assert_eq!(event.body, "");
        assert_eq!(event.channel.as_deref(), Some("livelaps-ui"));
    }

    #[test]
    fn test_malformed_json_is_skipped() {
        let result = GithubNormalizer.normalize(b"{not json");
        assert!(matches!(result, Err(SkipReason::Malformed(_))));
        let result = RedmineNormalizer.normalize(b"");
        assert!(matches!(result, Err(SkipReason::Malformed(_))));
    }

    #[test]
    fn test_redmine_event_fields() {
        let raw = bytes(&json!({"payload": {
            "action": "opened",
            "issue": {
                "id": 812,
                "subject": "Crash on start",
                "description": "stack trace",
                "status": {"id": 1},
                "author": {"name": "Paul Mercier"},
                "assignee": {"login": "pmercier"},
                "project": {"id": 60}
            }
        }}));

        let event = RedmineNormalizer.normalize(&raw).unwrap();
        assert_eq!(event.origin, Tracker::Redmine);
        assert_eq!(event.external_id, 812);
        assert_eq!(event.title.as_deref(), Some("Crash on start"));
        assert_eq!(event.project_id, Some(60));
        assert_eq!(event.channel.as_deref(), Some("60"));
        assert_eq!(event.assignee_handle.as_deref(), Some("pmercier"));
        assert_eq!(event.author.as_deref(), Some("Paul Mercier"));
        assert_eq!(event.status_id, Some(1));
        assert!(event.project_transfer.is_none());
    }

    #[test]
    fn test_redmine_without_payload_or_issue_is_skipped() {
        assert_eq!(RedmineNormalizer.normalize(b"{}"), Err(SkipReason::NoIssue));
        let raw = bytes(&json!({"payload": {"action": "updated"}}));
        assert_eq!(RedmineNormalizer.normalize(&raw), Err(SkipReason::NoIssue));
    }

    #[test]
    fn test_first_project_change_wins() {
        let raw = bytes(&json!({"payload": {
            "action": "updated",
            "issue": {"id": 5, "subject": "s", "description": "d"},
            "journal": [
                {"details": [{"prop_key": "status_id", "old_value": "1", "value": "2"}]},
                {"details": [
                    {"prop_key": "project_id", "old_value": "57", "value": "60"},
                    {"prop_key": "project_id", "old_value": "60", "value": "61"}
                ]},
                {"details": [{"prop_key": "project_id", "old_value": "61", "value": "59"}]}
            ]
        }}));

        let event = RedmineNormalizer.normalize(&raw).unwrap();
        assert_eq!(
            event.project_transfer,
            Some(ProjectTransfer { old_project_id: 57, new_project_id: 60 })
        );
    }

    #[test]
    fn test_single_journal_object() {
        let raw = bytes(&json!({"payload": {
            "action": "updated",
            "issue": {"id": 5, "subject": "s"},
            "journal": {"details": [{"prop_key": "project_id", "old_value": 56, "value": 62}]}
        }}));

        let event = RedmineNormalizer.normalize(&raw).unwrap();
        assert_eq!(
            event.project_transfer,
            Some(ProjectTransfer { old_project_id: 56, new_project_id: 62 })
        );
    }

    #[test]
    fn test_empty_journal_has_no_transfer() {
        let raw = bytes(&json!({"payload": {
            "action": "updated",
            "issue": {"id": 5, "subject": "s"},
            "journal": {"details": []}
        }}));
        assert!(RedmineNormalizer.normalize(&raw).unwrap().project_transfer.is_none());
    }

    #[test]
    fn test_null_journal_details_keep_the_event() {
        let raw = bytes(&json!({"payload": {
            "action": "updated",
            "issue": {"id": 5, "subject": "s"},
            "journal": [
                {"notes": "hi", "details": null},
                {"details": [{"prop_key": "project_id", "old_value": "60", "value": "59"}]}
            ]
        }}));
        let event = RedmineNormalizer.normalize(&raw).unwrap();
        assert_eq!(event.external_id, 5);
        let transfer = event.project_transfer.unwrap();
        assert_eq!(transfer.new_project_id, 59);

        let raw = bytes(&json!({"payload": {
            "action": "updated",
            "issue": {"id": 5, "subject": "s"},
            "journal": {"notes": "hi", "details": null}
        }}));
        assert!(RedmineNormalizer.normalize(&raw).unwrap().project_transfer.is_none());
    }

    #[test]
    fn test_lenient_int() {
        assert_eq!(lenient_int(&json!("60")), 60);
        assert_eq!(lenient_int(&json!(" 61abc")), 61);
        assert_eq!(lenient_int(&json!("-4")), -4);
        assert_eq!(lenient_int(&json!("abc")), 0);
        assert_eq!(lenient_int(&json!(59)), 59);
        assert_eq!(lenient_int(&json!(null)), 0);
    }
}
