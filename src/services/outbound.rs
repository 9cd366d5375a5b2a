//! Outbound adapters.
//!
//! Each adapter makes one call to a tracker and, when the call succeeds,
//! one write to the link store. Failures on either step are logged and
//! reported through [`SyncResult`]; they never abort the webhook request.

use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use crate::domain::errors::{DomainError, TrackerError};
use crate::domain::models::{
    CanonicalIssueEvent, ChannelMap, Config, IssueLink, LinkUpdate, UserMap, SYNCED_FROM_GITHUB,
    SYNCED_FROM_REDMINE,
};
use crate::domain::ports::{
    GithubApi, GithubIssueUpdate, LinkRepository, NewGithubIssue, NewRedmineIssue, RedmineApi,
    RedmineIssueUpdate,
};

const UNTITLED_GITHUB_ISSUE: &str = "Untitled GitHub Issue";
const NO_DESCRIPTION: &str = "No description provided";

/// Mapping tables and fallbacks the adapters need to build requests.
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub github_owner: String,
    pub github_web_url: String,
    pub default_repo: String,
    pub redmine_public_url: String,
    pub default_project_id: i64,
    pub tracker_id: i64,
    pub status_id: i64,
    pub default_assignee: Option<String>,
    pub channels: ChannelMap,
    pub users: UserMap,
}

impl SyncSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            github_owner: config.github.owner.clone(),
            github_web_url: config.github.web_url.trim_end_matches('/').to_string(),
            default_repo: config.github.default_repo.clone(),
            redmine_public_url: config.redmine.public_base_url().trim_end_matches('/').to_string(),
            default_project_id: config.redmine.default_project_id,
            tracker_id: config.redmine.tracker_id,
            status_id: config.redmine.status_id,
            default_assignee: config.mappings.default_assignee.clone(),
            channels: ChannelMap::new(&config.mappings.repo_projects),
            users: UserMap::new(&config.mappings.users),
        }
    }

    /// Repository for a Redmine project, falling back to the default repository.
    pub fn repo_for_project(&self, project_id: Option<i64>) -> &str {
        project_id
            .and_then(|id| self.channels.repo_for_project(id))
            .unwrap_or(&self.default_repo)
    }

    fn github_issue_url(&self, repo: &str, number: i64) -> String {
        format!(
            "{}/{}/{}/issues/{}",
            self.github_web_url, self.github_owner, repo, number
        )
    }

    fn redmine_issue_url(&self, id: i64) -> String {
        format!("{}/issues/{}", self.redmine_public_url, id)
    }
}

/// The outbound operations the reconciler can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    CreateOnRedmine,
    CreateOnGithub,
    UpdateOnRedmine,
    UpdateOnGithub,
    TransferOnGithub,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::CreateOnRedmine => "create_on_redmine",
            Self::CreateOnGithub => "create_on_github",
            Self::UpdateOnRedmine => "update_on_redmine",
            Self::UpdateOnGithub => "update_on_github",
            Self::TransferOnGithub => "transfer_on_github",
        };
        f.write_str(name)
    }
}

/// Result of one adapter invocation.
#[derive(Debug)]
pub enum SyncResult {
    /// Call succeeded and the link was written.
    Applied(IssueLink),
    /// Nothing to do; no call was made.
    NotNeeded,
    /// The tracker rejected the call; the link is unchanged.
    TrackerFailed(TrackerError),
    /// The call succeeded but recording it failed.
    LinkWriteFailed(DomainError),
}

impl SyncResult {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    pub fn link(&self) -> Option<&IssueLink> {
        match self {
            Self::Applied(link) => Some(link),
            _ => None,
        }
    }
}

/// Outbound adapters over both tracker APIs and the link store.
#[derive(Clone)]
pub struct SyncAdapters {
    links: Arc<dyn LinkRepository>,
    github: Arc<dyn GithubApi>,
    redmine: Arc<dyn RedmineApi>,
    settings: Arc<SyncSettings>,
}

impl SyncAdapters {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        github: Arc<dyn GithubApi>,
        redmine: Arc<dyn RedmineApi>,
        settings: SyncSettings,
    ) -> Self {
        Self {
            links,
            github,
            redmine,
            settings: Arc::new(settings),
        }
    }

    pub fn links(&self) -> &Arc<dyn LinkRepository> {
        &self.links
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Create the Redmine counterpart of a GitHub issue.
    #[instrument(skip(self, link, event), fields(link_id = link.id, github_id = event.external_id))]
    pub async fn create_on_redmine(
        &self,
        link: &IssueLink,
        event: &CanonicalIssueEvent,
    ) -> SyncResult {
        let repo = event
            .channel
            .as_deref()
            .or(link.github_repo.as_deref())
            .unwrap_or(&self.settings.default_repo)
            .to_string();
        let project_id = self
            .settings
            .channels
            .project_for_repo(&repo)
            .unwrap_or(self.settings.default_project_id);

        let body = if event.body.is_empty() {
            NO_DESCRIPTION
        } else {
            event.body.as_str()
        };
        let issue = NewRedmineIssue {
            project_id,
            subject: event
                .title
                .clone()
                .unwrap_or_else(|| UNTITLED_GITHUB_ISSUE.to_string()),
            description: format!(
                "{body}\n\n*{SYNCED_FROM_GITHUB}*\n**Issue URL**: {}",
                self.settings.github_issue_url(&repo, event.external_id)
            ),
            tracker_id: self.settings.tracker_id,
            status_id: self.settings.status_id,
        };

        match self.redmine.create_issue(&issue).await {
            Ok(redmine_id) => {
                info!(
                    redmine_id,
                    project_id, %repo,
                    "created Redmine issue for GitHub issue"
                );
                self.record(link, LinkUpdate::redmine_created(redmine_id, repo))
                    .await
            }
            Err(err) => {
                error!(project_id, error = %err, "failed to create Redmine issue");
                SyncResult::TrackerFailed(err)
            }
        }
    }

    /// Create the GitHub counterpart of a Redmine issue.
    #[instrument(skip(self, link, event), fields(link_id = link.id, redmine_id = event.external_id))]
    pub async fn create_on_github(
        &self,
        link: &IssueLink,
        event: &CanonicalIssueEvent,
    ) -> SyncResult {
        let assignee = event
            .assignee_handle
            .as_deref()
            .and_then(|login| self.settings.users.github_login(login))
            .map(str::to_string)
            .or_else(|| self.settings.default_assignee.clone());
        debug!(
            redmine_assignee = ?event.assignee_handle,
            github_assignee = ?assignee,
            "mapped assignee"
        );

        let repo = link
            .github_repo
            .clone()
            .unwrap_or_else(|| self.settings.repo_for_project(event.project_id).to_string());

        let issue = NewGithubIssue {
            title: event.title.clone().unwrap_or_default(),
            body: format!(
                "{}\n\n*{SYNCED_FROM_REDMINE}*\n**Issue URL**: {}",
                event.body,
                self.settings.redmine_issue_url(event.external_id)
            ),
            assignees: assignee.iter().cloned().collect(),
        };

        match self.github.create_issue(&repo, &issue).await {
            Ok(number) => {
                info!(
                    github_id = number,
                    %repo,
                    assignee = assignee.as_deref().unwrap_or("none"),
                    "created GitHub issue for Redmine issue"
                );
                self.record(link, LinkUpdate::github_created(number, repo))
                    .await
            }
            Err(err) => {
                error!(%repo, error = %err, "failed to create GitHub issue");
                SyncResult::TrackerFailed(err)
            }
        }
    }

    /// Push a GitHub edit to the linked Redmine issue.
    #[instrument(skip(self, link, event), fields(link_id = link.id, redmine_id = ?link.redmine_id))]
    pub async fn update_on_redmine(
        &self,
        link: &IssueLink,
        event: &CanonicalIssueEvent,
    ) -> SyncResult {
        let Some(redmine_id) = link.redmine_id else {
            return SyncResult::NotNeeded;
        };

        let update = RedmineIssueUpdate {
            subject: event.title.clone(),
            description: if event.body.is_empty() {
                format!("*{SYNCED_FROM_GITHUB}*")
            } else {
                event.body.clone()
            },
        };

        match self.redmine.update_issue(redmine_id, &update).await {
            Ok(()) => {
                info!(title = ?update.subject, "updated Redmine issue");
                self.touch(link).await
            }
            Err(err) => {
                error!(error = %err, "failed to update Redmine issue");
                SyncResult::TrackerFailed(err)
            }
        }
    }

    /// Push a Redmine edit to the linked GitHub issue.
    #[instrument(skip(self, link, event), fields(link_id = link.id, github_id = ?link.github_id))]
    pub async fn update_on_github(
        &self,
        link: &IssueLink,
        event: &CanonicalIssueEvent,
    ) -> SyncResult {
        let Some(github_id) = link.github_id else {
            return SyncResult::NotNeeded;
        };
        let repo = link
            .github_repo
            .as_deref()
            .unwrap_or(&self.settings.default_repo);

        // Unmapped Redmine users clear the GitHub assignee.
        let assignees = event
            .assignee_handle
            .as_deref()
            .and_then(|login| self.settings.users.github_login(login))
            .map(|login| vec![login.to_string()])
            .unwrap_or_default();

        let update = GithubIssueUpdate {
            title: event.title.clone(),
            body: event.body.clone(),
            assignees,
        };

        match self.github.update_issue(repo, github_id, &update).await {
            Ok(()) => {
                info!(%repo, "updated GitHub issue");
                self.touch(link).await
            }
            Err(err) => {
                error!(%repo, error = %err, "failed to update GitHub issue");
                SyncResult::TrackerFailed(err)
            }
        }
    }

    /// Move the linked GitHub issue to the repository mapped to a Redmine project.
    #[instrument(skip(self, link), fields(link_id = link.id, github_id = ?link.github_id))]
    pub async fn transfer_on_github(&self, link: &IssueLink, new_project_id: i64) -> SyncResult {
        let (Some(github_id), Some(current_repo)) = (link.github_id, link.github_repo.as_deref())
        else {
            return SyncResult::NotNeeded;
        };

        let new_repo = self.settings.repo_for_project(Some(new_project_id));
        debug!(%current_repo, %new_repo, "mapped project to repository");
        if new_repo == current_repo {
            return SyncResult::NotNeeded;
        }

        match self
            .github
            .transfer_issue(current_repo, github_id, new_repo)
            .await
        {
            Ok(()) => {
                info!(from = %current_repo, to = %new_repo, "transferred GitHub issue");
                self.record(link, LinkUpdate::transferred(new_repo)).await
            }
            Err(err) => {
                error!(
                    from = %current_repo,
                    to = %new_repo,
                    error = %err,
                    "failed to transfer GitHub issue"
                );
                match self.github.token_scopes().await {
                    Ok(check) => debug!(
                        status = check.status,
                        scopes = check.scopes.as_deref().unwrap_or(""),
                        "token scope check"
                    ),
                    Err(check_err) => debug!(error = %check_err, "token scope check failed"),
                }
                SyncResult::TrackerFailed(err)
            }
        }
    }

    async fn record(&self, link: &IssueLink, update: LinkUpdate) -> SyncResult {
        match self.links.update(link.id, update).await {
            Ok(updated) => SyncResult::Applied(updated),
            Err(err) => {
                error!(link_id = link.id, error = %err, "failed to record sync result on link");
                SyncResult::LinkWriteFailed(err)
            }
        }
    }

    async fn touch(&self, link: &IssueLink) -> SyncResult {
        match self.links.touch(link.id).await {
            Ok(updated) => SyncResult::Applied(updated),
            Err(err) => {
                error!(link_id = link.id, error = %err, "failed to touch link");
                SyncResult::LinkWriteFailed(err)
            }
        }
    }
}
