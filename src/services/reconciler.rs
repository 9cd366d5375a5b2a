//! Relay reconciliation.
//!
//! Decides, for one canonical event, whether it creates a linked
//! counterpart, updates one, transfers one, or is ignored.
//!
//! | origin  | link state              | action   | effect                                  |
//! |---------|-------------------------|----------|-----------------------------------------|
//! | any     | body carries echo marker| non-edit | ignored (loop guard)                    |
//! | GitHub  | none                    | creation | new link, create on Redmine             |
//! | GitHub  | no Redmine id           | creation | create on Redmine                       |
//! | GitHub  | Redmine id              | edit     | update on Redmine                       |
//! | Redmine | none                    | creation | new link, create on GitHub              |
//! | Redmine | no GitHub id            | creation | create on GitHub                        |
//! | Redmine | GitHub id               | edit     | transfer (if project moved), update     |
//! | any     | anything else           |          | ignored                                 |

use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use super::identity_locks::IdentityLocks;
use super::outbound::{Operation, SyncAdapters, SyncResult};
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{CanonicalIssueEvent, IssueLink, NewLink, Tracker};

/// One adapter invocation made while handling an event.
#[derive(Debug)]
pub struct SyncReport {
    pub operation: Operation,
    pub result: SyncResult,
}

/// What handling an event amounted to.
#[derive(Debug)]
pub enum Outcome {
    /// The event describes an issue the relay itself created on the origin.
    LoopGuarded,
    /// No rule applies to this action and link state.
    Ignored,
    /// A link write hit a uniqueness constraint; the event was dropped.
    DuplicateLink,
    /// One or more adapters ran, in order.
    Relayed(Vec<SyncReport>),
}

impl Outcome {
    pub fn operations(&self) -> Vec<Operation> {
        match self {
            Self::Relayed(reports) => reports.iter().map(|r| r.operation).collect(),
            _ => Vec::new(),
        }
    }
}

pub struct Reconciler {
    adapters: SyncAdapters,
    locks: Arc<IdentityLocks>,
}

impl Reconciler {
    pub fn new(adapters: SyncAdapters) -> Self {
        Self {
            adapters,
            locks: Arc::new(IdentityLocks::new()),
        }
    }

    /// Reconcile one event.
    ///
    /// Errors are link store failures that happened before any adapter
    /// ran. Adapter failures are reported inside [`Outcome::Relayed`].
    #[instrument(
        skip(self, event),
        fields(origin = %event.origin, external_id = event.external_id, action = %event.action)
    )]
    pub async fn handle(&self, event: &CanonicalIssueEvent) -> DomainResult<Outcome> {
        if event.trips_loop_guard() {
            debug!("event carries the relay footer, skipping");
            return Ok(Outcome::LoopGuarded);
        }

        let _guard = self.locks.acquire(event.origin, event.external_id).await;

        let result = match event.origin {
            Tracker::Github => self.reconcile_github(event).await,
            Tracker::Redmine => self.reconcile_redmine(event).await,
        };

        match result {
            Err(DomainError::DuplicateLink(reason)) => {
                warn!(%reason, "link already exists, dropping event");
                Ok(Outcome::DuplicateLink)
            }
            Ok(Outcome::Ignored) => {
                debug!("no rule applies to event");
                Ok(Outcome::Ignored)
            }
            other => other,
        }
    }

    async fn reconcile_github(&self, event: &CanonicalIssueEvent) -> DomainResult<Outcome> {
        let links = self.adapters.links();
        let repo = event
            .channel
            .as_deref()
            .unwrap_or(&self.adapters.settings().default_repo);
        let existing = links.find_by_github(event.external_id, repo).await?;

        let outcome = match existing {
            None if event.action.is_creation() => {
                let link = links
                    .create(NewLink::from_github(event.external_id, repo))
                    .await?;
                info!(link_id = link.id, %repo, "linked new GitHub issue");
                let result = self.adapters.create_on_redmine(&link, event).await;
                relayed(Operation::CreateOnRedmine, result)
            }
            Some(link) if event.action.is_creation() && link.redmine_id.is_none() => {
                let result = self.adapters.create_on_redmine(&link, event).await;
                relayed(Operation::CreateOnRedmine, result)
            }
            Some(link) if event.action.is_edit() && link.redmine_id.is_some() => {
                let result = self.adapters.update_on_redmine(&link, event).await;
                relayed(Operation::UpdateOnRedmine, result)
            }
            _ => Outcome::Ignored,
        };
        Ok(outcome)
    }

    async fn reconcile_redmine(&self, event: &CanonicalIssueEvent) -> DomainResult<Outcome> {
        let links = self.adapters.links();
        let existing = links.find_by_redmine(event.external_id).await?;

        let outcome = match existing {
            None if event.action.is_creation() => {
                let link = links.create(NewLink::from_redmine(event.external_id)).await?;
                info!(link_id = link.id, "linked new Redmine issue");
                let result = self.adapters.create_on_github(&link, event).await;
                relayed(Operation::CreateOnGithub, result)
            }
            Some(link) if event.action.is_creation() && link.github_id.is_none() => {
                let result = self.adapters.create_on_github(&link, event).await;
                relayed(Operation::CreateOnGithub, result)
            }
            Some(link) if event.action.is_edit() && link.github_id.is_some() => {
                self.update_github_side(link, event).await
            }
            _ => Outcome::Ignored,
        };
        Ok(outcome)
    }

    /// Transfer first when the journal moved the issue to another project,
    /// then update against the link as the transfer left it.
    async fn update_github_side(&self, link: IssueLink, event: &CanonicalIssueEvent) -> Outcome {
        let mut reports = Vec::with_capacity(2);
        let mut link = link;

        if let Some(transfer) = event.project_transfer {
            debug!(
                old_project_id = transfer.old_project_id,
                new_project_id = transfer.new_project_id,
                "project change detected"
            );
            let result = self
                .adapters
                .transfer_on_github(&link, transfer.new_project_id)
                .await;
            if let Some(moved) = result.link() {
                link = moved.clone();
            }
            if !matches!(result, SyncResult::NotNeeded) {
                reports.push(SyncReport {
                    operation: Operation::TransferOnGithub,
                    result,
                });
            }
        }

        let result = self.adapters.update_on_github(&link, event).await;
        reports.push(SyncReport {
            operation: Operation::UpdateOnGithub,
            result,
        });
        Outcome::Relayed(reports)
    }
}

fn relayed(operation: Operation, result: SyncResult) -> Outcome {
    Outcome::Relayed(vec![SyncReport { operation, result }])
}
