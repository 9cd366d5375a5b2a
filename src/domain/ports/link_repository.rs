//! Link repository port.

use async_trait::async_trait;

use crate::domain::errors::DomainResult;
use crate::domain::models::{IssueLink, LinkUpdate, NewLink};

/// Repository interface for issue link persistence.
///
/// Implementations enforce two uniqueness rules: `(github_id, github_repo)`
/// when both are set, and `redmine_id` when set. Violations are reported as
/// [`DomainError::DuplicateLink`](crate::domain::errors::DomainError::DuplicateLink).
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Find the link for a GitHub issue in a repository.
    async fn find_by_github(&self, github_id: i64, repo: &str) -> DomainResult<Option<IssueLink>>;

    /// Find the link for a Redmine issue.
    async fn find_by_redmine(&self, redmine_id: i64) -> DomainResult<Option<IssueLink>>;

    /// Get a link by row id.
    async fn get(&self, id: i64) -> DomainResult<Option<IssueLink>>;

    /// Store a new link.
    async fn create(&self, link: NewLink) -> DomainResult<IssueLink>;

    /// Apply a partial update and return the stored link.
    async fn update(&self, id: i64, update: LinkUpdate) -> DomainResult<IssueLink>;

    /// Bump `updated_at` only.
    async fn touch(&self, id: i64) -> DomainResult<IssueLink>;

    /// Most recently updated links first.
    async fn list(&self, limit: u32) -> DomainResult<Vec<IssueLink>>;
}
