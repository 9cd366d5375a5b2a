//! SQLite implementation of the LinkRepository.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::SqlitePool;

use super::parse_datetime;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{IssueLink, LinkUpdate, NewLink};
use crate::domain::ports::LinkRepository;

pub struct SqliteLinkRepository {
    pool: SqlitePool,
}

impl SqliteLinkRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    async fn find_by_github(&self, github_id: i64, repo: &str) -> DomainResult<Option<IssueLink>> {
        let row: Option<LinkRow> = sqlx::query_as(
            "SELECT * FROM issue_links WHERE github_id = ? AND github_repo = ?"
        )
        .bind(github_id)
        .bind(repo)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn find_by_redmine(&self, redmine_id: i64) -> DomainResult<Option<IssueLink>> {
        let row: Option<LinkRow> = sqlx::query_as(
            "SELECT * FROM issue_links WHERE redmine_id = ?"
        )
        .bind(redmine_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn get(&self, id: i64) -> DomainResult<Option<IssueLink>> {
        let row: Option<LinkRow> = sqlx::query_as("SELECT * FROM issue_links WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(&self, link: NewLink) -> DomainResult<IssueLink> {
        let now = Utc::now().to_rfc3339();
        let row: LinkRow = sqlx::query_as(
            r#"INSERT INTO issue_links (github_id, redmine_id, github_repo, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               RETURNING *"#
        )
        .bind(link.github_id)
        .bind(link.redmine_id)
        .bind(&link.github_repo)
        .bind(&now)
        .bind(&now)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update(&self, id: i64, update: LinkUpdate) -> DomainResult<IssueLink> {
        let row: Option<LinkRow> = sqlx::query_as(
            r#"UPDATE issue_links
               SET github_id = COALESCE(?, github_id),
                   redmine_id = COALESCE(?, redmine_id),
                   github_repo = COALESCE(?, github_repo),
                   updated_at = ?
               WHERE id = ?
               RETURNING *"#
        )
        .bind(update.github_id)
        .bind(update.redmine_id)
        .bind(&update.github_repo)
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DomainError::LinkNotFound(id))?.try_into()
    }

    async fn touch(&self, id: i64) -> DomainResult<IssueLink> {
        let row: Option<LinkRow> = sqlx::query_as(
            "UPDATE issue_links SET updated_at = ? WHERE id = ? RETURNING *"
        )
        .bind(Utc::now().to_rfc3339())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(DomainError::LinkNotFound(id))?.try_into()
    }

    async fn list(&self, limit: u32) -> DomainResult<Vec<IssueLink>> {
        let rows: Vec<LinkRow> = sqlx::query_as(
            "SELECT * FROM issue_links ORDER BY updated_at DESC, id DESC LIMIT ?"
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    github_id: Option<i64>,
    redmine_id: Option<i64>,
    github_repo: Option<String>,
    created_at: String,
    updated_at: String,
}

impl TryFrom<LinkRow> for IssueLink {
    type Error = DomainError;

    fn try_from(row: LinkRow) -> Result<Self, Self::Error> {
        Ok(IssueLink {
            id: row.id,
            github_id: row.github_id,
            redmine_id: row.redmine_id,
            github_repo: row.github_repo,
            created_at: parse_datetime(&row.created_at)?,
            updated_at: parse_datetime(&row.updated_at)?,
        })
    }
}
