//! `link`: inspect the link table.

use anyhow::{bail, Result};
use clap::{ArgGroup, Args, Subcommand};
use serde::Serialize;

use super::open_database;
use crate::adapters::sqlite::SqliteLinkRepository;
use crate::cli::output::{list_table, output, render_list, CommandOutput};
use crate::domain::models::{Config, IssueLink};
use crate::domain::ports::LinkRepository;

#[derive(Args, Debug)]
pub struct LinkArgs {
    #[command(subcommand)]
    pub command: LinkCommands,
}

#[derive(Subcommand, Debug)]
pub enum LinkCommands {
    /// Show the link for one issue
    Show(ShowArgs),
    /// List the most recently updated links
    List {
        /// Maximum number of links to show
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("key").required(true).args(["github_id", "redmine_id"])))]
pub struct ShowArgs {
    /// GitHub issue number
    #[arg(long, requires = "repo")]
    pub github_id: Option<i64>,

    /// GitHub repository name
    #[arg(long, requires = "github_id")]
    pub repo: Option<String>,

    /// Redmine issue id
    #[arg(long, conflicts_with = "repo")]
    pub redmine_id: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct LinkOutput {
    pub id: i64,
    pub github_id: Option<i64>,
    pub github_repo: Option<String>,
    pub redmine_id: Option<i64>,
    pub synced: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&IssueLink> for LinkOutput {
    fn from(link: &IssueLink) -> Self {
        Self {
            id: link.id,
            github_id: link.github_id,
            github_repo: link.github_repo.clone(),
            redmine_id: link.redmine_id,
            synced: link.is_synced(),
            created_at: link.created_at.to_rfc3339(),
            updated_at: link.updated_at.to_rfc3339(),
        }
    }
}

fn or_dash<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

#[derive(Debug, Serialize)]
pub struct LinkDetailOutput {
    pub link: LinkOutput,
}

impl CommandOutput for LinkDetailOutput {
    fn to_human(&self) -> String {
        let link = &self.link;
        [
            format!("Link #{}", link.id),
            format!(
                "  GitHub:   {}#{}",
                or_dash(link.github_repo.as_deref()),
                or_dash(link.github_id)
            ),
            format!("  Redmine:  {}", or_dash(link.redmine_id)),
            format!("  Synced:   {}", if link.synced { "yes" } else { "pending" }),
            format!("  Created:  {}", link.created_at),
            format!("  Updated:  {}", link.updated_at),
        ]
        .join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

#[derive(Debug, Serialize)]
pub struct LinkListOutput {
    pub links: Vec<LinkOutput>,
    pub total: usize,
}

impl CommandOutput for LinkListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "github repo", "github #", "redmine #", "updated"]);
        for link in &self.links {
            table.add_row(vec![
                link.id.to_string(),
                or_dash(link.github_repo.as_deref()),
                or_dash(link.github_id),
                or_dash(link.redmine_id),
                link.updated_at.clone(),
            ]);
        }
        render_list("link", &table, self.total)
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: LinkArgs, config: &Config, json_mode: bool) -> Result<()> {
    let pool = open_database(&config.database).await?;
    let repo = SqliteLinkRepository::new(pool.clone());

    let result = run(&repo, args.command, json_mode).await;
    pool.close().await;
    result
}

async fn run(repo: &dyn LinkRepository, command: LinkCommands, json_mode: bool) -> Result<()> {
    match command {
        LinkCommands::Show(show) => {
            let link = match (show.github_id, show.repo, show.redmine_id) {
                (Some(github_id), Some(repo_name), _) => {
                    match repo.find_by_github(github_id, &repo_name).await? {
                        Some(link) => link,
                        None => bail!("No link for GitHub issue {repo_name}#{github_id}"),
                    }
                }
                (_, _, Some(redmine_id)) => match repo.find_by_redmine(redmine_id).await? {
                    Some(link) => link,
                    None => bail!("No link for Redmine issue {redmine_id}"),
                },
                _ => bail!("Pass --github-id with --repo, or --redmine-id"),
            };
            output(
                &LinkDetailOutput {
                    link: LinkOutput::from(&link),
                },
                json_mode,
            );
        }
        LinkCommands::List { limit } => {
            let links: Vec<LinkOutput> = repo
                .list(limit)
                .await?
                .iter()
                .map(LinkOutput::from)
                .collect();
            let total = links.len();
            output(&LinkListOutput { links, total }, json_mode);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::create_migrated_test_pool;
    use crate::domain::models::{LinkUpdate, NewLink};

    #[tokio::test]
    async fn test_show_finds_link_by_either_side() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteLinkRepository::new(pool);
        let link = repo.create(NewLink::from_github(70, "livelaps-api")).await.unwrap();
        repo.update(link.id, LinkUpdate::redmine_created(812, "livelaps-api"))
            .await
            .unwrap();

        let by_github = LinkCommands::Show(ShowArgs {
            github_id: Some(70),
            repo: Some("livelaps-api".to_string()),
            redmine_id: None,
        });
        assert!(run(&repo, by_github, true).await.is_ok());

        let by_redmine = LinkCommands::Show(ShowArgs {
            github_id: None,
            repo: None,
            redmine_id: Some(812),
        });
        assert!(run(&repo, by_redmine, false).await.is_ok());
    }

    #[tokio::test]
    async fn test_show_missing_link_fails() {
        let pool = create_migrated_test_pool().await.unwrap();
        let repo = SqliteLinkRepository::new(pool);

        let show = LinkCommands::Show(ShowArgs {
            github_id: None,
            repo: None,
            redmine_id: Some(5),
        });
        let err = run(&repo, show, false).await.unwrap_err();
        assert_eq!(err.to_string(), "No link for Redmine issue 5");
    }

    #[test]
    fn test_detail_output_marks_pending_links() {
        let output = LinkDetailOutput {
            link: LinkOutput {
                id: 3,
                github_id: Some(14),
                github_repo: Some("livelaps-ui".to_string()),
                redmine_id: None,
                synced: false,
                created_at: "2024-05-01T10:00:00+00:00".to_string(),
                updated_at: "2024-05-01T10:00:00+00:00".to_string(),
            },
        };
        let human = output.to_human();
        assert!(human.contains("livelaps-ui#14"));
        assert!(human.contains("Redmine:  -"));
        assert!(human.contains("pending"));
        assert_eq!(output.to_json()["link"]["synced"], false);
    }

    #[test]
    fn test_list_output_empty() {
        let output = LinkListOutput {
            links: vec![],
            total: 0,
        };
        assert_eq!(output.to_human(), "No links found.");
    }
}
