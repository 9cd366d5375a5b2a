//! Static identity mappings between GitHub and Redmine.

use std::collections::BTreeMap;

/// Bidirectional map between GitHub repository names and Redmine project ids.
#[derive(Debug, Clone, Default)]
pub struct ChannelMap {
    repo_to_project: BTreeMap<String, i64>,
    project_to_repo: BTreeMap<i64, String>,
}

impl ChannelMap {
    pub fn new(entries: &BTreeMap<String, i64>) -> Self {
        let repo_to_project = entries.clone();
        let project_to_repo = entries
            .iter()
            .map(|(repo, project)| (*project, repo.clone()))
            .collect();
        Self {
            repo_to_project,
            project_to_repo,
        }
    }

    pub fn project_for_repo(&self, repo: &str) -> Option<i64> {
        self.repo_to_project.get(repo).copied()
    }

    pub fn repo_for_project(&self, project_id: i64) -> Option<&str> {
        self.project_to_repo.get(&project_id).map(String::as_str)
    }
}

/// Map from Redmine logins to GitHub logins.
#[derive(Debug, Clone, Default)]
pub struct UserMap {
    redmine_to_github: BTreeMap<String, String>,
}

impl UserMap {
    pub fn new(entries: &BTreeMap<String, String>) -> Self {
        Self {
            redmine_to_github: entries.clone(),
        }
    }

    pub fn github_login(&self, redmine_login: &str) -> Option<&str> {
        self.redmine_to_github.get(redmine_login).map(String::as_str)
    }
}
