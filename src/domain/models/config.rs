use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for the relay
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Webhook server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// GitHub API configuration
    #[serde(default)]
    pub github: GithubConfig,

    /// Redmine API configuration
    #[serde(default)]
    pub redmine: RedmineConfig,

    /// Static identity mappings
    #[serde(default)]
    pub mappings: MappingConfig,
}

/// Webhook server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ServerConfig {
    /// Host to bind to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    4567
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseConfig {
    /// `SQLite` database URL
    #[serde(default = "default_database_url")]
    pub url: String,

    /// Maximum number of database connections in pool
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_database_url() -> String {
    "sqlite:data/issue_sync.db".to_string()
}

const fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
            max_connections: default_max_connections(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Stdout format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for JSON log files (stdout only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    /// Also log to stdout when a log directory is set
    #[serde(default = "default_true")]
    pub enable_stdout: bool,

    /// Log file rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Json
}

const fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            enable_stdout: true,
            rotation: RotationPolicy::default(),
        }
    }
}

/// GitHub API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct GithubConfig {
    /// REST API base URL
    #[serde(default = "default_github_api_url")]
    pub api_url: String,

    /// Web base URL used in issue links written to Redmine
    #[serde(default = "default_github_web_url")]
    pub web_url: String,

    /// Repository owner (user or organization)
    #[serde(default)]
    pub owner: String,

    /// Repository used when no mapping applies
    #[serde(default = "default_github_repo")]
    pub default_repo: String,

    /// Personal access token (can also be set via `GITHUB_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_github_api_url() -> String {
    "https://api.github.com".to_string()
}

fn default_github_web_url() -> String {
    "https://github.com".to_string()
}

fn default_github_repo() -> String {
    "livelaps-sites".to_string()
}

fn default_user_agent() -> String {
    "Redmine-GitHub-Sync".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

impl Default for GithubConfig {
    fn default() -> Self {
        Self {
            api_url: default_github_api_url(),
            web_url: default_github_web_url(),
            owner: String::new(),
            default_repo: default_github_repo(),
            api_key: String::new(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Redmine API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RedmineConfig {
    /// REST API base URL (can also be set via `REDMINE_URL`)
    #[serde(default)]
    pub url: String,

    /// Base URL used in issue links written to GitHub; falls back to `url`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,

    /// API key (can also be set via `REDMINE_API_KEY`)
    #[serde(default)]
    pub api_key: String,

    /// Project used when a repository has no mapping
    #[serde(default = "default_project_id")]
    pub default_project_id: i64,

    /// Tracker id for created issues ("Defect")
    #[serde(default = "default_one")]
    pub tracker_id: i64,

    /// Status id for created issues ("New")
    #[serde(default = "default_one")]
    pub status_id: i64,

    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_project_id() -> i64 {
    57
}

const fn default_one() -> i64 {
    1
}

impl RedmineConfig {
    pub fn public_base_url(&self) -> &str {
        self.public_url.as_deref().unwrap_or(&self.url)
    }
}

impl Default for RedmineConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            public_url: None,
            api_key: String::new(),
            default_project_id: default_project_id(),
            tracker_id: default_one(),
            status_id: default_one(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Identity mapping tables between the two trackers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MappingConfig {
    /// GitHub repository name to Redmine project id
    #[serde(default = "default_repo_projects")]
    pub repo_projects: BTreeMap<String, i64>,

    /// Redmine login to GitHub login
    #[serde(default = "default_users")]
    pub users: BTreeMap<String, String>,

    /// GitHub assignee for issues created from unmapped Redmine users
    #[serde(default = "default_assignee", skip_serializing_if = "Option::is_none")]
    pub default_assignee: Option<String>,
}

fn default_repo_projects() -> BTreeMap<String, i64> {
    [
        ("livelaps-sites", 57),
        ("livelaps-webapp", 62),
        ("livelaps-app", 56),
        ("livelaps-api", 60),
        ("livelaps-cms", 59),
        ("livelaps-ui", 61),
    ]
    .into_iter()
    .map(|(repo, project)| (repo.to_string(), project))
    .collect()
}

fn default_users() -> BTreeMap<String, String> {
    [
        ("pmercier", "merc74"),
        ("ndelorme", "NDelo007"),
        ("rmercier", "RaphMerc007"),
        ("andrewd", "andduq"),
    ]
    .into_iter()
    .map(|(redmine, github)| (redmine.to_string(), github.to_string()))
    .collect()
}

#[allow(clippy::unnecessary_wraps)]
fn default_assignee() -> Option<String> {
    Some("merc74".to_string())
}

impl Default for MappingConfig {
    fn default() -> Self {
        Self {
            repo_projects: default_repo_projects(),
            users: default_users(),
            default_assignee: default_assignee(),
        }
    }
}
