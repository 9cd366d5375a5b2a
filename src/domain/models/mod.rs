pub mod config;
pub mod event;
pub mod link;
pub mod mapping;

pub use config::{
    Config, DatabaseConfig, GithubConfig, LogFormat, LoggingConfig, MappingConfig, RedmineConfig,
    RotationPolicy, ServerConfig,
};
pub use event::{
    CanonicalIssueEvent, IssueAction, ProjectTransfer, SkipReason, Tracker, SYNCED_FROM_GITHUB,
    SYNCED_FROM_REDMINE,
};
pub use link::{IssueLink, LinkUpdate, NewLink};
pub use mapping::{ChannelMap, UserMap};
