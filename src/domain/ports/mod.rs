//! Port trait definitions (Hexagonal Architecture)
//!
//! This module defines async trait interfaces that infrastructure adapters must implement:
//! - LinkRepository: persistence of GitHub/Redmine issue links
//! - GithubApi: outbound GitHub issue operations
//! - RedmineApi: outbound Redmine issue operations

pub mod link_repository;
pub mod trackers;

pub use link_repository::LinkRepository;
pub use trackers::{
    GithubApi, GithubIssueUpdate, NewGithubIssue, NewRedmineIssue, RedmineApi,
    RedmineIssueUpdate, TokenScopes,
};
