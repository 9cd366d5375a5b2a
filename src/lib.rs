//! Issue Relay - GitHub/Redmine issue synchronization
//!
//! A webhook relay that keeps issues linked between a GitHub organization and
//! a Redmine instance. Each tracker posts issue webhooks; the relay creates
//! the counterpart issue on the other side, forwards edits, follows Redmine
//! project moves with GitHub repository transfers, and records every pairing
//! in a SQLite link table.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): Models, errors and port traits
//! - **Service Layer** (`services`): Normalization, reconciliation and outbound sync
//! - **Adapters** (`adapters`): SQLite link store and the axum webhook server
//! - **Infrastructure Layer** (`infrastructure`): Configuration, logging and tracker clients
//! - **CLI Layer** (`cli`): Command-line interface

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{CanonicalIssueEvent, Config, IssueAction, IssueLink, Tracker};
pub use domain::ports::{GithubApi, LinkRepository, RedmineApi};
pub use domain::{DomainError, DomainResult, TrackerError};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{Outcome, Reconciler, SyncAdapters, SyncSettings};
