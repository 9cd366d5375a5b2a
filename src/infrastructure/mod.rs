//! Infrastructure layer module
//!
//! This module contains the infrastructure adapters and external integrations:
//! - Configuration management
//! - Logging infrastructure
//! - GitHub and Redmine REST clients
//!
//! Infrastructure implementations satisfy the port traits defined in the domain layer.

pub mod config;
pub mod logging;
pub mod trackers;
