//! Domain layer for the issue relay
//!
//! This module contains the link and event models, the static identity
//! mappings, and the port traits the services depend on.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{DomainError, DomainResult, TrackerError};
