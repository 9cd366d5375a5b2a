//! Relay services: webhook normalization, reconciliation and outbound sync.

pub mod identity_locks;
pub mod normalizer;
pub mod outbound;
pub mod reconciler;

#[cfg(test)]
pub(crate) mod test_support;

pub use identity_locks::IdentityLocks;
pub use normalizer::{EventNormalizer, GithubNormalizer, RedmineNormalizer};
pub use outbound::{Operation, SyncAdapters, SyncResult, SyncSettings};
pub use reconciler::{Outcome, Reconciler, SyncReport};
