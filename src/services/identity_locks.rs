//! Per-issue mutual exclusion for reconciliation.
//!
//! Two deliveries for the same issue would otherwise race between the link
//! lookup and the write that follows it. Reconciliation holds the lock for
//! `(tracker, external id)` from lookup to the last link mutation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::models::Tracker;

type LockKey = (Tracker, i64);

/// Keyed async mutexes, one per issue identity currently in use.
#[derive(Debug, Default)]
pub struct IdentityLocks {
    locks: Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>,
}

impl IdentityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to one issue identity.
    pub async fn acquire(&self, tracker: Tracker, external_id: i64) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
            // Entries referenced only by the map have no holder and no waiter.
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            locks
                .entry((tracker, external_id))
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of identities with a live lock entry.
    pub fn len(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
