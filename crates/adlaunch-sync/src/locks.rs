//! # Entity Locks
//!
//! In-process advisory locks that allow at most one attempt per entity.
//!
//! ```text
//!   try_acquire(Campaign, "cmp-1") ──► Some(guard)   attempt runs
//!   try_acquire(Campaign, "cmp-1") ──► None          SyncInProgress
//!   drop(guard)                    ──► entry removed
//! ```
//!
//! Acquisition never waits. The lock table only lives as long as the engine,
//! so a `pending` row seen while no guard is held was left by an attempt
//! that did not finish.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use adlaunch_core::EntityKind;

type LockKey = (EntityKind, String);

/// Table of entities with an attempt in flight.
#[derive(Debug, Clone, Default)]
pub struct EntityLocks {
    held: Arc<Mutex<HashSet<LockKey>>>,
}

impl EntityLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the entity, or returns `None` if an attempt already holds it.
    pub fn try_acquire(&self, kind: EntityKind, id: &str) -> Option<EntityGuard> {
        let key = (kind, id.to_string());
        if !self.table().insert(key.clone()) {
            return None;
        }
        Some(EntityGuard {
            held: Arc::clone(&self.held),
            key,
        })
    }

    /// Whether an attempt currently holds the entity.
    pub fn is_held(&self, kind: EntityKind, id: &str) -> bool {
        self.table().contains(&(kind, id.to_string()))
    }

    fn table(&self) -> MutexGuard<'_, HashSet<LockKey>> {
        // the set stays valid even if a holder panicked
        self.held.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Releases its entity when dropped.
#[derive(Debug)]
pub struct EntityGuard {
    held: Arc<Mutex<HashSet<LockKey>>>,
    key: LockKey,
}

impl Drop for EntityGuard {
    fn drop(&mut self) {
        let mut table = self
            .held
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        table.remove(&self.key);
    }
}
