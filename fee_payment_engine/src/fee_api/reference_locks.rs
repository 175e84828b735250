use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use log::trace;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = HashMap<String, Arc<AsyncMutex<()>>>;

/// One async lock per transaction reference, so that two fulfillments of the same reference never interleave.
///
/// Entries are dropped when the last holder or waiter releases them, so the map only ever holds references that are
/// being worked on. Clones share the same set of locks.
#[derive(Debug, Clone, Default)]
pub struct ReferenceLocks {
    locks: Arc<Mutex<LockMap>>,
}

/// Holds the lock for one reference until dropped.
#[derive(Debug)]
pub struct ReferenceGuard {
    reference: String,
    locks: Arc<Mutex<LockMap>>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl ReferenceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, reference: &str) -> ReferenceGuard {
        let entry = {
            let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            map.entry(reference.to_string()).or_default().clone()
        };
        let guard = entry.lock_owned().await;
        trace!("🔄️ Acquired lock for [{reference}]");
        ReferenceGuard { reference: reference.to_string(), locks: Arc::clone(&self.locks), guard: Some(guard) }
    }

    /// The number of references currently locked or waited on.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for ReferenceGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Only the map itself still refers to the lock, so nobody is waiting on it
        if map.get(&self.reference).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            map.remove(&self.reference);
        }
    }
}
