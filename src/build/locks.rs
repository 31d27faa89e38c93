//! Per-fingerprint build serialization
//!
//! Concurrent submissions of the same inputs queue behind one another
//! instead of racing on the same directory. Different fingerprints never
//! contend. Entries are dropped once no build holds them.

use crate::cache::Fingerprint;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, Weak};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Guard held for the duration of one build
pub type BuildGuard = OwnedMutexGuard<()>;

/// Table of in-flight build locks keyed by fingerprint
#[derive(Debug, Default)]
pub struct BuildLocks {
    inner: Mutex<HashMap<Fingerprint, Weak<AsyncMutex<()>>>>,
}

impl BuildLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `fingerprint`
    pub async fn acquire(&self, fingerprint: &Fingerprint) -> BuildGuard {
        let lock = {
            let mut table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            table.retain(|_, entry| entry.strong_count() > 0);

            match table.get(fingerprint).and_then(Weak::upgrade) {
                Some(lock) => lock,
                None => {
                    let lock = Arc::new(AsyncMutex::new(()));
                    table.insert(fingerprint.clone(), Arc::downgrade(&lock));
                    lock
                }
            }
        };

        lock.lock_owned().await
    }

    /// Number of fingerprints with a live lock
    pub fn active(&self) -> usize {
        let table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        table.values().filter(|entry| entry.strong_count() > 0).count()
    }
}
