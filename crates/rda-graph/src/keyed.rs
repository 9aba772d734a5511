//! Per-key mutex registry.
//!
//! Read-modify-write sequences over a logical key (a single object id, or a
//! normalized pair of ids) must not interleave, but unrelated keys must not
//! contend. [`KeyedLocks`] is an arena of async mutexes indexed by key:
//! acquiring a key's lock creates it on demand, and entries nobody holds are
//! garbage-collected on later acquisitions.

use std::collections::HashMap;
use std::sync::{Arc, Mutex as StdMutex};

use rda_types::BusinessObjectId;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Arena of per-key async mutexes.
#[derive(Default)]
pub struct KeyedLocks {
    inner: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Lock key for an operation scoped to a single object id.
    pub fn id_key(id: &BusinessObjectId) -> String {
        id.as_str().to_string()
    }

    /// Lock key for an operation scoped to a pair of ids. Normalized so the
    /// pair maps to the same key regardless of argument order.
    pub fn pair_key(a: &BusinessObjectId, b: &BusinessObjectId) -> String {
        if a.as_str() <= b.as_str() {
            format!("{a}\u{1f}{b}")
        } else {
            format!("{b}\u{1f}{a}")
        }
    }

    /// Acquire the mutex for `key`, creating it if absent.
    ///
    /// The returned guard owns the lock; dropping it releases the key.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            // Drop entries no caller holds or waits on: guards and waiting
            // acquirers each hold a clone of the Arc, so a count of 1 means
            // only the map still references the lock.
            map.retain(|_, v| Arc::strong_count(v) > 1);
            map.entry(key.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        lock.lock_owned().await
    }

    /// Number of keys currently registered.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Returns `true` if no keys are registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
