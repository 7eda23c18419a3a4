//! Last-synced resourceVersion for every ProwJob this process has handled.
//!
//! Lives for the lifetime of the poller and is never persisted, so a fresh
//! process re-syncs everything once. Entries are never evicted.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct VersionCache {
    versions: Mutex<HashMap<String, String>>,
}

impl VersionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `id` was already synced at exactly `version`.
    pub fn seen(&self, id: &str, version: &str) -> bool {
        self.lock().get(id).is_some_and(|last| last == version)
    }

    /// Record that `id` has been synced at `version`, replacing any older entry.
    pub fn mark_seen(&self, id: &str, version: &str) {
        self.lock().insert(id.to_string(), version.to_string());
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock cannot leave a half-written String pair,
    // so a poisoned map is still consistent.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.versions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
