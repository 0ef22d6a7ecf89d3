use crate::error::{Result, SteerError};
use crate::paths;
use crate::store::RuleStore;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::SystemTime;

/// Process-lifetime cache of compiled rule stores, keyed by rule-file path
/// and invalidated when the file's mtime changes.
///
/// An explicit handle rather than a global: callers that want caching pass
/// one around, and tests inject a fresh cache per case.
#[derive(Default)]
pub struct StoreCache {
    entries: Mutex<HashMap<PathBuf, CacheEntry>>,
}

struct CacheEntry {
    mtime: SystemTime,
    store: Arc<RuleStore>,
}

impl StoreCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached store for `root`, reloading if the rule file
    /// changed on disk since it was cached.
    pub fn get_or_load(&self, root: &Path) -> Result<Arc<RuleStore>> {
        let path = paths::rules_path(root);
        let mtime = std::fs::metadata(&path)
            .map_err(|_| SteerError::NotInitialized)?
            .modified()?;

        let mut entries = self.lock();
        if let Some(entry) = entries.get(&path) {
            if entry.mtime == mtime {
                return Ok(Arc::clone(&entry.store));
            }
        }

        let store = Arc::new(RuleStore::load(root)?);
        entries.insert(
            path,
            CacheEntry {
                mtime,
                store: Arc::clone(&store),
            },
        );
        Ok(store)
    }

    pub fn invalidate(&self, root: &Path) {
        self.lock().remove(&paths::rules_path(root));
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<PathBuf, CacheEntry>> {
        // The cache holds no invariants that a panicked writer could break.
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
