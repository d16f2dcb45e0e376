use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, de::IgnoredAny, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::Resource;
use crate::store::{KeyValueStore, MemoryStore};

/// Entries younger than this are served without a network call.
pub const DEFAULT_FRESHNESS_MINUTES: i64 = 5;

/// Storage key for one list snapshot: entity namespace plus search filter.
///
/// Filters are compared exactly; `"john"` and `"John"` are different entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    namespace: String,
    filter: String,
}

impl CacheKey {
    pub fn new(namespace: impl Into<String>, filter: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            filter: filter.into(),
        }
    }

    pub fn for_resource<R: Resource>(filter: &str) -> Self {
        Self::new(R::NAMESPACE, filter)
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    /// The filter as an API `search` parameter; empty means unfiltered.
    pub fn search(&self) -> Option<String> {
        if self.filter.is_empty() {
            None
        } else {
            Some(self.filter.clone())
        }
    }

    pub fn storage_key(&self) -> String {
        if self.filter.is_empty() {
            self.namespace.clone()
        } else {
            format!("{}?search={}", self.namespace, self.filter)
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub key: String,
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(key: &CacheKey, data: T) -> Self {
        Self {
            key: key.storage_key(),
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age(&self) -> Duration {
        Utc::now() - self.cached_at
    }

    pub fn age_minutes(&self) -> i64 {
        self.age().num_minutes()
    }

    pub fn age_display(&self) -> String {
        age_display(self.cached_at)
    }

    /// True while the entry is younger than `threshold`.
    pub fn is_fresh(&self, threshold: Duration) -> bool {
        self.age() < threshold
    }
}

pub(crate) fn age_display(cached_at: DateTime<Utc>) -> String {
    let minutes = (Utc::now() - cached_at).num_minutes();
    if minutes < 1 {
        // Also covers clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Age of one stored entry, for `cache ages`.
#[derive(Debug, Clone)]
pub struct CacheAge {
    pub key: String,
    pub cached_at: DateTime<Utc>,
    pub display: String,
}

/// Read/write layer between list views and the key-value store.
/// Clone is cheap; clones share the store.
#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn KeyValueStore>,
}

impl CacheManager {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Look up the entry for `key`.
    ///
    /// Never fails: an unreadable slot, corrupt JSON, a payload of the wrong
    /// shape or an entry recorded under a different key all read as absent.
    pub fn read<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<CachedData<T>> {
        let storage_key = key.storage_key();
        let raw = match self.store.get(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                debug!(cache = %storage_key, error = %e, "Failed to read cache slot");
                return None;
            }
        };

        match serde_json::from_str::<CachedData<T>>(&raw) {
            Ok(entry) if entry.key == storage_key => Some(entry),
            Ok(entry) => {
                debug!(cache = %storage_key, found = %entry.key, "Cache slot holds another key");
                None
            }
            Err(e) => {
                debug!(cache = %storage_key, error = %e, "Malformed cache entry, treating as miss");
                None
            }
        }
    }

    /// Overwrite the entry for `key` with `data`, stamped now.
    pub fn write<T: Serialize>(&self, key: &CacheKey, data: &T) -> Result<DateTime<Utc>> {
        let entry = CachedData::new(key, data);
        self.write_entry(&entry)?;
        Ok(entry.cached_at)
    }

    /// Store a fully formed entry, keeping its timestamp.
    pub fn write_entry<T: Serialize>(&self, entry: &CachedData<T>) -> Result<()> {
        let contents = serde_json::to_string(entry)
            .with_context(|| format!("Failed to serialize cache entry: {}", entry.key))?;
        self.store.set(&entry.key, &contents)
    }

    pub fn delete(&self, key: &CacheKey) -> Result<()> {
        self.store.delete(&key.storage_key())
    }

    /// Drop every filter cached under `namespace`, e.g. after a mutation.
    /// Returns how many entries were removed.
    pub fn invalidate(&self, namespace: &str) -> Result<usize> {
        let prefix = format!("{}?", namespace);
        let mut removed = 0;
        for key in self.store.keys()? {
            if key == namespace || key.starts_with(&prefix) {
                self.store.delete(&key)?;
                removed += 1;
            }
        }
        debug!(namespace = namespace, removed = removed, "Invalidated cached lists");
        Ok(removed)
    }

    /// Drop every entry. Returns how many were removed.
    pub fn clear(&self) -> Result<usize> {
        let keys = self.store.keys()?;
        for key in &keys {
            if let Err(e) = self.store.delete(key) {
                warn!(cache = %key, error = %e, "Failed to delete cache entry");
            }
        }
        Ok(keys.len())
    }

    /// Ages of all readable entries, newest first.
    pub fn ages(&self) -> Vec<CacheAge> {
        #[derive(Deserialize)]
        struct Header {
            key: String,
            cached_at: DateTime<Utc>,
            #[allow(dead_code)]
            data: IgnoredAny,
        }

        let keys = match self.store.keys() {
            Ok(keys) => keys,
            Err(e) => {
                debug!(error = %e, "Failed to list cache entries");
                return Vec::new();
            }
        };

        let mut ages: Vec<CacheAge> = keys
            .iter()
            .filter_map(|key| self.store.get(key).ok().flatten())
            .filter_map(|raw| serde_json::from_str::<Header>(&raw).ok())
            .map(|h| CacheAge {
                display: age_display(h.cached_at),
                key: h.key,
                cached_at: h.cached_at,
            })
            .collect();
        ages.sort_by(|a, b| b.cached_at.cmp(&a.cached_at));
        ages
    }
}

// ============================================================================
// Tests
// ============================================================================
