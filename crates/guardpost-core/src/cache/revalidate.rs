//! Stale-while-revalidate over a cached entity list.
//!
//! `Revalidator::load` decides, from the entry stored under a `CacheKey`,
//! whether to serve it as-is, serve it while refreshing in the background, or
//! block on the network. Background refreshes run as tokio tasks and report
//! back through an mpsc channel as `RefreshEvent`s.
//!
//! Refreshes of the same key are not deduplicated and in-flight fetches are
//! never cancelled; whichever completes last owns the cache slot. List
//! snapshots are idempotent, so a redundant fetch costs bandwidth only.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use futures::future::BoxFuture;
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::manager::{CacheKey, CacheManager, CachedData};

/// Buffer size for background refresh results.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Where list data comes from when the cache cannot answer.
pub trait ListSource<T>: Send + Sync {
    /// Fetch the list, narrowed by `search` when present.
    fn fetch_list(&self, search: Option<String>) -> BoxFuture<'static, Result<Vec<T>>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadPlan {
    /// Nothing cached for this key: wait for the network.
    BlockingFetch,
    /// Cached and within the freshness window: no network call.
    ServeFresh,
    /// Cached but old: serve it now, refresh in the background.
    ServeStaleAndRevalidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Network,
    Cache,
    Empty,
}

/// What a load or refresh hands back to the caller right away.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub items: Vec<T>,
    pub origin: Origin,
    pub fetched_at: Option<DateTime<Utc>>,
    /// A background refresh was started for this key.
    pub revalidating: bool,
    /// The network fetch failed; `items` is the last known data.
    pub error: Option<String>,
}

impl<T> Snapshot<T> {
    fn from_entry(entry: CachedData<Vec<T>>, revalidating: bool) -> Self {
        Self {
            items: entry.data,
            origin: Origin::Cache,
            fetched_at: Some(entry.cached_at),
            revalidating,
            error: None,
        }
    }

    fn empty() -> Self {
        Self {
            items: Vec::new(),
            origin: Origin::Empty,
            fetched_at: None,
            revalidating: false,
            error: None,
        }
    }
}

/// Completion of a background refresh.
#[derive(Debug)]
pub enum RefreshEvent<T> {
    Updated {
        key: CacheKey,
        items: Vec<T>,
        fetched_at: DateTime<Utc>,
    },
    Failed {
        key: CacheKey,
        error: String,
    },
}

impl<T> RefreshEvent<T> {
    pub fn key(&self) -> &CacheKey {
        match self {
            RefreshEvent::Updated { key, .. } | RefreshEvent::Failed { key, .. } => key,
        }
    }
}

pub struct Revalidator<T> {
    cache: CacheManager,
    source: Arc<dyn ListSource<T>>,
    freshness: Duration,
    events: mpsc::Sender<RefreshEvent<T>>,
}

impl<T> Revalidator<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    /// Build a revalidator and the receiver its background refreshes report to.
    pub fn new(
        cache: CacheManager,
        source: Arc<dyn ListSource<T>>,
        freshness: Duration,
    ) -> (Self, mpsc::Receiver<RefreshEvent<T>>) {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let revalidator = Self {
            cache,
            source,
            freshness,
            events: tx,
        };
        (revalidator, rx)
    }

    /// Point background refreshes at a new receiver; results still in flight
    /// for the old one are dropped with it.
    pub fn reconnect(&mut self) -> mpsc::Receiver<RefreshEvent<T>> {
        let (tx, rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        self.events = tx;
        rx
    }

    pub fn freshness(&self) -> Duration {
        self.freshness
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn read(&self, key: &CacheKey) -> Option<CachedData<Vec<T>>> {
        self.cache.read(key)
    }

    pub fn write(&self, key: &CacheKey, items: &[T]) -> Result<DateTime<Utc>> {
        self.cache.write(key, &items)
    }

    pub fn plan(&self, key: &CacheKey) -> LoadPlan {
        self.plan_for(self.read(key).as_ref())
    }

    fn plan_for(&self, entry: Option<&CachedData<Vec<T>>>) -> LoadPlan {
        match entry {
            None => LoadPlan::BlockingFetch,
            Some(entry) if entry.is_fresh(self.freshness) => LoadPlan::ServeFresh,
            Some(_) => LoadPlan::ServeStaleAndRevalidate,
        }
    }

    /// Serve `key` according to its cache state. Must run inside a tokio runtime.
    pub async fn load(&self, key: &CacheKey) -> Snapshot<T> {
        let entry = self.read(key);
        match (self.plan_for(entry.as_ref()), entry) {
            (LoadPlan::ServeFresh, Some(entry)) => {
                debug!(cache = %key, age = %entry.age_display(), "Serving fresh cache");
                Snapshot::from_entry(entry, false)
            }
            (LoadPlan::ServeStaleAndRevalidate, Some(entry)) => {
                debug!(cache = %key, age = %entry.age_display(), "Serving stale cache, revalidating");
                self.revalidate(key);
                Snapshot::from_entry(entry, true)
            }
            _ => self.refresh(key, true).await,
        }
    }

    /// Fetch `key` from the source.
    ///
    /// Blocking: wait for the fetch and return its result, falling back to
    /// whatever is cached if it fails. Non-blocking: return what is cached
    /// now and let a background task deliver the fetch as a `RefreshEvent`.
    pub async fn refresh(&self, key: &CacheKey, blocking: bool) -> Snapshot<T> {
        if !blocking {
            self.revalidate(key);
            let mut snapshot = match self.read(key) {
                Some(entry) => Snapshot::from_entry(entry, true),
                None => Snapshot::empty(),
            };
            snapshot.revalidating = true;
            return snapshot;
        }

        match Self::fetch_and_store(&self.cache, self.source.as_ref(), key).await {
            Ok((items, fetched_at)) => Snapshot {
                items,
                origin: Origin::Network,
                fetched_at: Some(fetched_at),
                revalidating: false,
                error: None,
            },
            Err(e) => {
                let error = format!("{:#}", e);
                warn!(cache = %key, error = %error, "Fetch failed, keeping last known data");
                let mut snapshot = match self.read(key) {
                    Some(entry) => Snapshot::from_entry(entry, false),
                    None => Snapshot::empty(),
                };
                snapshot.error = Some(error);
                snapshot
            }
        }
    }

    /// Start a background refresh of `key`.
    pub fn revalidate(&self, key: &CacheKey) {
        let cache = self.cache.clone();
        let source = Arc::clone(&self.source);
        let tx = self.events.clone();
        let key = key.clone();

        tokio::spawn(async move {
            let event = match Self::fetch_and_store(&cache, source.as_ref(), &key).await {
                Ok((items, fetched_at)) => RefreshEvent::Updated {
                    key,
                    items,
                    fetched_at,
                },
                Err(e) => {
                    let error = format!("{:#}", e);
                    warn!(cache = %key, error = %error, "Background refresh failed");
                    RefreshEvent::Failed { key, error }
                }
            };

            if tx.send(event).await.is_err() {
                debug!("List view gone, dropping refresh result");
            }
        });
    }

    async fn fetch_and_store(
        cache: &CacheManager,
        source: &dyn ListSource<T>,
        key: &CacheKey,
    ) -> Result<(Vec<T>, DateTime<Utc>)> {
        let items = source.fetch_list(key.search()).await?;
        info!(cache = %key, count = items.len(), "List refreshed");

        let fetched_at = match cache.write(key, &items) {
            Ok(at) => at,
            Err(e) => {
                warn!(cache = %key, error = %e, "Failed to cache list");
                Utc::now()
            }
        };
        Ok((items, fetched_at))
    }
}
