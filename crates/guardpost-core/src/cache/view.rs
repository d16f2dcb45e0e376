//! View model for one entity list screen.
//!
//! A `ListView` owns the items currently shown, the active search filter and
//! the receiving end of its revalidator's channel. Background refreshes land
//! through `poll()` (non-blocking, call it once per tick) or `next_update()`
//! (await the next one). A completion is applied only while the view is
//! mounted and only when it belongs to the filter currently shown.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::mpsc;
use tracing::debug;

use super::manager::{age_display, CacheKey, CacheManager};
use super::revalidate::{ListSource, LoadPlan, Origin, RefreshEvent, Revalidator, Snapshot};
use crate::models::Resource;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewStatus {
    /// Not mounted, or mounted with nothing loaded yet.
    #[default]
    Idle,
    /// Waiting on a blocking fetch with nothing to show.
    Loading,
    Ready,
    /// Showing cached items while a background refresh runs.
    Updating,
    /// The last refresh failed; the items shown are the last known ones.
    UpdateFailed(String),
}

impl ViewStatus {
    pub fn label(&self) -> &str {
        match self {
            ViewStatus::Idle => "",
            ViewStatus::Loading => "Loading…",
            ViewStatus::Ready => "",
            ViewStatus::Updating => "updating…",
            ViewStatus::UpdateFailed(_) => "update failed",
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, ViewStatus::Loading | ViewStatus::Updating)
    }
}

pub struct ListView<T> {
    revalidator: Revalidator<T>,
    events: Option<mpsc::Receiver<RefreshEvent<T>>>,
    namespace: String,
    filter: String,
    items: Vec<T>,
    fetched_at: Option<DateTime<Utc>>,
    status: ViewStatus,
}

impl<R: Resource> ListView<R> {
    /// A view over the cache namespace of `R`.
    pub fn for_resource(
        cache: CacheManager,
        source: Arc<dyn ListSource<R>>,
        freshness: Duration,
    ) -> Self {
        Self::new(cache, source, R::NAMESPACE, freshness)
    }
}

impl<T> ListView<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    pub fn new(
        cache: CacheManager,
        source: Arc<dyn ListSource<T>>,
        namespace: impl Into<String>,
        freshness: Duration,
    ) -> Self {
        // Stays unmounted until mount() connects a receiver
        let (revalidator, _rx) = Revalidator::new(cache, source, freshness);
        Self {
            revalidator,
            events: None,
            namespace: namespace.into(),
            filter: String::new(),
            items: Vec::new(),
            fetched_at: None,
            status: ViewStatus::Idle,
        }
    }

    pub fn key(&self) -> CacheKey {
        CacheKey::new(self.namespace.as_str(), self.filter.as_str())
    }

    pub fn filter(&self) -> &str {
        &self.filter
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn status(&self) -> &ViewStatus {
        &self.status
    }

    pub fn is_mounted(&self) -> bool {
        self.events.is_some()
    }

    pub fn fetched_at(&self) -> Option<DateTime<Utc>> {
        self.fetched_at
    }

    pub fn age_display(&self) -> Option<String> {
        self.fetched_at.map(age_display)
    }

    /// What mounting or refiltering to the current key would do right now.
    pub fn plan(&self) -> LoadPlan {
        self.revalidator.plan(&self.key())
    }

    /// Connect to background refreshes and load the current key.
    pub async fn mount(&mut self) -> LoadPlan {
        self.events = Some(self.revalidator.reconnect());
        self.load().await
    }

    /// Connect and go straight to the network, whatever the cache holds.
    /// On failure the cached items, if any, are shown with the error.
    pub async fn mount_refreshed(&mut self) {
        self.events = Some(self.revalidator.reconnect());
        self.status = ViewStatus::Loading;
        self.refresh(true).await;
    }

    /// Switch to `filter` and load it. Items cached under the previous filter
    /// stay in the store but are no longer shown.
    ///
    /// While unmounted only the filter is recorded; the next `mount()` loads it.
    pub async fn set_filter(&mut self, filter: impl Into<String>) -> LoadPlan {
        let filter = filter.into();
        if filter != self.filter {
            debug!(namespace = %self.namespace, from = %self.filter, to = %filter, "Filter changed");
            self.filter = filter;
            self.items.clear();
            self.fetched_at = None;
        }

        if !self.is_mounted() {
            return self.plan();
        }
        self.load().await
    }

    async fn load(&mut self) -> LoadPlan {
        let key = self.key();
        let plan = self.revalidator.plan(&key);
        if plan == LoadPlan::BlockingFetch {
            self.status = ViewStatus::Loading;
        }
        let snapshot = self.revalidator.load(&key).await;
        self.apply(snapshot);
        plan
    }

    /// Refresh the current key regardless of age.
    ///
    /// `force` waits for the network; otherwise the refresh runs in the
    /// background and lands through `poll()` or `next_update()`.
    pub async fn refresh(&mut self, force: bool) {
        if !self.is_mounted() {
            debug!(namespace = %self.namespace, "Refresh on unmounted view ignored");
            return;
        }

        let key = self.key();
        let snapshot = self.revalidator.refresh(&key, force).await;

        // Never blank a list that has something to show
        if snapshot.origin == Origin::Empty && !self.items.is_empty() {
            self.status = match snapshot.error {
                Some(error) => ViewStatus::UpdateFailed(error),
                None if snapshot.revalidating => ViewStatus::Updating,
                None => ViewStatus::Ready,
            };
            return;
        }
        self.apply(snapshot);
    }

    /// Apply every background result already delivered. Returns how many
    /// changed the view.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let event = match self.events.as_mut() {
                Some(rx) => rx.try_recv(),
                None => break,
            };
            match event {
                Ok(event) => {
                    if self.apply_event(event) {
                        applied += 1;
                    }
                }
                Err(_) => break,
            }
        }
        applied
    }

    /// Wait for the next background result for the current key and apply it.
    ///
    /// Returns false when the view is unmounted. Results for other keys are
    /// skipped. Pending forever if no refresh is in flight, so callers pair it
    /// with a timeout or `select!`.
    pub async fn next_update(&mut self) -> bool {
        loop {
            let event = match self.events.as_mut() {
                Some(rx) => rx.recv().await,
                None => return false,
            };
            let Some(event) = event else {
                return false;
            };
            if self.apply_event(event) {
                return true;
            }
        }
    }

    /// Disconnect from background refreshes. Fetches already in flight still
    /// write the cache, but their results no longer reach this view.
    pub fn unmount(&mut self) {
        self.events = None;
        if self.status.is_busy() {
            self.status = ViewStatus::Idle;
        }
    }

    fn apply(&mut self, snapshot: Snapshot<T>) {
        self.status = match (snapshot.error, snapshot.revalidating) {
            (Some(error), _) => ViewStatus::UpdateFailed(error),
            (None, true) => ViewStatus::Updating,
            (None, false) => ViewStatus::Ready,
        };
        self.items = snapshot.items;
        self.fetched_at = snapshot.fetched_at;
    }

    fn apply_event(&mut self, event: RefreshEvent<T>) -> bool {
        if !self.is_mounted() {
            return false;
        }
        if *event.key() != self.key() {
            debug!(event = %event.key(), current = %self.key(), "Dropping refresh for stale filter");
            return false;
        }

        match event {
            RefreshEvent::Updated {
                items, fetched_at, ..
            } => {
                self.items = items;
                self.fetched_at = Some(fetched_at);
                self.status = ViewStatus::Ready;
            }
            RefreshEvent::Failed { error, .. } => {
                self.status = ViewStatus::UpdateFailed(error);
            }
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::manager::{CachedData, DEFAULT_FRESHNESS_MINUTES};
    use anyhow::Result;
    use futures::future::{BoxFuture, FutureExt};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use tokio::sync::Notify;

    /// Counts calls, can be made to fail, and can hold every fetch until released.
    struct FakeSource {
        calls: AtomicUsize,
        fail: AtomicBool,
        gated: AtomicBool,
        gate: Arc<Notify>,
    }

    impl FakeSource {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                fail: AtomicBool::new(false),
                gated: AtomicBool::new(false),
                gate: Arc::new(Notify::new()),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn release(&self) {
            self.gated.store(false, Ordering::SeqCst);
            self.gate.notify_waiters();
            self.gate.notify_one();
        }
    }

    impl ListSource<String> for FakeSource {
        fn fetch_list(&self, search: Option<String>) -> BoxFuture<'static, Result<Vec<String>>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let fail = self.fail.load(Ordering::SeqCst);
            let gate = self.gated.load(Ordering::SeqCst).then(|| Arc::clone(&self.gate));
            async move {
                if let Some(gate) = gate {
                    gate.notified().await;
                }
                if fail {
                    anyhow::bail!("server unavailable");
                }
                Ok(vec![format!("fresh:{}", search.unwrap_or_default())])
            }
            .boxed()
        }
    }

    fn view(cache: &CacheManager, source: &Arc<FakeSource>) -> ListView<String> {
        ListView::new(
            cache.clone(),
            Arc::clone(source) as Arc<dyn ListSource<String>>,
            "guards",
            Duration::minutes(DEFAULT_FRESHNESS_MINUTES),
        )
    }

    fn seed(cache: &CacheManager, filter: &str, items: &[&str], age_minutes: i64) {
        let key = CacheKey::new("guards", filter);
        let mut entry = CachedData::new(&key, items.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        entry.cached_at = Utc::now() - Duration::minutes(age_minutes);
        cache.write_entry(&entry).unwrap();
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) {
        for _ in 0..200 {
            if condition() {
                return;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        panic!("condition not reached");
    }

    #[tokio::test]
    async fn test_fresh_entry_makes_no_network_call() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        seed(&cache, "", &["cached"], 1);

        let mut view = view(&cache, &source);
        assert_eq!(view.mount().await, LoadPlan::ServeFresh);
        assert_eq!(view.items(), ["cached"]);
        assert_eq!(view.status(), &ViewStatus::Ready);

        tokio::task::yield_now().await;
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_stale_entry_served_before_refresh_resolves() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        source.gated.store(true, Ordering::SeqCst);
        seed(&cache, "", &["stale"], 6);

        let mut view = view(&cache, &source);
        assert_eq!(view.mount().await, LoadPlan::ServeStaleAndRevalidate);
        assert_eq!(view.items(), ["stale"]);
        assert_eq!(view.status(), &ViewStatus::Updating);

        wait_for(|| source.calls() == 1).await;
        // Still showing stale data while the fetch is held
        assert_eq!(view.poll(), 0);
        assert_eq!(view.items(), ["stale"]);

        source.release();
        assert!(view.next_update().await);
        assert_eq!(view.items(), ["fresh:"]);
        assert_eq!(view.status(), &ViewStatus::Ready);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_new_filter_without_entry_blocks() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        let mut view = view(&cache, &source);

        view.set_filter("john").await;
        assert_eq!(view.mount().await, LoadPlan::BlockingFetch);
        assert_eq!(view.items(), ["fresh:john"]);
        assert_eq!(source.calls(), 1);

        assert_eq!(view.set_filter("sarah").await, LoadPlan::BlockingFetch);
        assert_eq!(view.items(), ["fresh:sarah"]);
        assert_eq!(view.status(), &ViewStatus::Ready);
        assert_eq!(source.calls(), 2);

        // john is still fresh under its own key
        assert_eq!(view.set_filter("john").await, LoadPlan::ServeFresh);
        assert_eq!(view.items(), ["fresh:john"]);
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_new_filter_shows_loading_while_fetch_is_held() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        let mut view = view(&cache, &source);

        view.set_filter("john").await;
        view.mount().await;
        assert_eq!(view.items(), ["fresh:john"]);

        source.gated.store(true, Ordering::SeqCst);
        {
            let mut pending = Box::pin(view.set_filter("sarah"));
            assert!(futures::poll!(&mut pending).is_pending());
        }
        // Nothing from john leaks into sarah's list while it loads
        assert_eq!(view.filter(), "sarah");
        assert_eq!(view.status(), &ViewStatus::Loading);
        assert_eq!(view.status().label(), "Loading…");
        assert!(view.items().is_empty());
        assert_eq!(source.calls(), 2);

        source.release();
        view.refresh(true).await;
        assert_eq!(view.items(), ["fresh:sarah"]);
        assert_eq!(view.status(), &ViewStatus::Ready);
    }

    #[tokio::test]
    async fn test_unmounted_set_filter_only_plans() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        let mut view = view(&cache, &source);

        assert_eq!(view.set_filter("sarah").await, LoadPlan::BlockingFetch);
        assert_eq!(view.filter(), "sarah");
        assert_eq!(view.status(), &ViewStatus::Idle);
        assert_eq!(source.calls(), 0);
    }

    #[tokio::test]
    async fn test_malformed_entry_triggers_blocking_fetch() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        cache.store().set("guards", "{\"key\": \"guards\", \"data\": [").unwrap();

        let mut view = view(&cache, &source);
        assert_eq!(view.mount().await, LoadPlan::BlockingFetch);
        assert_eq!(view.items(), ["fresh:"]);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_stale_items() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        source.fail.store(true, Ordering::SeqCst);
        seed(&cache, "", &["stale"], 30);

        let mut view = view(&cache, &source);
        view.mount().await;
        assert!(view.next_update().await);

        assert_eq!(view.items(), ["stale"]);
        assert!(matches!(view.status(), ViewStatus::UpdateFailed(msg) if msg.contains("server unavailable")));
        assert!(cache.read::<Vec<String>>(&view.key()).is_some());
    }

    #[tokio::test]
    async fn test_forced_refresh_failure_keeps_items() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        let mut view = view(&cache, &source);
        view.mount().await;
        assert_eq!(view.items(), ["fresh:"]);

        source.fail.store(true, Ordering::SeqCst);
        cache.clear().unwrap();
        view.refresh(true).await;

        assert_eq!(view.items(), ["fresh:"]);
        assert!(matches!(view.status(), ViewStatus::UpdateFailed(_)));
    }

    #[tokio::test]
    async fn test_completion_after_unmount_is_noop() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        source.gated.store(true, Ordering::SeqCst);
        seed(&cache, "", &["stale"], 10);

        let mut view = view(&cache, &source);
        view.mount().await;
        wait_for(|| source.calls() == 1).await;
        view.unmount();
        assert!(!view.is_mounted());

        source.release();
        wait_for(|| {
            cache
                .read::<Vec<String>>(&CacheKey::new("guards", ""))
                .is_some_and(|e| e.data == ["fresh:"])
        })
        .await;

        assert_eq!(view.poll(), 0);
        assert!(!view.next_update().await);
        assert_eq!(view.items(), ["stale"]);
    }

    #[tokio::test]
    async fn test_result_for_previous_filter_is_ignored() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        source.gated.store(true, Ordering::SeqCst);
        seed(&cache, "", &["stale"], 10);
        seed(&cache, "john", &["john"], 0);

        let mut view = view(&cache, &source);
        view.mount().await;
        wait_for(|| source.calls() == 1).await;

        assert_eq!(view.set_filter("john").await, LoadPlan::ServeFresh);
        source.release();
        wait_for(|| {
            cache
                .read::<Vec<String>>(&CacheKey::new("guards", ""))
                .is_some_and(|e| e.data == ["fresh:"])
        })
        .await;
        // Give the task a moment to send after writing
        tokio::task::yield_now().await;

        assert_eq!(view.poll(), 0);
        assert_eq!(view.items(), ["john"]);
        assert_eq!(view.status(), &ViewStatus::Ready);
    }

    #[tokio::test]
    async fn test_mount_refreshed_skips_fresh_cache() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        seed(&cache, "", &["cached"], 0);

        let mut view = view(&cache, &source);
        view.mount_refreshed().await;
        assert_eq!(view.items(), ["fresh:"]);
        assert_eq!(view.status(), &ViewStatus::Ready);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_background_refresh_lands_through_poll() {
        let cache = CacheManager::in_memory();
        let source = FakeSource::new();
        seed(&cache, "", &["cached"], 0);

        let mut view = view(&cache, &source);
        view.mount().await;
        view.refresh(false).await;
        assert_eq!(view.status(), &ViewStatus::Updating);
        assert_eq!(view.items(), ["cached"]);

        wait_for(|| source.calls() == 1).await;
        wait_for(|| view.poll() == 1).await;
        assert_eq!(view.items(), ["fresh:"]);
        assert!(view.age_display().is_some());
    }
}
