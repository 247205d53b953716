//! Entity cache storage.
//!
//! Every cached read lives in an [`Entry`] keyed by [`QueryKey`]. An entry
//! owns a `watch` channel that fans state changes out to subscribers, the
//! fetcher used to (re)load it, and at most one in-flight fetch that all
//! concurrent readers share.
//!
//! Fetches run on spawned tasks: a fetch always completes and populates the
//! cache, even if every subscriber went away while it was running. All entry
//! points that may start a fetch must therefore be called from within a Tokio
//! runtime.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt, Shared};
use metrics::counter;
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::query::{QueryData, QueryState, QueryStatus};
use crate::transport::TransportError;

use super::config::CacheConfig;
use super::keys::{QueryKey, TagSet};
use super::lock::mutex_lock;
use super::registry::CacheRegistry;
use super::subscription::Subscription;

const SOURCE: &str = "cache::store";

const METRIC_CACHE_HIT: &str = "libris_cache_hit_total";
const METRIC_CACHE_MISS: &str = "libris_cache_miss_total";
const METRIC_CACHE_DEDUP: &str = "libris_cache_dedup_total";
const METRIC_CACHE_REFETCH: &str = "libris_cache_refetch_total";
const METRIC_CACHE_EVICT: &str = "libris_cache_evict_total";

pub type FetchResult = Result<QueryData, TransportError>;

/// Loads the value for one key. Called again on every refetch.
pub type Fetcher = Arc<dyn Fn() -> BoxFuture<'static, FetchResult> + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

struct InFlight {
    id: u64,
    fetch: SharedFetch,
}

struct Entry {
    fetcher: Fetcher,
    state: watch::Sender<QueryState>,
    subscribers: usize,
    /// Set by invalidation; cleared when a new fetch starts.
    stale: bool,
    /// Invalidated while a fetch was running: refetch once it settles.
    refetch_queued: bool,
    in_flight: Option<InFlight>,
    /// Bumped whenever the entry becomes unused; pending evictions compare it.
    release_epoch: u64,
}

impl Entry {
    fn new(fetcher: Fetcher) -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            fetcher,
            state,
            subscribers: 0,
            stale: false,
            refetch_queued: false,
            in_flight: None,
            release_epoch: 0,
        }
    }

    fn fresh_data(&self) -> Option<QueryData> {
        if self.stale {
            return None;
        }
        let state = self.state.borrow();
        match state.status {
            QueryStatus::Success => state.data.clone(),
            _ => None,
        }
    }
}

/// Summary of one invalidation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Invalidation {
    /// Every entry marked stale.
    pub stale: Vec<QueryKey>,
    /// Stale entries with subscribers, refetching now or right after their
    /// running fetch settles.
    pub refetching: Vec<QueryKey>,
}

struct Inner {
    config: CacheConfig,
    registry: Arc<CacheRegistry>,
    entries: Mutex<HashMap<QueryKey, Entry>>,
    next_fetch_id: AtomicU64,
}

/// Keyed store of fetched query results.
///
/// Cheap to clone; clones share the same entries. The application owns one
/// instance for its whole lifetime.
#[derive(Clone)]
pub struct EntityCache {
    inner: Arc<Inner>,
}

impl EntityCache {
    pub fn new(config: CacheConfig, registry: Arc<CacheRegistry>) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                registry,
                entries: Mutex::new(HashMap::new()),
                next_fetch_id: AtomicU64::new(0),
            }),
        }
    }

    /// Subscribe to `key`, fetching it if there is no fresh value.
    ///
    /// Concurrent readers of the same key share one in-flight request. A key
    /// whose last fetch failed is fetched again for the new subscriber.
    #[instrument(skip(self, tags, fetcher), fields(key = %key))]
    pub fn read(&self, key: QueryKey, tags: TagSet, fetcher: Fetcher) -> Subscription {
        let receiver = {
            let mut entries = mutex_lock(&self.inner.entries, SOURCE, "read");
            let entry = self.entry_mut(&mut entries, &key, tags, fetcher);
            entry.subscribers += 1;
            let receiver = entry.state.subscribe();

            if entry.in_flight.is_some() {
                counter!(METRIC_CACHE_DEDUP, "query" => key.kind()).increment(1);
                debug!("joined in-flight fetch");
                // The running fetch predates an invalidation.
                if entry.stale {
                    entry.refetch_queued = true;
                }
            } else if entry.fresh_data().is_some() {
                counter!(METRIC_CACHE_HIT, "query" => key.kind()).increment(1);
            } else {
                counter!(METRIC_CACHE_MISS, "query" => key.kind()).increment(1);
                self.start_fetch(&key, entry);
            }
            receiver
        };

        Subscription::new(self.clone(), key, receiver)
    }

    /// Resolve `key` once without subscribing.
    ///
    /// Returns a fresh cached value directly, joins a running fetch, or starts
    /// one. A running fetch that was invalidated while in flight is awaited
    /// and then superseded by the refetch that follows it.
    ///
    /// The awaited result is stored before returning or retrying, so the next
    /// pass never sees the same settled fetch as still in flight.
    #[instrument(skip(self, tags, fetcher), fields(key = %key))]
    pub async fn resolve(&self, key: QueryKey, tags: TagSet, fetcher: Fetcher) -> FetchResult {
        loop {
            let (id, fetch, superseded) = {
                let mut entries = mutex_lock(&self.inner.entries, SOURCE, "resolve");
                let entry = self.entry_mut(&mut entries, &key, tags.clone(), fetcher.clone());

                if let Some(in_flight) = &entry.in_flight {
                    counter!(METRIC_CACHE_DEDUP, "query" => key.kind()).increment(1);
                    (in_flight.id, in_flight.fetch.clone(), entry.stale)
                } else if let Some(data) = entry.fresh_data() {
                    counter!(METRIC_CACHE_HIT, "query" => key.kind()).increment(1);
                    return Ok(data);
                } else {
                    counter!(METRIC_CACHE_MISS, "query" => key.kind()).increment(1);
                    let in_flight = self.start_fetch(&key, entry);
                    (in_flight.id, in_flight.fetch.clone(), false)
                }
            };

            let result = fetch.await;
            self.complete(&key, id, result.clone());
            if !superseded {
                return result;
            }
            debug!(fetch_id = id, "awaited fetch was invalidated in flight; resolving again");
        }
    }

    /// Mark every entry providing one of `tags` as stale.
    ///
    /// Entries with subscribers refetch immediately, or right after their
    /// running fetch settles. Entries without subscribers refetch on their
    /// next read.
    #[instrument(skip(self), fields(tags = ?tags))]
    pub fn invalidate(&self, tags: &TagSet) -> Invalidation {
        let keys = self.inner.registry.keys_for_tags(tags);
        let mut outcome = Invalidation::default();

        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "invalidate");
        for key in keys {
            let Some(entry) = entries.get_mut(&key) else {
                continue;
            };
            entry.stale = true;
            outcome.stale.push(key.clone());

            if entry.subscribers == 0 {
                continue;
            }
            counter!(METRIC_CACHE_REFETCH, "query" => key.kind()).increment(1);
            if entry.in_flight.is_some() {
                entry.refetch_queued = true;
            } else {
                self.start_fetch(&key, entry);
            }
            outcome.refetching.push(key);
        }
        drop(entries);

        info!(
            stale = outcome.stale.len(),
            refetching = outcome.refetching.len(),
            "Cache entries invalidated"
        );
        outcome
    }

    /// Explicitly refetch `key`, regardless of subscribers.
    ///
    /// Returns `false` when the key has never been read.
    pub fn refetch(&self, key: &QueryKey) -> bool {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "refetch");
        let Some(entry) = entries.get_mut(key) else {
            return false;
        };
        if entry.in_flight.is_none() {
            counter!(METRIC_CACHE_REFETCH, "query" => key.kind()).increment(1);
            self.start_fetch(key, entry);
        }
        true
    }

    /// Current state of `key`, if it has an entry.
    pub fn snapshot(&self, key: &QueryKey) -> Option<QueryState> {
        mutex_lock(&self.inner.entries, SOURCE, "snapshot")
            .get(key)
            .map(|entry| entry.state.borrow().clone())
    }

    pub fn subscriber_count(&self, key: &QueryKey) -> usize {
        mutex_lock(&self.inner.entries, SOURCE, "subscriber_count")
            .get(key)
            .map_or(0, |entry| entry.subscribers)
    }

    pub fn is_stale(&self, key: &QueryKey) -> bool {
        mutex_lock(&self.inner.entries, SOURCE, "is_stale")
            .get(key)
            .is_some_and(|entry| entry.stale)
    }

    pub fn is_fetching(&self, key: &QueryKey) -> bool {
        mutex_lock(&self.inner.entries, SOURCE, "is_fetching")
            .get(key)
            .is_some_and(|entry| entry.in_flight.is_some())
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        mutex_lock(&self.inner.entries, SOURCE, "contains").contains_key(key)
    }

    pub fn len(&self) -> usize {
        mutex_lock(&self.inner.entries, SOURCE, "len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop one subscriber of `key`.
    pub(super) fn release(&self, key: &QueryKey) {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "release");
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        entry.subscribers = entry.subscribers.saturating_sub(1);
        if entry.subscribers == 0 && entry.in_flight.is_none() {
            self.schedule_eviction(key, entry);
        }
    }

    fn entry_mut<'a>(
        &self,
        entries: &'a mut HashMap<QueryKey, Entry>,
        key: &QueryKey,
        tags: TagSet,
        fetcher: Fetcher,
    ) -> &'a mut Entry {
        entries
            .entry(key.clone())
            .and_modify(|entry| entry.fetcher = fetcher.clone())
            .or_insert_with(|| {
                self.inner.registry.register(key.clone(), tags);
                Entry::new(fetcher)
            })
    }

    /// Start a fetch for `entry` and publish the `Loading` transition.
    ///
    /// Caller holds the entries lock and has checked nothing is in flight.
    fn start_fetch<'a>(&self, key: &QueryKey, entry: &'a mut Entry) -> &'a InFlight {
        let id = self.inner.next_fetch_id.fetch_add(1, Ordering::Relaxed);
        let fetch = (entry.fetcher)().shared();
        let task = fetch.clone();

        entry.stale = false;
        entry.refetch_queued = false;
        entry
            .state
            .send_modify(|state| state.status = QueryStatus::Loading);

        debug!(key = %key, fetch_id = id, "fetch started");

        let cache = self.clone();
        let key = key.clone();
        tokio::spawn(async move {
            let result = task.await;
            cache.complete(&key, id, result);
        });

        entry.in_flight.insert(InFlight { id, fetch })
    }

    /// Store a settled fetch and notify every subscriber in one send.
    fn complete(&self, key: &QueryKey, id: u64, result: FetchResult) {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "complete");
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.in_flight.as_ref().map(|in_flight| in_flight.id) != Some(id) {
            return;
        }
        entry.in_flight = None;

        let succeeded = result.is_ok();
        entry.state.send_modify(|state| match result {
            Ok(data) => {
                state.status = QueryStatus::Success;
                state.data = Some(data);
                state.error = None;
            }
            Err(error) => {
                state.status = QueryStatus::Error;
                state.error = Some(error);
            }
        });
        debug!(
            key = %key,
            fetch_id = id,
            succeeded,
            subscribers = entry.subscribers,
            "fetch settled"
        );

        if entry.refetch_queued && entry.subscribers > 0 {
            self.start_fetch(key, entry);
        } else if entry.subscribers == 0 {
            self.schedule_eviction(key, entry);
        }
    }

    fn schedule_eviction(&self, key: &QueryKey, entry: &mut Entry) {
        let Some(grace) = self.inner.config.keep_unused() else {
            return;
        };
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };

        entry.release_epoch += 1;
        let epoch = entry.release_epoch;
        let cache = self.clone();
        let key = key.clone();
        runtime.spawn(async move {
            tokio::time::sleep(grace).await;
            cache.evict_if_unused(&key, epoch);
        });
    }

    fn evict_if_unused(&self, key: &QueryKey, epoch: u64) {
        let mut entries = mutex_lock(&self.inner.entries, SOURCE, "evict");
        let unused = entries.get(key).is_some_and(|entry| {
            entry.subscribers == 0 && entry.in_flight.is_none() && entry.release_epoch == epoch
        });
        if !unused {
            return;
        }
        entries.remove(key);
        self.inner.registry.unregister(key);
        drop(entries);

        counter!(METRIC_CACHE_EVICT, "query" => key.kind()).increment(1);
        debug!(key = %key, "evicted unused cache entry");
    }
}
