//! Expiring Cache Module
//!
//! Public cache surface combining the concurrent store, the expiration queue
//! and the janitor that reconciles them.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use crate::cache::{
    current_timestamp_ms, deadline_after, CacheStats, Compute, ConcurrentStore, ExpirationMarker,
    ExpirationQueue, LiveEntry, Lookup, StatsRecorder,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{self, Janitor, SweepReport};

const ABSENT_KEY_OR_VALUE: &str = "neither key nor value may be absent";
const ABSENT_KEY: &str = "key may not be absent";

// == Shared State ==
/// State reachable from both callers and the janitor thread.
#[derive(Debug)]
struct Shared<K, V>
where
    K: Eq + Hash,
{
    store: ConcurrentStore<K, V>,
    queue: ExpirationQueue<K>,
    stats: StatsRecorder,
}

impl<K, V> Shared<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn sweep(&self) -> SweepReport {
        let report = tasks::sweep(&self.store, &self.queue, current_timestamp_ms());
        self.stats.record_sweep(report.removed, report.stale, report.orphaned);

        if report.markers() > 0 {
            debug!(
                removed = report.removed,
                stale = report.stale,
                orphaned = report.orphaned,
                "Swept expiration markers"
            );
        }

        report
    }
}

// == Expiring Cache ==
/// Concurrent in-memory key-value cache with optional per-entry TTL.
///
/// Entries written with [`put`](Self::put) never expire. Entries written with
/// [`put_with_ttl`](Self::put_with_ttl) stop being visible once their TTL
/// elapses and are physically removed by a background janitor owned by this
/// instance. Share the cache between threads by wrapping it in an `Arc`.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use expiring_cache::ExpiringCache;
///
/// let cache: ExpiringCache<i32, i32> = ExpiringCache::new().unwrap();
/// cache.put(1, 100).unwrap();
/// cache.put_with_ttl(2, 200, Duration::from_secs(60)).unwrap();
///
/// assert_eq!(cache.get(&1), Some(100));
/// assert_eq!(cache.get(&2), Some(200));
/// assert_eq!(cache.size(), 2);
/// cache.shutdown();
/// ```
#[derive(Debug)]
pub struct ExpiringCache<K, V>
where
    K: Eq + Hash,
{
    shared: Arc<Shared<K, V>>,
    janitor: Janitor,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache with the default configuration and starts its janitor.
    pub fn new() -> Result<Self> {
        Self::with_config(CacheConfig::default())
    }

    /// Creates a cache from `config` and starts its janitor.
    ///
    /// # Errors
    /// - `InvalidConfig` if the configuration does not validate
    /// - `Scheduler` if the janitor cannot be started
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        let store = match config.shard_amount {
            Some(shards) => {
                ConcurrentStore::with_capacity_and_shard_amount(config.initial_capacity, shards)
            }
            None => ConcurrentStore::with_capacity(config.initial_capacity),
        };

        let shared = Arc::new(Shared {
            store,
            queue: ExpirationQueue::new(),
            stats: StatsRecorder::new(),
        });

        let janitor = {
            let shared = Arc::clone(&shared);
            Janitor::spawn(config.sweep_interval, move || {
                shared.sweep();
            })?
        };

        info!(
            "Expiring cache initialized: sweep_interval={:?}, initial_capacity={}",
            config.sweep_interval, config.initial_capacity
        );

        Ok(Self { shared, janitor })
    }

    // == Put ==
    /// Stores a value that never expires, replacing any previous entry.
    ///
    /// # Errors
    /// `InvalidArgument` if the key or the value is `None`.
    pub fn put(&self, key: impl Into<Option<K>>, value: impl Into<Option<V>>) -> Result<()> {
        let (key, value) = require_pair(key.into(), value.into())?;
        self.shared.store.insert(key, LiveEntry::persistent(value));
        Ok(())
    }

    // == Put With TTL ==
    /// Stores a value that expires `ttl` from now, replacing any previous entry.
    ///
    /// The expiration marker is queued while the key is locked, so the marker
    /// and the entry it describes appear together to other writers of the key.
    ///
    /// # Errors
    /// `InvalidArgument` if the key or the value is `None`.
    pub fn put_with_ttl(
        &self,
        key: impl Into<Option<K>>,
        value: impl Into<Option<V>>,
        ttl: Duration,
    ) -> Result<()> {
        let (key, value) = require_pair(key.into(), value.into())?;
        let expires_at = deadline_after(current_timestamp_ms(), ttl);
        let marker = ExpirationMarker::new(key.clone(), expires_at);
        let queue = &self.shared.queue;

        // Queue lock nests inside the key's shard lock; the janitor never
        // holds the queue lock while computing on the store.
        self.shared.store.compute(key, |_| {
            queue.push(marker);
            Compute::Replace(LiveEntry::expiring(value, expires_at))
        });

        Ok(())
    }

    // == Get ==
    /// Returns the value for `key` if present and not past its deadline.
    ///
    /// A `None` key is simply not found. Expired entries are hidden here even
    /// if the janitor has not removed them yet; the store is never modified.
    pub fn get<'a>(&self, key: impl Into<Option<&'a K>>) -> Option<V>
    where
        K: 'a,
    {
        let lookup = match key.into() {
            Some(key) => self.shared.store.lookup(key, current_timestamp_ms()),
            None => Lookup::Missing,
        };

        match lookup {
            Lookup::Hit(value) => {
                self.shared.stats.record_hit();
                Some(value)
            }
            Lookup::Expired => {
                self.shared.stats.record_expired_read();
                self.shared.stats.record_miss();
                None
            }
            Lookup::Missing => {
                self.shared.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes any entry for `key`.
    ///
    /// Queued markers for the key are left behind and are skipped when they
    /// come due.
    ///
    /// # Errors
    /// `InvalidArgument` if the key is `None`.
    pub fn delete(&self, key: impl Into<Option<K>>) -> Result<()> {
        let key = key
            .into()
            .ok_or_else(|| CacheError::InvalidArgument(ABSENT_KEY.to_string()))?;
        self.shared.store.remove(&key);
        Ok(())
    }

    // == Size ==
    /// Returns the number of entries physically stored.
    ///
    /// Includes entries past their deadline that have not been swept yet.
    pub fn size(&self) -> usize {
        self.shared.store.len()
    }

    /// Returns true if no entries are stored.
    pub fn is_empty(&self) -> bool {
        self.shared.store.is_empty()
    }

    /// Returns the number of expiration markers waiting in the queue.
    ///
    /// The queue is unbounded; this grows if TTL writes outpace sweeping.
    pub fn pending_expirations(&self) -> usize {
        self.shared.queue.len()
    }

    // == Stats ==
    /// Returns a snapshot of read and sweep activity.
    pub fn stats(&self) -> CacheStats {
        self.shared
            .stats
            .snapshot(self.shared.store.len(), self.shared.queue.len())
    }

    // == Sweep ==
    /// Runs one reconciliation pass on the calling thread.
    ///
    /// Works whether or not the janitor is still running.
    pub fn sweep(&self) -> SweepReport {
        self.shared.sweep()
    }

    // == Shutdown ==
    /// Stops background sweeping. Idempotent.
    ///
    /// The cache stays usable afterwards; expired entries are still hidden from
    /// `get` but are no longer reclaimed unless [`sweep`](Self::sweep) is called.
    pub fn shutdown(&self) {
        if self.janitor.is_running() {
            info!("Shutting down expiring cache janitor");
        }
        self.janitor.shutdown();
    }

    /// Returns true once `shutdown` has been called.
    pub fn is_shut_down(&self) -> bool {
        !self.janitor.is_running()
    }
}

fn require_pair<K, V>(key: Option<K>, value: Option<V>) -> Result<(K, V)> {
    match (key, value) {
        (Some(key), Some(value)) => Ok((key, value)),
        _ => Err(CacheError::InvalidArgument(ABSENT_KEY_OR_VALUE.to_string())),
    }
}
