//! Concurrent Store Module
//!
//! Shard-locked key to entry map with an atomic per-key compute step.

use std::hash::Hash;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::cache::LiveEntry;

// == Compute Action ==
/// What a compute closure wants done with the key it inspected.
#[derive(Debug)]
pub enum Compute<V> {
    /// Leave the slot as it is
    Keep,
    /// Install this entry, replacing whatever was there
    Replace(LiveEntry<V>),
    /// Remove the key
    Remove,
}

// == Lookup ==
/// Outcome of a read against the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<V> {
    /// The key holds a value that is still valid
    Hit(V),
    /// The key holds an entry past its deadline, not yet swept
    Expired,
    /// Nothing is stored under the key
    Missing,
}

// == Concurrent Store ==
/// Thread-safe mapping from key to live entry.
///
/// Each shard has its own lock, so operations on different keys proceed in
/// parallel while `compute` on one key is indivisible relative to every other
/// operation on that key.
#[derive(Debug)]
pub struct ConcurrentStore<K, V>
where
    K: Eq + Hash,
{
    inner: DashMap<K, LiveEntry<V>>,
}

impl<K, V> Default for ConcurrentStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> ConcurrentStore<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructors ==
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self {
            inner: DashMap::new(),
        }
    }

    /// Creates a store with room for `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: DashMap::with_capacity(capacity),
        }
    }

    /// Creates a store with the given capacity and shard count.
    ///
    /// `shard_amount` must be a power of two greater than one; callers
    /// validate it through `CacheConfig::validate`.
    pub fn with_capacity_and_shard_amount(capacity: usize, shard_amount: usize) -> Self {
        Self {
            inner: DashMap::with_capacity_and_shard_amount(capacity, shard_amount),
        }
    }

    // == Get ==
    /// Returns a copy of the entry stored under `key`.
    pub fn get(&self, key: &K) -> Option<LiveEntry<V>> {
        self.inner.get(key).map(|entry| entry.value().clone())
    }

    /// Reads `key`, treating entries past their deadline at `now_ms` as gone.
    ///
    /// Expired entries are left in place for the janitor.
    pub fn lookup(&self, key: &K, now_ms: i64) -> Lookup<V> {
        match self.inner.get(key) {
            Some(entry) if entry.is_live_at(now_ms) => Lookup::Hit(entry.value.clone()),
            Some(_) => Lookup::Expired,
            None => Lookup::Missing,
        }
    }

    // == Insert ==
    /// Installs an entry unconditionally, returning the one it replaced.
    pub fn insert(&self, key: K, entry: LiveEntry<V>) -> Option<LiveEntry<V>> {
        self.inner.insert(key, entry)
    }

    // == Remove ==
    /// Removes the entry under `key`, returning it if present.
    pub fn remove(&self, key: &K) -> Option<LiveEntry<V>> {
        self.inner.remove(key).map(|(_, entry)| entry)
    }

    // == Compute ==
    /// Reads the entry under `key` and applies the closure's decision as one
    /// indivisible step.
    ///
    /// The closure runs while the key's shard is write-locked, so it must not
    /// call back into this store. Returns true if the key is present afterwards.
    pub fn compute<F>(&self, key: K, f: F) -> bool
    where
        F: FnOnce(Option<&LiveEntry<V>>) -> Compute<V>,
    {
        match self.inner.entry(key) {
            Entry::Occupied(mut occupied) => match f(Some(occupied.get())) {
                Compute::Keep => true,
                Compute::Replace(entry) => {
                    occupied.insert(entry);
                    true
                }
                Compute::Remove => {
                    occupied.remove();
                    false
                }
            },
            Entry::Vacant(vacant) => match f(None) {
                Compute::Replace(entry) => {
                    vacant.insert(entry);
                    true
                }
                Compute::Keep | Compute::Remove => false,
            },
        }
    }

    // == Length ==
    /// Returns the number of entries physically present, expired or not.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
