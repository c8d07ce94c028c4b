//! Unbounded concurrent cache.
//!
//! Backed by a `DashMap`, which shards its entries internally so lookups on
//! unrelated keys rarely contend. No map lock is held while a value is being
//! computed.

use ahash::RandomState;
use dashmap::DashMap;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{CacheStats, ResultCache};

/// Append-only concurrent map. Entries are never evicted or overwritten.
pub struct ShardedCache<K, V> {
    map: DashMap<K, V, RandomState>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> ShardedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    /// Create a cache with roughly `num_shards` internal shards.
    ///
    /// DashMap needs a power of two greater than one, so the count is
    /// rounded up.
    pub fn with_shards(num_shards: usize) -> Self {
        let shard_amount = num_shards.max(2).next_power_of_two();
        Self {
            map: DashMap::with_hasher_and_shard_amount(RandomState::new(), shard_amount),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Look up a key without computing anything.
    pub fn get(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| entry.value().clone())
    }
}

impl<K, V> Default for ShardedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    fn default() -> Self {
        Self::with_shards(super::default_shards())
    }
}

impl<K, V> ResultCache<K, V> for ShardedCache<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        if let Some(value) = self.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute();

        // First writer wins; a racing caller gets the stored value back
        self.map.entry(key).or_insert(value).value().clone()
    }

    fn len(&self) -> usize {
        self.map.len()
    }

    fn clear(&self) {
        self.map.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }
}
