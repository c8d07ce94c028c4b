//! Bounded cache with least-recently-used eviction.
//!
//! Same get-or-compute contract as the sharded cache, but each shard is an
//! `lru::LruCache` capped at its share of the total capacity. Eviction only
//! costs a recomputation: results are a pure function of the key.

use ahash::RandomState;
use lru::LruCache;
use parking_lot::Mutex;
use std::hash::{BuildHasher, Hash};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{CacheStats, ResultCache};

pub struct BoundedCache<K, V> {
    shards: Box<[Mutex<LruCache<K, V, RandomState>>]>,
    hasher: RandomState,
    capacity: NonZeroUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<K, V> BoundedCache<K, V>
where
    K: Hash + Eq,
    V: Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self::with_shards(capacity, super::default_shards())
    }

    /// Split `capacity` across `num_shards` shards, rounding up.
    ///
    /// The shard count never exceeds the capacity, so the total stays close
    /// to what was asked for.
    pub fn with_shards(capacity: NonZeroUsize, num_shards: usize) -> Self {
        let num_shards = num_shards.clamp(1, capacity.get());
        let per_shard = NonZeroUsize::new(capacity.get().div_ceil(num_shards))
            .unwrap_or(NonZeroUsize::MIN);
        Self {
            shards: (0..num_shards)
                .map(|_| Mutex::new(LruCache::with_hasher(per_shard, RandomState::new())))
                .collect(),
            hasher: RandomState::new(),
            capacity,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Total capacity requested at construction.
    pub fn capacity(&self) -> NonZeroUsize {
        self.capacity
    }

    pub fn num_shards(&self) -> usize {
        self.shards.len()
    }

    /// Look up a key, marking it as recently used.
    pub fn get(&self, key: &K) -> Option<V> {
        self.shard_for(key).lock().get(key).cloned()
    }

    fn shard_for(&self, key: &K) -> &Mutex<LruCache<K, V, RandomState>> {
        let idx = (self.hasher.hash_one(key) as usize) % self.shards.len();
        &self.shards[idx]
    }
}

impl<K, V> ResultCache<K, V> for BoundedCache<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        let shard = self.shard_for(&key);
        if let Some(value) = shard.lock().get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return value.clone();
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let value = compute();

        let mut guard = shard.lock();
        if let Some(existing) = guard.get(&key) {
            return existing.clone();
        }
        guard.put(key, value.clone());
        value
    }

    fn len(&self) -> usize {
        self.shards.iter().map(|s| s.lock().len()).sum()
    }

    fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().clear();
        }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::PairKey;
    use std::sync::Arc;
    use std::thread;

    fn capacity(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).unwrap()
    }

    #[test]
    fn test_evicts_least_recently_used() {
        let cache: BoundedCache<PairKey, usize> = BoundedCache::with_shards(capacity(2), 1);
        cache.get_or_compute(PairKey::new("a", "a"), || 1);
        cache.get_or_compute(PairKey::new("b", "b"), || 2);
        // Touch "a" so "b" becomes the eviction candidate
        assert_eq!(cache.get(&PairKey::new("a", "a")), Some(1));
        cache.get_or_compute(PairKey::new("c", "c"), || 3);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&PairKey::new("a", "a")), Some(1));
        assert_eq!(cache.get(&PairKey::new("b", "b")), None);
        assert_eq!(cache.get(&PairKey::new("c", "c")), Some(3));
    }

    #[test]
    fn test_hit_after_miss() {
        let cache: BoundedCache<PairKey, f64> = BoundedCache::new(capacity(64));
        assert_eq!(cache.get_or_compute(PairKey::new("x", "y"), || 0.5), 0.5);
        assert_eq!(cache.get_or_compute(PairKey::new("x", "y"), || 0.9), 0.5);
        let stats = cache.stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[test]
    fn test_shards_never_exceed_capacity() {
        let cache: BoundedCache<PairKey, f64> = BoundedCache::with_shards(capacity(3), 16);
        assert_eq!(cache.num_shards(), 3);
        assert_eq!(cache.capacity().get(), 3);
        for i in 0..50 {
            cache.get_or_compute(PairKey::new(&i.to_string(), ""), || 0.0);
        }
        assert!(cache.len() <= 3);
    }

    #[test]
    fn test_concurrent_bounded() {
        let cache: Arc<BoundedCache<PairKey, usize>> =
            Arc::new(BoundedCache::with_shards(capacity(32), 4));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    for j in 0..100 {
                        let key = PairKey::new(&format!("t{}", i), &format!("c{}", j % 20));
                        assert_eq!(cache.get_or_compute(key, || j % 20), j % 20);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert!(cache.len() <= 32);
    }
}
