//! Memoization for the distance and overlap engines
//!
//! - Sharded: unbounded append-only `DashMap`
//! - Bounded: per-shard LRU with a total capacity
//!
//! Both follow the same contract: values are computed outside any lock, the
//! first value inserted for a key wins and every caller returns the stored
//! value. Concurrent misses on the same key may compute it more than once.

pub mod bounded;
pub mod sharded;

pub use bounded::BoundedCache;
pub use sharded::ShardedCache;

use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::num::NonZeroUsize;

/// Environment variable holding a total capacity for bounded caches.
pub const CACHE_CAPACITY_ENV: &str = "OCRFUZZ_CACHE_CAPACITY";
/// Environment variable overriding the shard count.
pub const CACHE_SHARDS_ENV: &str = "OCRFUZZ_CACHE_SHARDS";

/// Concurrent get-or-compute memoization.
pub trait ResultCache<K, V>: Send + Sync {
    /// Return the cached value for `key`, computing and storing it on a miss.
    fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V;

    /// Number of stored entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset statistics.
    fn clear(&self);

    fn stats(&self) -> CacheStats;
}

/// Hit/miss counters for a cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

impl CacheStats {
    /// Fraction of lookups served from the cache.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// Ordered (term, candidate) pair. Swapped operands are distinct keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PairKey {
    pub first: String,
    pub second: String,
}

impl PairKey {
    pub fn new(first: &str, second: &str) -> Self {
        Self {
            first: first.to_owned(),
            second: second.to_owned(),
        }
    }
}

/// Distance cache key. The budget is part of the key, so a result pruned
/// under a strict budget is never reused for a looser one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DistanceKey {
    pub pair: PairKey,
    pub max_dist: usize,
}

impl DistanceKey {
    pub fn new(first: &str, second: &str, max_dist: usize) -> Self {
        Self {
            pair: PairKey::new(first, second),
            max_dist,
        }
    }
}

/// Overlap cache key, including the membership threshold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OverlapKey {
    pub pair: PairKey,
    threshold_bits: u64,
}

impl OverlapKey {
    pub fn new(first: &str, second: &str, threshold: f64) -> Self {
        Self {
            pair: PairKey::new(first, second),
            threshold_bits: threshold.to_bits(),
        }
    }

    pub fn threshold(&self) -> f64 {
        f64::from_bits(self.threshold_bits)
    }
}

/// Cache flavor selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CacheConfig {
    /// Grows without bound; fine for a bounded vocabulary of terms
    Unbounded {
        #[serde(default)]
        shards: Option<usize>,
    },
    /// Evicts least recently used entries once `capacity` is reached
    Bounded {
        #[serde(default)]
        shards: Option<usize>,
        capacity: NonZeroUsize,
    },
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig::Unbounded { shards: None }
    }
}

impl CacheConfig {
    /// Read cache settings from the environment.
    ///
    /// A positive `OCRFUZZ_CACHE_CAPACITY` selects the bounded variant.
    /// Unparseable values are logged and ignored.
    pub fn from_env() -> Self {
        let shards = read_env::<usize>(CACHE_SHARDS_ENV).filter(|&n| n > 0);
        match read_env::<usize>(CACHE_CAPACITY_ENV).and_then(NonZeroUsize::new) {
            Some(capacity) => CacheConfig::Bounded { shards, capacity },
            None => CacheConfig::Unbounded { shards },
        }
    }

    /// Shard count, defaulting to the available parallelism (capped at 16).
    pub fn shards(&self) -> usize {
        let requested = match self {
            CacheConfig::Unbounded { shards } | CacheConfig::Bounded { shards, .. } => *shards,
        };
        requested.unwrap_or_else(default_shards).max(1)
    }
}

fn default_shards() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get().min(16))
        .unwrap_or(8)
}

fn read_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = name, value = %raw, "ignoring malformed cache setting");
            None
        }
    }
}

/// A cache of either flavor, chosen at runtime from a [`CacheConfig`].
pub enum PairCache<K, V> {
    Sharded(ShardedCache<K, V>),
    Bounded(BoundedCache<K, V>),
}

impl<K, V> PairCache<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Clone + Send + Sync,
{
    pub fn from_config(config: &CacheConfig) -> Self {
        match *config {
            CacheConfig::Unbounded { .. } => {
                PairCache::Sharded(ShardedCache::with_shards(config.shards()))
            }
            CacheConfig::Bounded { capacity, .. } => {
                PairCache::Bounded(BoundedCache::with_shards(capacity, config.shards()))
            }
        }
    }
}

impl<K, V> ResultCache<K, V> for PairCache<K, V>
where
    K: Hash + Eq + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get_or_compute<F>(&self, key: K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self {
            PairCache::Sharded(cache) => cache.get_or_compute(key, compute),
            PairCache::Bounded(cache) => cache.get_or_compute(key, compute),
        }
    }

    fn len(&self) -> usize {
        match self {
            PairCache::Sharded(cache) => cache.len(),
            PairCache::Bounded(cache) => cache.len(),
        }
    }

    fn clear(&self) {
        match self {
            PairCache::Sharded(cache) => cache.clear(),
            PairCache::Bounded(cache) => cache.clear(),
        }
    }

    fn stats(&self) -> CacheStats {
        match self {
            PairCache::Sharded(cache) => cache.stats(),
            PairCache::Bounded(cache) => cache.stats(),
        }
    }
}
