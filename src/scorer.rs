//! Combined confusion-aware similarity score
//!
//! `MixedScorer` blends the budgeted edit distance and the soft character
//! overlap of two strings into a single weighted value:
//!
//! ```text
//! d = distance(term, candidate, max_dist)
//! d = inf  ->  0.0
//! else     ->  alpha * 1 / (1 + d) + beta * overlap(term, candidate)
//! ```
//!
//! Both metrics are memoized in caches owned by the scorer. Share one scorer
//! (behind an `Arc` or a `&`) between all threads scoring against it.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::algorithms::{
    confusion_damerau, distance_to_similarity, soft_jaccard, ConfusionTable,
    DEFAULT_OVERLAP_THRESHOLD,
};
use crate::cache::{CacheConfig, CacheStats, DistanceKey, OverlapKey, PairCache, ResultCache};

/// Minimum batch size for parallel scoring.
///
/// Below this, thread pool coordination costs more than it saves.
const PARALLEL_THRESHOLD: usize = 100;

/// Scoring parameters and cache settings.
///
/// Weights and the distance budget are used as given. `alpha + beta = 1`
/// keeps scores in `[0, 1]` but is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Weight of the edit distance similarity
    pub alpha: f64,
    /// Weight of the character overlap similarity
    pub beta: f64,
    /// Largest edit distance still considered related
    pub max_dist: usize,
    /// Character pairs must be more similar than this to overlap
    pub overlap_threshold: f64,
    pub cache: CacheConfig,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.5,
            max_dist: 3,
            overlap_threshold: DEFAULT_OVERLAP_THRESHOLD,
            cache: CacheConfig::default(),
        }
    }
}

impl ScorerConfig {
    #[must_use]
    pub fn with_weights(mut self, alpha: f64, beta: f64) -> Self {
        self.alpha = alpha;
        self.beta = beta;
        self
    }

    #[must_use]
    pub fn with_max_dist(mut self, max_dist: usize) -> Self {
        self.max_dist = max_dist;
        self
    }

    #[must_use]
    pub fn with_overlap_threshold(mut self, threshold: f64) -> Self {
        self.overlap_threshold = threshold;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: CacheConfig) -> Self {
        self.cache = cache;
        self
    }
}

/// A scored candidate from a batch.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    /// Position of the candidate in the input batch
    pub id: usize,
    pub text: String,
    pub score: f64,
}

/// Cache statistics for both memoized metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScorerStats {
    pub distance: CacheStats,
    pub overlap: CacheStats,
}

/// Confusion-aware mixed similarity with memoized metrics.
pub struct MixedScorer {
    config: ScorerConfig,
    table: Arc<ConfusionTable>,
    distances: PairCache<DistanceKey, f64>,
    overlaps: PairCache<OverlapKey, f64>,
}

impl MixedScorer {
    /// Scorer using the calibrated confusion table.
    pub fn new(config: ScorerConfig) -> Self {
        Self::with_table(config, Arc::new(ConfusionTable::default()))
    }

    pub fn with_table(config: ScorerConfig, table: Arc<ConfusionTable>) -> Self {
        tracing::debug!(
            alpha = config.alpha,
            beta = config.beta,
            max_dist = config.max_dist,
            cache = ?config.cache,
            confusions = table.len(),
            "creating mixed scorer"
        );
        Self {
            distances: PairCache::from_config(&config.cache),
            overlaps: PairCache::from_config(&config.cache),
            config,
            table,
        }
    }

    pub fn config(&self) -> &ScorerConfig {
        &self.config
    }

    pub fn table(&self) -> &ConfusionTable {
        &self.table
    }

    /// Memoized edit distance, `f64::INFINITY` when over `max_dist`.
    pub fn distance(&self, term: &str, candidate: &str, max_dist: usize) -> f64 {
        let key = DistanceKey::new(term, candidate, max_dist);
        self.distances.get_or_compute(key, || {
            tracing::trace!(term, candidate, max_dist, "computing edit distance");
            confusion_damerau(term, candidate, max_dist, &*self.table)
        })
    }

    /// Memoized soft character overlap in `[0, 1]`.
    pub fn overlap(&self, term: &str, candidate: &str, threshold: f64) -> f64 {
        let key = OverlapKey::new(term, candidate, threshold);
        self.overlaps.get_or_compute(key, || {
            tracing::trace!(term, candidate, threshold, "computing overlap");
            soft_jaccard(term, candidate, threshold, &*self.table)
        })
    }

    /// `alpha * editSim + beta * overlapSim`, or 0.0 when the edit distance
    /// exceeds `max_dist`. The overlap is not computed in that case.
    pub fn mixed_similarity(
        &self,
        term: &str,
        candidate: &str,
        alpha: f64,
        beta: f64,
        max_dist: usize,
    ) -> f64 {
        let distance = self.distance(term, candidate, max_dist);
        if distance.is_infinite() {
            return 0.0;
        }

        let edit_sim = distance_to_similarity(distance);
        let overlap_sim = self.overlap(term, candidate, self.config.overlap_threshold);

        alpha * edit_sim + beta * overlap_sim
    }

    /// Mixed similarity with the configured weights and budget.
    pub fn score(&self, term: &str, candidate: &str) -> f64 {
        self.mixed_similarity(
            term,
            candidate,
            self.config.alpha,
            self.config.beta,
            self.config.max_dist,
        )
    }

    /// Score every candidate against `term`, preserving input order.
    ///
    /// Runs in parallel for batches of at least 100 candidates.
    pub fn score_batch<S>(&self, term: &str, candidates: &[S]) -> Vec<ScoredCandidate>
    where
        S: AsRef<str> + Sync,
    {
        let score_one = |(id, candidate): (usize, &S)| {
            let text = candidate.as_ref();
            ScoredCandidate {
                id,
                text: text.to_owned(),
                score: self.score(term, text),
            }
        };

        if candidates.len() >= PARALLEL_THRESHOLD {
            candidates.par_iter().enumerate().map(score_one).collect()
        } else {
            candidates.iter().enumerate().map(score_one).collect()
        }
    }

    pub fn stats(&self) -> ScorerStats {
        ScorerStats {
            distance: self.distances.stats(),
            overlap: self.overlaps.stats(),
        }
    }

    /// Empty both caches.
    pub fn clear_caches(&self) {
        self.distances.clear();
        self.overlaps.clear();
    }
}

impl Default for MixedScorer {
    fn default() -> Self {
        Self::new(ScorerConfig::default())
    }
}

impl std::fmt::Debug for MixedScorer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MixedScorer")
            .field("config", &self.config)
            .field("table", &self.table)
            .field("stats", &self.stats())
            .finish()
    }
}
