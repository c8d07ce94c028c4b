//! ocrfuzz - Confusion-aware fuzzy similarity scoring
//!
//! Scores how similar a query term is to a candidate value while tolerating
//! common OCR and typing confusions ("O"/"0", "I"/"1", "B"/"8", ...). Meant
//! to be called once per candidate during a ranking pass, from many threads.
//!
//! # Features
//! - Calibrated, symmetric character confusion table
//! - Confusion-aware Damerau-Levenshtein distance with budget pruning
//! - Confusion-aware Jaccard overlap over character sets
//! - Sharded memoization (unbounded or LRU-bounded)
//! - Host-facing score scripts with parameter parsing and document windows
//!
//! # Example
//!
//! ```
//! use ocrfuzz::{MixedScorer, ScorerConfig};
//!
//! let scorer = MixedScorer::new(ScorerConfig::default());
//! let close = scorer.mixed_similarity("B00K", "BOOK", 0.5, 0.5, 3);
//! let far = scorer.mixed_similarity("B00K", "LAMP", 0.5, 0.5, 3);
//! assert!(close > far);
//! ```

pub mod algorithms;
pub mod cache;
pub mod error;
pub mod scorer;
pub mod script;

pub use algorithms::{
    confusion_damerau, confusion_damerau_bounded, soft_jaccard, CharSimilarity, ConfusionDamerau,
    ConfusionTable, SoftJaccard, DEFAULT_OVERLAP_THRESHOLD,
};
pub use cache::{BoundedCache, CacheConfig, CacheStats, ResultCache, ShardedCache};
pub use error::ConfigError;
pub use scorer::{MixedScorer, ScoredCandidate, ScorerConfig, ScorerStats};
pub use script::{CompiledScript, Explain, LeafScript, ScoreScript, ScriptKind, ScriptParams};
