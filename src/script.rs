//! Host integration: score scripts
//!
//! A search host discovers a script by name, hands it the user supplied
//! parameters and then calls it once per document. This module provides:
//!
//! - [`ScoreScript`]: the narrow capability a host depends on
//! - [`ScriptParams`]: parameter parsing with defaults and fail-fast errors
//! - [`ScriptKind`]: the registered script names
//! - [`LeafScript`]: per-segment instance applying the document window
//!
//! Nothing here changes the similarity itself; see [`crate::scorer`].

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{ConfigError, Result};
use crate::scorer::{MixedScorer, ScorerConfig};

const BOOST_EXPLANATION: &str =
    "Custom similarity score added with 1, then multiplied by original document score.";

/// Receiver for human readable score explanations.
pub trait Explain {
    fn explain(&mut self, message: &str);
}

impl Explain for String {
    fn explain(&mut self, message: &str) {
        self.clear();
        self.push_str(message);
    }
}

impl Explain for Vec<String> {
    fn explain(&mut self, message: &str) {
        self.push(message.to_owned());
    }
}

/// Per-document scoring capability.
pub trait ScoreScript: Send + Sync {
    /// Similarity of `candidate` to `term`.
    fn compute_score(&self, term: &str, candidate: &str) -> f64;

    /// Describe how scores are produced.
    fn explain(&self, sink: &mut dyn Explain);
}

impl ScoreScript for MixedScorer {
    fn compute_score(&self, term: &str, candidate: &str) -> f64 {
        self.score(term, candidate)
    }

    fn explain(&self, sink: &mut dyn Explain) {
        sink.explain("Custom similarity score based on Levenshtein and Jaccard.");
    }
}

/// Registered script names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScriptKind {
    /// `uq_levenshtein_score`: the similarity is the document score
    Similarity,
    /// `uq_score`: boosts the original score inside a document window
    WindowedBoost,
}

impl ScriptKind {
    pub const SIMILARITY_NAME: &'static str = "uq_levenshtein_score";
    pub const WINDOWED_NAME: &'static str = "uq_score";

    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            Self::SIMILARITY_NAME => Ok(ScriptKind::Similarity),
            Self::WINDOWED_NAME => Ok(ScriptKind::WindowedBoost),
            other => Err(ConfigError::UnknownScript(other.to_owned())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScriptKind::Similarity => Self::SIMILARITY_NAME,
            ScriptKind::WindowedBoost => Self::WINDOWED_NAME,
        }
    }

    /// Whether the host must supply the original relevance score.
    pub fn needs_score(&self) -> bool {
        matches!(self, ScriptKind::WindowedBoost)
    }
}

/// Parsed script parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptParams {
    /// Document field holding the candidate value
    pub field: String,
    pub term: String,
    pub alpha: f64,
    pub beta: f64,
    pub max_dist: usize,
    /// Number of documents scored after `from`; unbounded by default
    pub window_size: usize,
    /// 1-based position of the first scored document
    pub from: usize,
}

impl ScriptParams {
    /// Parse a host parameter map. `field` and `term` are required and kept
    /// verbatim; numeric parameters fall back to their defaults when absent.
    pub fn from_map<K, V>(params: &AHashMap<K, V>) -> Result<Self>
    where
        K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
        V: AsRef<str>,
    {
        let lookup = |name: &str| params.get(name).map(|v| v.as_ref());
        let required = |name: &str| {
            lookup(name)
                .map(str::to_owned)
                .ok_or_else(|| ConfigError::MissingParameter(name.to_owned()))
        };
        let defaults = ScorerConfig::default();

        Ok(Self {
            field: required("field")?,
            term: required("term")?,
            alpha: parse_or(lookup("alpha"), "alpha", defaults.alpha)?,
            beta: parse_or(lookup("beta"), "beta", defaults.beta)?,
            max_dist: parse_or(lookup("max_dist"), "max_dist", defaults.max_dist)?,
            window_size: parse_or(lookup("window_size"), "window_size", usize::MAX)?,
            from: parse_or(lookup("from"), "from", 0)?,
        })
    }

    /// Scorer configuration carrying these weights and budget.
    pub fn scorer_config(&self) -> ScorerConfig {
        ScorerConfig::default()
            .with_weights(self.alpha, self.beta)
            .with_max_dist(self.max_dist)
    }

    /// Whether the document at 1-based `position` gets the custom score.
    pub fn in_window(&self, position: usize) -> bool {
        position >= self.from && position < self.from.saturating_add(self.window_size)
    }
}

fn parse_or<T: std::str::FromStr>(raw: Option<&str>, name: &str, default: T) -> Result<T> {
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            name: name.to_owned(),
            value: value.to_owned(),
        }),
    }
}

/// A compiled script, shared by all segments of one search.
#[derive(Debug, Clone)]
pub struct CompiledScript {
    pub kind: ScriptKind,
    pub params: Arc<ScriptParams>,
    scorer: Arc<MixedScorer>,
}

impl CompiledScript {
    /// Resolve `name` and parse `params`, failing before any document is scored.
    pub fn compile<K, V>(
        name: &str,
        params: &AHashMap<K, V>,
        scorer: Arc<MixedScorer>,
    ) -> Result<Self>
    where
        K: std::borrow::Borrow<str> + std::hash::Hash + Eq,
        V: AsRef<str>,
    {
        let kind = ScriptKind::from_name(name).map_err(|err| {
            tracing::warn!(script = name, "unknown score script");
            err
        })?;
        let params = ScriptParams::from_map(params)?;
        tracing::debug!(
            script = kind.name(),
            field = %params.field,
            term = %params.term,
            "compiled score script"
        );
        Ok(Self {
            kind,
            params: Arc::new(params),
            scorer,
        })
    }

    /// New per-segment instance with a fresh document counter.
    pub fn leaf(&self) -> LeafScript {
        LeafScript {
            kind: self.kind,
            params: Arc::clone(&self.params),
            scorer: Arc::clone(&self.scorer),
            position: AtomicUsize::new(0),
        }
    }
}

/// Per-segment script instance.
#[derive(Debug)]
pub struct LeafScript {
    kind: ScriptKind,
    params: Arc<ScriptParams>,
    scorer: Arc<MixedScorer>,
    position: AtomicUsize,
}

impl LeafScript {
    /// Score one document.
    ///
    /// `field_value` is the first value of the configured field; a missing
    /// value scores as the empty string. `original_score` is only read by
    /// the windowed kind.
    pub fn execute(
        &self,
        field_value: Option<&str>,
        original_score: f64,
        explanation: Option<&mut dyn Explain>,
    ) -> f64 {
        let position = self.position.fetch_add(1, Ordering::Relaxed) + 1;
        let candidate = field_value.unwrap_or("");
        let params = &self.params;

        match self.kind {
            ScriptKind::Similarity => {
                let similarity = self.similarity(candidate);
                if let Some(sink) = explanation {
                    self.scorer.explain(sink);
                }
                similarity
            }
            ScriptKind::WindowedBoost => {
                if !params.in_window(position) {
                    return original_score;
                }
                let similarity = self.similarity(candidate);
                if let Some(sink) = explanation {
                    sink.explain(BOOST_EXPLANATION);
                }
                (1.0 + similarity) * original_score
            }
        }
    }

    /// Documents seen so far by this instance.
    pub fn position(&self) -> usize {
        self.position.load(Ordering::Relaxed)
    }

    fn similarity(&self, candidate: &str) -> f64 {
        let params = &self.params;
        self.scorer.mixed_similarity(
            &params.term,
            candidate,
            params.alpha,
            params.beta,
            params.max_dist,
        )
    }
}
