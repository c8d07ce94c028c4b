//! Character confusion table
//!
//! Assigns a partial similarity weight to pairs of characters that are
//! commonly mistaken for each other by OCR engines or when typing
//! ("O" and "0", "I" and "1", "B" and "8", ...).
//!
//! The table is symmetric, every character is fully similar to itself and
//! any pair that was never registered has weight 0.0. Lookups for ASCII
//! pairs are a single array index.

use super::CharSimilarity;
use std::sync::LazyLock;

/// Number of characters covered by the dense lookup matrix.
const ASCII_RANGE: usize = 128;

/// Calibrated weights for visually or phonetically confusable pairs.
pub const STANDARD_CONFUSIONS: &[(char, char, f64)] = &[
    ('A', '4', 0.8),
    ('B', '8', 0.9),
    ('B', '3', 0.6),
    ('D', 'O', 0.8),
    ('D', '0', 0.8),
    ('E', '3', 0.7),
    ('G', '6', 0.8),
    ('C', 'G', 0.5),
    ('I', '1', 0.95),
    ('I', 'L', 0.6),
    ('O', '0', 0.9),
    ('O', 'Q', 0.7),
    ('S', '5', 0.9),
    ('Z', '2', 0.85),
    ('T', '7', 0.85),
    ('L', '1', 0.85),
    ('P', 'R', 0.6),
    ('U', 'V', 0.75),
    ('V', 'Y', 0.5),
    ('M', 'N', 0.45),
    ('K', 'X', 0.5),
];

static STANDARD: LazyLock<ConfusionTable> = LazyLock::new(|| {
    STANDARD_CONFUSIONS
        .iter()
        .fold(ConfusionTable::builder(), |builder, &(a, b, w)| {
            builder.pair(a, b, w)
        })
        .build()
});

/// Symmetric per-character-pair similarity weights.
///
/// Immutable once built; share it by reference across threads.
#[derive(Clone, PartialEq)]
pub struct ConfusionTable {
    weights: Box<[[f64; ASCII_RANGE]; ASCII_RANGE]>,
    len: usize,
}

impl ConfusionTable {
    /// The calibrated table used by default everywhere in the crate.
    #[must_use]
    pub fn standard() -> &'static ConfusionTable {
        &STANDARD
    }

    /// A table with no registered pairs: only identical characters match.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            weights: Box::new([[0.0; ASCII_RANGE]; ASCII_RANGE]),
            len: 0,
        }
    }

    #[must_use]
    pub fn builder() -> ConfusionTableBuilder {
        ConfusionTableBuilder {
            table: Self::empty(),
        }
    }

    /// Weight of the pair, in `[0.0, 1.0]`.
    #[inline]
    #[must_use]
    pub fn similarity(&self, a: char, b: char) -> f64 {
        if a == b {
            return 1.0;
        }
        match (ascii_index(a), ascii_index(b)) {
            (Some(i), Some(j)) => self.weights[i][j],
            _ => 0.0,
        }
    }

    /// Number of registered unordered pairs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Registered pairs as `(a, b, weight)` with `a < b`.
    pub fn pairs(&self) -> impl Iterator<Item = (char, char, f64)> + '_ {
        (0..ASCII_RANGE).flat_map(move |i| {
            ((i + 1)..ASCII_RANGE).filter_map(move |j| {
                let w = self.weights[i][j];
                (w > 0.0).then(|| (i as u8 as char, j as u8 as char, w))
            })
        })
    }
}

impl Default for ConfusionTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

impl std::fmt::Debug for ConfusionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfusionTable")
            .field("pairs", &self.len)
            .finish()
    }
}

impl CharSimilarity for ConfusionTable {
    #[inline]
    fn char_similarity(&self, a: char, b: char) -> f64 {
        self.similarity(a, b)
    }
}

/// Builder for custom confusion tables.
#[derive(Debug, Clone)]
pub struct ConfusionTableBuilder {
    table: ConfusionTable,
}

impl ConfusionTableBuilder {
    /// Register a symmetric pair. Weights are clamped into `[0.0, 1.0]`.
    ///
    /// Identical characters and non-ASCII characters are ignored: the former
    /// always have weight 1.0, the latter only ever match themselves.
    #[must_use]
    pub fn pair(mut self, a: char, b: char, weight: f64) -> Self {
        if a == b {
            return self;
        }
        let (Some(i), Some(j)) = (ascii_index(a), ascii_index(b)) else {
            tracing::warn!(?a, ?b, "ignoring non-ASCII confusion pair");
            return self;
        };
        let weight = if weight.is_nan() { 0.0 } else { weight.clamp(0.0, 1.0) };
        let was_set = self.table.weights[i][j] > 0.0;
        self.table.weights[i][j] = weight;
        self.table.weights[j][i] = weight;
        match (was_set, weight > 0.0) {
            (false, true) => self.table.len += 1,
            (true, false) => self.table.len -= 1,
            _ => {}
        }
        self
    }

    #[must_use]
    pub fn build(self) -> ConfusionTable {
        self.table
    }
}

#[inline]
fn ascii_index(c: char) -> Option<usize> {
    let idx = c as usize;
    (idx < ASCII_RANGE).then_some(idx)
}
