//! Confusion-aware string similarity algorithms
//!
//! Each algorithm is a standalone function parameterized by a character
//! similarity source, so the calibrated table can be swapped for a custom one.

pub mod confusion;
pub mod damerau;
pub mod overlap;

pub use confusion::*;
pub use damerau::*;
pub use overlap::*;

/// Per-character similarity source.
///
/// Implementations must be symmetric, return 1.0 for identical characters
/// and stay within `[0.0, 1.0]`.
pub trait CharSimilarity: Send + Sync {
    fn char_similarity(&self, a: char, b: char) -> f64;
}

impl<T: CharSimilarity + ?Sized> CharSimilarity for &T {
    #[inline]
    fn char_similarity(&self, a: char, b: char) -> f64 {
        (**self).char_similarity(a, b)
    }
}

/// Exact character equality, no confusions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExactMatch;

impl CharSimilarity for ExactMatch {
    #[inline]
    fn char_similarity(&self, a: char, b: char) -> f64 {
        if a == b {
            1.0
        } else {
            0.0
        }
    }
}
