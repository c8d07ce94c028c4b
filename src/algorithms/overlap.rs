//! Confusion-aware character set overlap
//!
//! A Jaccard-style score over the distinct characters of two strings where
//! confusable characters count as partial matches.
//!
//! The soft intersection sums the similarity of every character pair (one from
//! each set) whose similarity exceeds the threshold. A single character may
//! match several characters of the other set, so the soft intersection can
//! exceed the true overlap. The union is `|A| + |B| - floor(soft)`.

use super::{CharSimilarity, ConfusionTable};
use smallvec::SmallVec;

/// Similarity cutoff used by the combined scoring pipeline.
pub const DEFAULT_OVERLAP_THRESHOLD: f64 = 0.5;

type CharSet = SmallVec<[char; 32]>;

/// Soft Jaccard calculator with a fixed membership threshold.
#[derive(Debug, Clone, Copy)]
pub struct SoftJaccard<'t> {
    /// Pairs at or below this similarity do not contribute
    pub threshold: f64,
    table: &'t ConfusionTable,
}

impl Default for SoftJaccard<'static> {
    fn default() -> Self {
        Self::new(DEFAULT_OVERLAP_THRESHOLD)
    }
}

impl SoftJaccard<'static> {
    #[must_use]
    pub fn new(threshold: f64) -> Self {
        Self::with_table(threshold, ConfusionTable::standard())
    }
}

impl<'t> SoftJaccard<'t> {
    #[must_use]
    pub fn with_table(threshold: f64, table: &'t ConfusionTable) -> Self {
        Self { threshold, table }
    }

    #[must_use]
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        soft_jaccard(a, b, self.threshold, self.table)
    }
}

/// Distinct characters in sorted order.
///
/// Sorting keeps the floating point summation order independent of hashing.
fn char_set(s: &str) -> CharSet {
    let mut set: CharSet = s.chars().collect();
    set.sort_unstable();
    set.dedup();
    set
}

fn soft_intersection_of<S: CharSimilarity>(a: &[char], b: &[char], threshold: f64, sim: &S) -> f64 {
    a.iter()
        .flat_map(|&x| b.iter().map(move |&y| sim.char_similarity(x, y)))
        .filter(|&s| s > threshold)
        .sum()
}

/// Sum of pairwise similarities above `threshold` between the distinct
/// characters of `a` and `b`.
#[must_use]
pub fn soft_intersection<S: CharSimilarity>(a: &str, b: &str, threshold: f64, sim: S) -> f64 {
    soft_intersection_of(&char_set(a), &char_set(b), threshold, &sim)
}

/// Confusion-aware Jaccard overlap in `[0.0, 1.0]`.
///
/// Empty input, no pair above the threshold or a zero union yields 0.0.
/// When overcounting drives the union negative or the ratio above 1, the
/// score saturates at 1.0.
#[must_use]
pub fn soft_jaccard<S: CharSimilarity>(a: &str, b: &str, threshold: f64, sim: S) -> f64 {
    let set_a = char_set(a);
    let set_b = char_set(b);

    let intersection = soft_intersection_of(&set_a, &set_b, threshold, &sim);
    if intersection <= 0.0 {
        return 0.0;
    }

    // Truncated on purpose: the union subtracts whole matches only
    let union = (set_a.len() + set_b.len()) as i64 - intersection.trunc() as i64;
    if union == 0 {
        return 0.0;
    }
    if union < 0 {
        return 1.0;
    }

    (intersection / union as f64).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ExactMatch;

    fn standard(a: &str, b: &str) -> f64 {
        soft_jaccard(a, b, DEFAULT_OVERLAP_THRESHOLD, ConfusionTable::standard())
    }

    #[test]
    fn test_empty() {
        assert_eq!(standard("", ""), 0.0);
        assert_eq!(standard("abc", ""), 0.0);
        assert_eq!(standard("", "abc"), 0.0);
    }

    #[test]
    fn test_exact_sets() {
        assert_eq!(soft_jaccard("abc", "abc", 0.5, ExactMatch), 1.0);
        // {a,b,c} vs {b,c,d}: 2 / (3 + 3 - 2)
        assert_eq!(soft_jaccard("abc", "bcd", 0.5, ExactMatch), 0.5);
        // Duplicates collapse
        assert_eq!(soft_jaccard("aabbcc", "abc", 0.5, ExactMatch), 1.0);
        assert_eq!(soft_jaccard("abc", "xyz", 0.5, ExactMatch), 0.0);
    }

    #[test]
    fn test_confusable_partial_match() {
        // {H,E,L,O} vs {H,E,L,0}: 3 exact + O/0 at 0.9 = 3.9, union 8 - 3 = 5
        let score = standard("HELLO", "HELL0");
        assert!((score - 3.9 / 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_threshold_is_strict() {
        // C/G weighs exactly 0.5 and does not pass the default cutoff
        assert_eq!(soft_intersection("C", "G", 0.5, ConfusionTable::standard()), 0.0);
        assert_eq!(soft_intersection("C", "G", 0.4, ConfusionTable::standard()), 0.5);
        // M/N weighs 0.45
        assert_eq!(standard("M", "N"), 0.0);
    }

    #[test]
    fn test_overcounting_is_kept() {
        // B matches B, 8 and 3: 1.0 + 0.9 + 0.6
        let inter = soft_intersection("B", "B83", 0.5, ConfusionTable::standard());
        assert!((inter - 2.5).abs() < 1e-9);
        // Raw ratio would be 2.5 / 2; bounded to 1.0
        assert_eq!(standard("B", "B83"), 1.0);
    }

    #[test]
    fn test_self_overlap_saturates() {
        assert_eq!(standard("O0", "O0"), 1.0);
        // Overcounting drives the union below zero here
        assert_eq!(standard("O0DQ", "O0DQ"), 1.0);
    }

    #[test]
    fn test_zero_union_scores_zero() {
        // {0,D,O} vs {0,O}: 1.9 + 1.6 + 1.9 = 5.4, union 5 - 5 = 0
        let inter = soft_intersection("O0D", "O0", 0.5, ConfusionTable::standard());
        assert!((inter - 5.4).abs() < 1e-9);
        assert_eq!(standard("O0D", "O0"), 0.0);
    }

    #[test]
    fn test_bounded() {
        let inputs = ["B00K", "BOOK", "8OOK", "S5Z2", "I1L", "QWERTY", "a", "ZZZ"];
        for a in inputs {
            for b in inputs {
                let score = standard(a, b);
                assert!((0.0..=1.0).contains(&score), "{a} vs {b}: {score}");
            }
        }
    }

    #[test]
    fn test_struct() {
        let jaccard = SoftJaccard::default();
        assert_eq!(jaccard.threshold, DEFAULT_OVERLAP_THRESHOLD);
        assert_eq!(jaccard.similarity("abc", "abc"), 1.0);

        let exact = ConfusionTable::empty();
        let strict = SoftJaccard::with_table(0.5, &exact);
        assert_eq!(strict.similarity("O", "0"), 0.0);
    }
}
