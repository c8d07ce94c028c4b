//! Confusion-aware Damerau-Levenshtein distance
//!
//! Optimal string alignment (restricted Damerau-Levenshtein) where the cost of
//! substituting one character for another is `1 - similarity(a, b)`. Confusable
//! characters are therefore cheaper to swap than unrelated ones, identical ones
//! are free. Insertion, deletion and adjacent transposition cost 1.
//!
//! Distances are real-valued and bounded by a budget (`max_dist`). Anything
//! over budget is reported as `None` / `f64::INFINITY`.

use super::{CharSimilarity, ConfusionTable};
use smallvec::SmallVec;

/// Confusion-aware Damerau-Levenshtein calculator with a fixed budget.
///
/// # Complexity
/// - Time: O(m*n), usually much less thanks to row pruning
/// - Space: O(n), three rows
#[derive(Debug, Clone, Copy)]
pub struct ConfusionDamerau<'t> {
    /// Largest distance still considered related
    pub max_distance: usize,
    table: &'t ConfusionTable,
}

impl ConfusionDamerau<'static> {
    #[must_use]
    pub fn new(max_distance: usize) -> Self {
        Self::with_table(max_distance, ConfusionTable::standard())
    }
}

impl<'t> ConfusionDamerau<'t> {
    #[must_use]
    pub fn with_table(max_distance: usize, table: &'t ConfusionTable) -> Self {
        Self {
            max_distance,
            table,
        }
    }

    /// Distance, or `f64::INFINITY` when it exceeds `max_distance`.
    #[must_use]
    pub fn distance(&self, a: &str, b: &str) -> f64 {
        confusion_damerau(a, b, self.max_distance, self.table)
    }

    /// Distance with Option semantics, `None` when over budget.
    #[must_use]
    pub fn compute(&self, a: &str, b: &str) -> Option<f64> {
        confusion_damerau_bounded(a, b, self.max_distance, self.table)
    }

    /// `1 / (1 + distance)`, 0.0 when over budget.
    #[must_use]
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        distance_to_similarity(self.distance(a, b))
    }
}

/// Convert a budgeted distance into a similarity in `[0.0, 1.0]`.
///
/// An infinite distance maps to exactly 0.0.
#[inline]
#[must_use]
pub fn distance_to_similarity(distance: f64) -> f64 {
    if distance.is_infinite() {
        0.0
    } else {
        1.0 / (1.0 + distance)
    }
}

/// Confusion-aware distance, `f64::INFINITY` when it exceeds `max_dist`.
#[inline]
#[must_use]
pub fn confusion_damerau<S: CharSimilarity>(a: &str, b: &str, max_dist: usize, sim: S) -> f64 {
    confusion_damerau_bounded(a, b, max_dist, sim).unwrap_or(f64::INFINITY)
}

/// Confusion-aware optimal string alignment distance.
///
/// Returns `None` when the distance exceeds `max_dist`, either because the
/// length difference alone is over budget or because a whole DP row went over
/// budget (no prefix alignment can recover from that).
#[must_use]
pub fn confusion_damerau_bounded<S: CharSimilarity>(
    a: &str,
    b: &str,
    max_dist: usize,
    sim: S,
) -> Option<f64> {
    if a == b {
        return Some(0.0);
    }

    let a_chars: SmallVec<[char; 64]> = a.chars().collect();
    let b_chars: SmallVec<[char; 64]> = b.chars().collect();

    let m = a_chars.len();
    let n = b_chars.len();
    let budget = max_dist as f64;

    if m.abs_diff(n) > max_dist {
        return None;
    }

    let mut prev2_row: SmallVec<[f64; 64]> = smallvec::smallvec![0.0; n + 1];
    let mut prev_row: SmallVec<[f64; 64]> = (0..=n).map(|j| j as f64).collect();
    let mut curr_row: SmallVec<[f64; 64]> = smallvec::smallvec![0.0; n + 1];

    for i in 1..=m {
        curr_row[0] = i as f64;
        let mut row_min = curr_row[0];

        for j in 1..=n {
            let cost = 1.0 - sim.char_similarity(a_chars[i - 1], b_chars[j - 1]);

            let mut cell = (prev_row[j] + 1.0) // deletion
                .min(curr_row[j - 1] + 1.0) // insertion
                .min(prev_row[j - 1] + cost); // substitution

            if i > 1
                && j > 1
                && a_chars[i - 1] == b_chars[j - 2]
                && a_chars[i - 2] == b_chars[j - 1]
            {
                cell = cell.min(prev2_row[j - 2] + 1.0);
            }

            curr_row[j] = cell;
            row_min = row_min.min(cell);
        }

        if row_min > budget {
            tracing::trace!(row = i, row_min, max_dist, "edit distance pruned");
            return None;
        }

        std::mem::swap(&mut prev2_row, &mut prev_row);
        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    let distance = prev_row[n];
    (distance <= budget).then_some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::ExactMatch;

    fn standard(a: &str, b: &str, max_dist: usize) -> f64 {
        confusion_damerau(a, b, max_dist, ConfusionTable::standard())
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_identical_is_zero() {
        for k in [0, 1, 5] {
            assert_eq!(standard("", "", k), 0.0);
            assert_eq!(standard("HELLO", "HELLO", k), 0.0);
            assert_eq!(standard("O0O0", "O0O0", k), 0.0);
        }
    }

    #[test]
    fn test_classic_kitten_sitting() {
        assert_eq!(confusion_damerau("kitten", "sitting", 5, ExactMatch), 3.0);
        assert_eq!(standard("kitten", "sitting", 5), 3.0);
        assert_eq!(standard("kitten", "sitting", 3), 3.0);
        assert!(standard("kitten", "sitting", 2).is_infinite());
    }

    #[test]
    fn test_confusable_substitution_is_cheap() {
        assert!(approx(standard("HELLO", "HELL0", 3), 0.1));
        assert!(approx(standard("I", "1", 1), 0.05));
        assert!(approx(standard("M", "N", 1), 0.55));
        assert!(approx(standard("B0B", "8OB", 3), 0.2));
        // Unrelated substitution still costs a full edit
        assert_eq!(standard("HELLO", "HELLX", 3), 1.0);
    }

    #[test]
    fn test_transposition() {
        assert_eq!(standard("ab", "ba", 2), 1.0);
        assert_eq!(standard("abc", "acb", 2), 1.0);
        assert_eq!(standard("ca", "ac", 1), 1.0);
    }

    #[test]
    fn test_length_difference_prunes() {
        assert!(standard("ABCDEF", "AB", 3).is_infinite());
        assert!(standard("", "ABCD", 3).is_infinite());
        assert_eq!(standard("", "ABC", 3), 3.0);
        assert_eq!(standard("AB", "", 2), 2.0);
    }

    #[test]
    fn test_row_pruning() {
        assert!(standard("ABC", "XYZ", 0).is_infinite());
        assert!(standard("abcdef", "ghijkl", 3).is_infinite());
        assert_eq!(
            confusion_damerau_bounded("abcdef", "ghijkl", 3, ConfusionTable::standard()),
            None
        );
        assert_eq!(
            confusion_damerau_bounded("abc", "acb", 2, ConfusionTable::standard()),
            Some(1.0)
        );
    }

    #[test]
    fn test_transposition_reads_two_rows_up() {
        // Two independent swaps, each costing 1
        assert_eq!(standard("abcd", "badc", 2), 2.0);
        // Deleting every character stays within budget from either side
        assert_eq!(standard("AB", "", 2), standard("", "AB", 2));
        assert_eq!(standard("AB", "", 1), f64::INFINITY);
    }

    #[test]
    fn test_value_symmetry() {
        let pairs = [
            ("kitten", "sitting"),
            ("B00K", "BOOK"),
            ("PR1ZE", "PRIZE"),
            ("abcd", "badc"),
            ("", "ab"),
            ("MNOP", "NMQ0"),
        ];
        for (a, b) in pairs {
            for k in 0..5 {
                let ab = standard(a, b, k);
                let ba = standard(b, a, k);
                assert!(ab == ba || approx(ab, ba), "{a} vs {b} at {k}: {ab} != {ba}");
            }
        }
    }

    #[test]
    fn test_non_ascii_input() {
        assert_eq!(standard("café", "cafe", 1), 1.0);
        assert_eq!(standard("日本", "日本", 0), 0.0);
    }

    #[test]
    fn test_struct_and_similarity() {
        let dl = ConfusionDamerau::new(2);
        assert_eq!(dl.compute("abc", "acb"), Some(1.0));
        assert_eq!(dl.compute("abc", "xyz"), None);
        assert_eq!(dl.similarity("abc", "abc"), 1.0);
        assert_eq!(dl.similarity("abc", "acb"), 0.5);
        assert_eq!(dl.similarity("abc", "xyz"), 0.0);

        let exact = ConfusionTable::empty();
        let strict = ConfusionDamerau::with_table(3, &exact);
        assert_eq!(strict.distance("HELLO", "HELL0"), 1.0);
    }

    #[test]
    fn test_distance_to_similarity() {
        assert_eq!(distance_to_similarity(0.0), 1.0);
        assert_eq!(distance_to_similarity(1.0), 0.5);
        assert_eq!(distance_to_similarity(f64::INFINITY), 0.0);
    }
}
