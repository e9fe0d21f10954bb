//! Similarity scoring over match results.
//!
//! The core fixes the two coverage fractions precisely; how they fold into
//! one number is caller policy, injected as a plain function. The stock
//! combiners cover the usual metric family: average, min, max, and the
//! Dice-style harmonic combination.

use crate::models::{MatchResult, SimilarityScore};

/// Derives normalized similarity from a [`MatchResult`].
///
/// Per side: `covered_non_boundary_tokens / total_non_boundary_tokens`.
/// The combined score is whatever the injected function makes of the pair.
#[derive(Debug, Clone)]
pub struct SimilarityScorer<F = fn(f64, f64) -> f64>
where
    F: Fn(f64, f64) -> f64,
{
    combine: F,
}

impl<F> SimilarityScorer<F>
where
    F: Fn(f64, f64) -> f64,
{
    pub fn new(combine: F) -> Self {
        Self { combine }
    }

    pub fn score(&self, result: &MatchResult) -> SimilarityScore {
        let covered = result.covered() as f64;
        let coverage_left = fraction(covered, result.left_content_len());
        let coverage_right = fraction(covered, result.right_content_len());
        SimilarityScore {
            coverage_left,
            coverage_right,
            combined: (self.combine)(coverage_left, coverage_right),
        }
    }
}

impl SimilarityScorer {
    /// Arithmetic mean of the two fractions.
    pub fn average() -> Self {
        Self::new(combine_average)
    }

    /// The smaller fraction: conservative, insensitive to size imbalance in
    /// the larger artifact.
    pub fn minimum() -> Self {
        Self::new(combine_minimum)
    }

    /// The larger fraction: flags containment of a small artifact inside a
    /// big one.
    pub fn maximum() -> Self {
        Self::new(combine_maximum)
    }

    /// Harmonic mean of the fractions, equal to the Dice coefficient
    /// `2 * covered / (total_left + total_right)` over token counts.
    pub fn harmonic() -> Self {
        Self::new(combine_harmonic)
    }
}

fn fraction(covered: f64, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        covered / total as f64
    }
}

fn combine_average(a: f64, b: f64) -> f64 {
    (a + b) / 2.0
}

fn combine_minimum(a: f64, b: f64) -> f64 {
    a.min(b)
}

fn combine_maximum(a: f64, b: f64) -> f64 {
    a.max(b)
}

fn combine_harmonic(a: f64, b: f64) -> f64 {
    if a + b == 0.0 {
        0.0
    } else {
        2.0 * a * b / (a + b)
    }
}
