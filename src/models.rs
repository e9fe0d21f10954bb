//! Data structures for the tokentile similarity pipeline.

use serde::{Deserialize, Serialize};

/// Reserved token code marking the boundary between concatenated units.
///
/// The loader rejects this value in real token streams, so inside the matcher
/// it is unambiguous: a token with this code separates sub-units and never
/// participates in a match.
pub const BOUNDARY_CODE: u32 = u32::MAX;

/// A single token: an integer type-code plus source provenance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// Language-specific type code assigned by the tokenizing frontend.
    pub code: u32,
    /// Index of the unit (file) this token came from.
    pub unit: u32,
    /// 1-based line in the originating unit (0 if unknown).
    pub line: u32,
    /// 0-based column in the originating unit (0 if unknown).
    pub column: u32,
}

impl Token {
    pub fn new(code: u32, unit: u32, line: u32, column: u32) -> Self {
        Self {
            code,
            unit,
            line,
            column,
        }
    }

    /// A unit separator attributed to the unit it terminates.
    pub fn boundary(unit: u32) -> Self {
        Self {
            code: BOUNDARY_CODE,
            unit,
            line: 0,
            column: 0,
        }
    }

    pub fn is_boundary(&self) -> bool {
        self.code == BOUNDARY_CODE
    }
}

/// An ordered token stream for one artifact (or the concatenation of an
/// artifact's sub-units, separated by boundary tokens).
///
/// Immutable for the duration of a comparison.
#[derive(Debug, Clone)]
pub struct TokenSequence {
    name: String,
    tokens: Vec<Token>,
}

impl TokenSequence {
    pub fn new(name: impl Into<String>, tokens: Vec<Token>) -> Self {
        Self {
            name: name.into(),
            tokens,
        }
    }

    /// Build a sequence from bare codes, all attributed to a single unit.
    ///
    /// Codes equal to [`BOUNDARY_CODE`] become boundary tokens, so fixtures
    /// can spell out separator positions literally.
    pub fn from_codes(name: impl Into<String>, codes: &[u32]) -> Self {
        let tokens = codes
            .iter()
            .enumerate()
            .map(|(i, &code)| {
                if code == BOUNDARY_CODE {
                    Token::boundary(0)
                } else {
                    Token::new(code, 0, i as u32 + 1, 0)
                }
            })
            .collect();
        Self {
            name: name.into(),
            tokens,
        }
    }

    /// Build a sequence from per-unit code lists, inserting a boundary token
    /// between consecutive units.
    pub fn from_units(name: impl Into<String>, units: &[Vec<u32>]) -> Self {
        let mut tokens = Vec::new();
        for (u, codes) in units.iter().enumerate() {
            if u > 0 {
                tokens.push(Token::boundary(u as u32 - 1));
            }
            for (i, &code) in codes.iter().enumerate() {
                tokens.push(Token::new(code, u as u32, i as u32 + 1, 0));
            }
        }
        Self {
            name: name.into(),
            tokens,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Number of non-boundary tokens; the denominator of coverage fractions.
    pub fn content_len(&self) -> usize {
        self.tokens.iter().filter(|t| !t.is_boundary()).count()
    }

    /// Number of units in the stream (separators + 1 for a non-empty stream).
    pub fn unit_count(&self) -> usize {
        if self.tokens.is_empty() {
            return 0;
        }
        self.tokens.iter().filter(|t| t.is_boundary()).count() + 1
    }
}

/// A maximal run of pairwise-equal, non-boundary tokens shared by both
/// sequences: starting positions on each side plus the common length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub left: usize,
    pub right: usize,
    pub len: usize,
}

impl Tile {
    pub fn new(left: usize, right: usize, len: usize) -> Self {
        Self { left, right, len }
    }
}

/// The immutable outcome of one comparison: tiles in discovery order
/// (longest first, ties broken by earliest left position then earliest right
/// position) plus the non-boundary totals of both sequences, captured so
/// scoring needs nothing beyond this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    tiles: Vec<Tile>,
    left_content_len: usize,
    right_content_len: usize,
}

impl MatchResult {
    pub(crate) fn new(tiles: Vec<Tile>, left_content_len: usize, right_content_len: usize) -> Self {
        Self {
            tiles,
            left_content_len,
            right_content_len,
        }
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Total tokens covered by tiles. Identical for both sides: every tile
    /// consumes `len` positions in each sequence.
    pub fn covered(&self) -> usize {
        self.tiles.iter().map(|t| t.len).sum()
    }

    pub fn left_content_len(&self) -> usize {
        self.left_content_len
    }

    pub fn right_content_len(&self) -> usize {
        self.right_content_len
    }
}

impl<'a> IntoIterator for &'a MatchResult {
    type Item = &'a Tile;
    type IntoIter = std::slice::Iter<'a, Tile>;

    fn into_iter(self) -> Self::IntoIter {
        self.tiles.iter()
    }
}

/// Matcher configuration.
///
/// There is no `Default`: the minimum match length is a required parameter
/// with no baked-in value, so construction always names it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Shortest run of equal tokens that qualifies as a tile. Must be >= 1.
    pub min_match_length: usize,
    /// Run the scan phase of each round on the rayon pool. The commit phase
    /// stays single-threaded; results are identical either way.
    pub parallel_scan: bool,
}

impl MatcherConfig {
    pub fn new(min_match_length: usize) -> Self {
        Self {
            min_match_length,
            parallel_scan: false,
        }
    }

    pub fn with_parallel_scan(mut self, parallel_scan: bool) -> Self {
        self.parallel_scan = parallel_scan;
        self
    }
}

/// Normalized similarity derived from a [`MatchResult`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimilarityScore {
    /// Fraction of the left sequence's non-boundary tokens covered by tiles.
    pub coverage_left: f64,
    /// Fraction of the right sequence's non-boundary tokens covered by tiles.
    pub coverage_right: f64,
    /// The two fractions folded by the caller-chosen combination.
    pub combined: f64,
}

/// Per-side artifact description embedded in reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactInfo {
    pub name: String,
    pub token_count: usize,
    pub unit_count: usize,
}

impl ArtifactInfo {
    pub fn from_sequence(sequence: &TokenSequence) -> Self {
        Self {
            name: sequence.name().to_string(),
            token_count: sequence.content_len(),
            unit_count: sequence.unit_count(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub tile_count: usize,
    pub covered_tokens: usize,
    pub longest_tile: usize,
}

/// Serializable outcome of one pairwise comparison.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub version: String,
    pub config: MatcherConfig,
    pub left: ArtifactInfo,
    pub right: ArtifactInfo,
    pub summary: ReportSummary,
    pub score: SimilarityScore,
    pub tiles: Vec<Tile>,
}

/// Serializable outcome of an all-pairs batch run.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchReport {
    pub version: String,
    pub config: MatcherConfig,
    pub submission_count: usize,
    pub pair_count: usize,
    pub comparisons: Vec<ComparisonReport>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_len_excludes_boundaries() {
        let seq = TokenSequence::from_codes("a", &[1, 2, BOUNDARY_CODE, 3]);
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.content_len(), 3);
    }

    #[test]
    fn from_units_inserts_separators() {
        let seq = TokenSequence::from_units("a", &[vec![1, 2], vec![3], vec![4]]);
        let codes: Vec<u32> = seq.tokens().iter().map(|t| t.code).collect();
        assert_eq!(codes, vec![1, 2, BOUNDARY_CODE, 3, BOUNDARY_CODE, 4]);
        assert_eq!(seq.unit_count(), 3);
        assert_eq!(seq.content_len(), 4);
    }

    #[test]
    fn from_codes_maps_sentinel_to_boundary() {
        let seq = TokenSequence::from_codes("a", &[7, BOUNDARY_CODE, 8]);
        assert!(!seq.tokens()[0].is_boundary());
        assert!(seq.tokens()[1].is_boundary());
        assert!(!seq.tokens()[2].is_boundary());
    }

    #[test]
    fn match_result_covered_sums_tile_lengths() {
        let result = MatchResult::new(vec![Tile::new(0, 1, 5), Tile::new(8, 9, 3)], 20, 30);
        assert_eq!(result.covered(), 8);
        assert_eq!(result.tile_count(), 2);
        assert_eq!(result.left_content_len(), 20);
        assert_eq!(result.right_content_len(), 30);
    }
}
