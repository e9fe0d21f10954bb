//! Greedy string tiling over two token sequences.
//!
//! This is the HOT PATH - performance is critical here.
//! Each round scans every unconsumed left position for the longest common
//! run against the indexed right sequence, commits the winner as a tile,
//! and rescans. Greedy, not globally optimal: an early long tile can block
//! a better global tiling, and that trade is deliberate.

use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;

use crate::index::TokenIndex;
use crate::models::{MatchResult, MatcherConfig, Tile, Token, TokenSequence};

#[derive(Error, Debug)]
pub enum MatchError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("invalid sequence {name:?}: {reason}")]
    InvalidSequence { name: String, reason: String },
    #[error("internal invariant violated: {0}")]
    InternalInvariant(String),
    #[error("comparison cancelled")]
    Cancelled,
}

/// A candidate extension found during a scan phase.
///
/// `beats` encodes the committed tie-break order: longest wins, then lowest
/// left position, then lowest right position. The order is total over the
/// distinct candidates of one scan, so serial and parallel reductions pick
/// the same winner.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    left: usize,
    right: usize,
    len: usize,
}

impl Candidate {
    fn beats(&self, other: &Candidate) -> bool {
        self.len > other.len
            || (self.len == other.len
                && (self.left < other.left
                    || (self.left == other.left && self.right < other.right)))
    }
}

/// Greedy tiling matcher for one configuration.
///
/// Holds no per-comparison state: one matcher may serve many concurrent
/// comparisons, each with its own consumption bitsets.
#[derive(Debug, Clone)]
pub struct TileMatcher {
    config: MatcherConfig,
}

impl TileMatcher {
    pub fn new(config: MatcherConfig) -> Result<Self, MatchError> {
        if config.min_match_length < 1 {
            return Err(MatchError::Config(format!(
                "minimum match length must be >= 1, got {}",
                config.min_match_length
            )));
        }
        Ok(Self { config })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    /// Compare two sequences, building the index over `right` internally.
    pub fn matches(
        &self,
        left: &TokenSequence,
        right: &TokenSequence,
    ) -> Result<MatchResult, MatchError> {
        validate_sequence(left)?;
        validate_sequence(right)?;
        let index = TokenIndex::build(right)?;
        self.run(left, right, &index, None)
    }

    /// Compare against a pre-built index over `right`, for callers that
    /// reuse one reference sequence across many comparisons. The index is
    /// only read; consumption state lives in this call.
    pub fn matches_with_index(
        &self,
        left: &TokenSequence,
        right: &TokenSequence,
        right_index: &TokenIndex,
    ) -> Result<MatchResult, MatchError> {
        validate_sequence(left)?;
        validate_sequence(right)?;
        self.run(left, right, right_index, None)
    }

    /// Like [`matches`](Self::matches), but checks `cancel` at the top of
    /// every scan round. A cancelled comparison yields [`MatchError::Cancelled`]
    /// and no partial result.
    pub fn matches_cancellable(
        &self,
        left: &TokenSequence,
        right: &TokenSequence,
        cancel: &AtomicBool,
    ) -> Result<MatchResult, MatchError> {
        validate_sequence(left)?;
        validate_sequence(right)?;
        let index = TokenIndex::build(right)?;
        self.run(left, right, &index, Some(cancel))
    }

    fn run(
        &self,
        left: &TokenSequence,
        right: &TokenSequence,
        index: &TokenIndex,
        cancel: Option<&AtomicBool>,
    ) -> Result<MatchResult, MatchError> {
        let left_tokens = left.tokens();
        let right_tokens = right.tokens();
        let mut used_left = vec![false; left_tokens.len()];
        let mut used_right = vec![false; right_tokens.len()];
        let mut tiles = Vec::new();

        loop {
            if let Some(flag) = cancel {
                if flag.load(Ordering::Relaxed) {
                    return Err(MatchError::Cancelled);
                }
            }

            let best = self.scan(left_tokens, right_tokens, index, &used_left, &used_right);

            match best {
                Some(c) if c.len >= self.config.min_match_length => {
                    for offset in 0..c.len {
                        used_left[c.left + offset] = true;
                        used_right[c.right + offset] = true;
                    }
                    tiles.push(Tile::new(c.left, c.right, c.len));
                }
                _ => break,
            }
        }

        Ok(MatchResult::new(
            tiles,
            left.content_len(),
            right.content_len(),
        ))
    }

    /// Scan phase: the best extension over all unconsumed left positions.
    fn scan(
        &self,
        left_tokens: &[Token],
        right_tokens: &[Token],
        index: &TokenIndex,
        used_left: &[bool],
        used_right: &[bool],
    ) -> Option<Candidate> {
        if self.config.parallel_scan {
            (0..left_tokens.len())
                .into_par_iter()
                .filter(|&i| !used_left[i] && !left_tokens[i].is_boundary())
                .filter_map(|i| {
                    best_at(left_tokens, right_tokens, index, used_left, used_right, i)
                })
                .reduce_with(|a, b| if b.beats(&a) { b } else { a })
        } else {
            let mut best: Option<Candidate> = None;
            for i in 0..left_tokens.len() {
                if used_left[i] || left_tokens[i].is_boundary() {
                    continue;
                }
                if let Some(c) =
                    best_at(left_tokens, right_tokens, index, used_left, used_right, i)
                {
                    // i is ascending, so a strict length win is the only way
                    // a later candidate replaces an earlier one.
                    match best {
                        Some(b) if !c.beats(&b) => {}
                        _ => best = Some(c),
                    }
                }
            }
            best
        }
    }
}

/// Best extension anchored at left position `i`, or None if no right
/// candidate matches at all.
fn best_at(
    left_tokens: &[Token],
    right_tokens: &[Token],
    index: &TokenIndex,
    used_left: &[bool],
    used_right: &[bool],
    i: usize,
) -> Option<Candidate> {
    let code = left_tokens[i].code;
    let mut best: Option<Candidate> = None;

    for &j in index.lookup(code) {
        let j = j as usize;
        // Bucket sharing makes false positives expected: re-check equality.
        if used_right[j] || right_tokens[j].code != code {
            continue;
        }
        let len = extend(left_tokens, right_tokens, used_left, used_right, i, j);
        if len == 0 {
            continue;
        }
        // Positions come back in ascending j, so a strict comparison keeps
        // the earliest j among equals.
        match best {
            Some(b) if len <= b.len => {}
            _ => {
                best = Some(Candidate {
                    left: i,
                    right: j,
                    len,
                })
            }
        }
    }
    best
}

/// Grow a run at (i, j) while tokens stay pairwise equal, unconsumed, and
/// non-boundary.
fn extend(
    left_tokens: &[Token],
    right_tokens: &[Token],
    used_left: &[bool],
    used_right: &[bool],
    i: usize,
    j: usize,
) -> usize {
    let mut len = 0;
    while i + len < left_tokens.len() && j + len < right_tokens.len() {
        let a = &left_tokens[i + len];
        let b = &right_tokens[j + len];
        if a.code != b.code
            || a.is_boundary()
            || used_left[i + len]
            || used_right[j + len]
        {
            break;
        }
        len += 1;
    }
    len
}

/// Fail fast on malformed input, before any scanning work.
///
/// A stream is well-formed when it is non-empty, does not open with a
/// boundary marker, and never holds two adjacent markers (either would mean
/// an empty sub-unit). A trailing marker is legal terminator style.
fn validate_sequence(sequence: &TokenSequence) -> Result<(), MatchError> {
    let invalid = |reason: &str| MatchError::InvalidSequence {
        name: sequence.name().to_string(),
        reason: reason.to_string(),
    };

    let tokens = sequence.tokens();
    if tokens.is_empty() {
        return Err(invalid("empty token stream"));
    }
    if tokens[0].is_boundary() {
        return Err(invalid("leading boundary marker"));
    }
    for pair in tokens.windows(2) {
        if pair[0].is_boundary() && pair[1].is_boundary() {
            return Err(invalid("adjacent boundary markers"));
        }
    }
    Ok(())
}
