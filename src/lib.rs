//! Tokentile Similarity Detection Library
//!
//! Detects similarity between pairs of integer-encoded token streams using
//! greedy string tiling: the longest common, non-overlapping runs of tokens
//! are extracted as tiles, and the fraction of each stream covered by tiles
//! becomes its similarity. Token streams come from language-specific
//! frontends; this crate compares them.
//!
//! # Example
//!
//! ```no_run
//! use tokentile::prelude::*;
//! use std::path::Path;
//!
//! let left = load_submission(Path::new("alpha.json")).unwrap();
//! let right = load_submission(Path::new("beta.json")).unwrap();
//!
//! let config = MatcherConfig::new(9);
//! let scorer = SimilarityScorer::average();
//!
//! let report = compare_pair(&left, &right, &config, &scorer).unwrap();
//! println!(
//!     "{} tiles, combined similarity {:.3}",
//!     report.summary.tile_count, report.score.combined
//! );
//! ```
//!
//! # Direct matcher use
//!
//! ```
//! use tokentile::prelude::*;
//!
//! let a = TokenSequence::from_codes("a", &[1, 2, 3, 4, 5, 9]);
//! let b = TokenSequence::from_codes("b", &[8, 1, 2, 3, 4, 5]);
//!
//! let matcher = TileMatcher::new(MatcherConfig::new(3)).unwrap();
//! let result = matcher.matches(&a, &b).unwrap();
//! assert_eq!(result.tiles(), &[Tile::new(0, 1, 5)]);
//! ```

pub mod compare;
pub mod index;
pub mod load;
pub mod matcher;
pub mod models;
pub mod output;
pub mod score;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::compare::{compare_all, compare_pair};
    pub use crate::index::{next_prime, TokenIndex};
    pub use crate::load::{load_submission, load_submission_dir, LoadError};
    pub use crate::matcher::{MatchError, TileMatcher};
    pub use crate::models::{
        ArtifactInfo, BatchReport, ComparisonReport, MatchResult, MatcherConfig, ReportSummary,
        SimilarityScore, Tile, Token, TokenSequence, BOUNDARY_CODE,
    };
    pub use crate::output::{
        print_batch_summary, print_summary, print_tiles, write_batch_csv, write_batch_json,
        write_batch_json_file, write_csv, write_csv_file, write_json, write_json_file, OutputError,
    };
    pub use crate::score::SimilarityScorer;
}

// Re-export commonly used types at the crate root
pub use matcher::{MatchError, TileMatcher};
pub use models::{MatchResult, MatcherConfig, SimilarityScore, Tile, Token, TokenSequence};
pub use score::SimilarityScorer;
