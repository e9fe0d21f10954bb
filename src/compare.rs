//! Pairwise comparison orchestration.
//!
//! One comparison: build (or receive) the index, run the matcher, score,
//! and package a serializable report. Batch mode fans all submission pairs
//! out over the rayon pool, building each submission's index exactly once
//! and sharing it read-only; consumption state is per pair.

use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::index::TokenIndex;
use crate::matcher::{MatchError, TileMatcher};
use crate::models::{
    ArtifactInfo, BatchReport, ComparisonReport, MatchResult, MatcherConfig, ReportSummary,
    SimilarityScore, TokenSequence,
};
use crate::score::SimilarityScorer;

/// Compare two sequences and package the outcome.
pub fn compare_pair<F>(
    left: &TokenSequence,
    right: &TokenSequence,
    config: &MatcherConfig,
    scorer: &SimilarityScorer<F>,
) -> Result<ComparisonReport, MatchError>
where
    F: Fn(f64, f64) -> f64,
{
    let matcher = TileMatcher::new(config.clone())?;
    let result = matcher.matches(left, right)?;
    let score = scorer.score(&result);
    Ok(build_report(left, right, config, &result, score))
}

/// Compare all `n * (n - 1) / 2` submission pairs.
///
/// Reports come back sorted by descending combined score (ties by pair
/// names), so batch output order is deterministic.
pub fn compare_all<F>(
    submissions: &[TokenSequence],
    config: &MatcherConfig,
    scorer: &SimilarityScorer<F>,
    show_progress: bool,
) -> Result<BatchReport, MatchError>
where
    F: Fn(f64, f64) -> f64 + Sync,
{
    let matcher = TileMatcher::new(config.clone())?;

    if show_progress {
        eprintln!("Indexing {} submissions...", submissions.len());
    }
    let indexes: Vec<TokenIndex> = submissions
        .iter()
        .map(TokenIndex::build)
        .collect::<Result<_, _>>()?;

    let pairs: Vec<(usize, usize)> = (0..submissions.len())
        .flat_map(|i| (i + 1..submissions.len()).map(move |j| (i, j)))
        .collect();

    let progress = if show_progress {
        let pb = ProgressBar::new(pairs.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let mut comparisons: Vec<ComparisonReport> = pairs
        .par_iter()
        .map(|&(i, j)| {
            let result =
                matcher.matches_with_index(&submissions[i], &submissions[j], &indexes[j])?;
            let score = scorer.score(&result);

            if let Some(ref pb) = progress {
                pb.inc(1);
            }

            Ok(build_report(
                &submissions[i],
                &submissions[j],
                config,
                &result,
                score,
            ))
        })
        .collect::<Result<_, MatchError>>()?;

    if let Some(pb) = progress {
        pb.finish_with_message("Done");
    }

    comparisons.sort_by(|a, b| {
        b.score
            .combined
            .total_cmp(&a.score.combined)
            .then_with(|| a.left.name.cmp(&b.left.name))
            .then_with(|| a.right.name.cmp(&b.right.name))
    });

    Ok(BatchReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: config.clone(),
        submission_count: submissions.len(),
        pair_count: pairs.len(),
        comparisons,
    })
}

fn build_report(
    left: &TokenSequence,
    right: &TokenSequence,
    config: &MatcherConfig,
    result: &MatchResult,
    score: SimilarityScore,
) -> ComparisonReport {
    ComparisonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config: config.clone(),
        left: ArtifactInfo::from_sequence(left),
        right: ArtifactInfo::from_sequence(right),
        summary: ReportSummary {
            tile_count: result.tile_count(),
            covered_tokens: result.covered(),
            // Discovery order is longest-first.
            longest_tile: result.tiles().first().map(|t| t.len).unwrap_or(0),
        },
        score,
        tiles: result.tiles().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(name: &str, codes: &[u32]) -> TokenSequence {
        TokenSequence::from_codes(name, codes)
    }

    #[test]
    fn pair_report_carries_summary_and_score() {
        let codes: Vec<u32> = (0..30).collect();
        let a = seq("a", &codes);
        let b = seq("b", &codes);

        let report = compare_pair(
            &a,
            &b,
            &MatcherConfig::new(3),
            &SimilarityScorer::average(),
        )
        .unwrap();

        assert_eq!(report.summary.tile_count, 1);
        assert_eq!(report.summary.covered_tokens, 30);
        assert_eq!(report.summary.longest_tile, 30);
        assert!((report.score.combined - 1.0).abs() < 1e-12);
        assert_eq!(report.left.name, "a");
        assert_eq!(report.right.name, "b");
    }

    #[test]
    fn batch_covers_every_pair_and_sorts_by_score() {
        let shared: Vec<u32> = (100..140).collect();
        let mut near_a = shared.clone();
        near_a.extend(0..10u32);
        let mut near_b = shared.clone();
        near_b.extend(20..30u32);
        let far: Vec<u32> = (1000..1050).collect();

        let submissions = vec![
            seq("near-a", &near_a),
            seq("near-b", &near_b),
            seq("far", &far),
        ];

        let batch = compare_all(
            &submissions,
            &MatcherConfig::new(5),
            &SimilarityScorer::average(),
            false,
        )
        .unwrap();

        assert_eq!(batch.submission_count, 3);
        assert_eq!(batch.pair_count, 3);
        assert_eq!(batch.comparisons.len(), 3);

        // The near pair leads; the two comparisons against `far` are empty.
        assert_eq!(batch.comparisons[0].left.name, "near-a");
        assert_eq!(batch.comparisons[0].right.name, "near-b");
        assert!(batch.comparisons[0].score.combined > 0.5);
        assert_eq!(batch.comparisons[1].summary.tile_count, 0);
        assert_eq!(batch.comparisons[2].summary.tile_count, 0);

        let combined: Vec<f64> = batch
            .comparisons
            .iter()
            .map(|c| c.score.combined)
            .collect();
        assert!(combined.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn batch_rejects_bad_config_before_indexing() {
        let submissions = vec![seq("a", &[1, 2, 3]), seq("b", &[1, 2, 3])];
        let err = compare_all(
            &submissions,
            &MatcherConfig::new(0),
            &SimilarityScorer::average(),
            false,
        )
        .unwrap_err();
        assert!(matches!(err, MatchError::Config(_)));
    }
}
