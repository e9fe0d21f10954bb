//! Output formatting for comparison reports (JSON, CSV, console).

use crate::models::{BatchReport, ComparisonReport};
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a comparison report as JSON.
pub fn write_json<W: Write>(report: &ComparisonReport, writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(report)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write a comparison report as JSON to a file.
pub fn write_json_file(report: &ComparisonReport, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_json(report, &mut file)
}

/// Write a batch report as JSON.
pub fn write_batch_json<W: Write>(batch: &BatchReport, writer: &mut W) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(batch)?;
    writer.write_all(json.as_bytes())?;
    writer.write_all(b"\n")?;
    Ok(())
}

/// Write a batch report as JSON to a file.
pub fn write_batch_json_file(batch: &BatchReport, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_batch_json(batch, &mut file)
}

/// Write a report's tiles as CSV, one tile per row.
pub fn write_csv<W: Write>(report: &ComparisonReport, writer: &mut W) -> Result<(), OutputError> {
    writeln!(writer, "left,right,left_start,right_start,length")?;
    for tile in &report.tiles {
        writeln!(
            writer,
            "{},{},{},{},{}",
            report.left.name, report.right.name, tile.left, tile.right, tile.len
        )?;
    }
    Ok(())
}

/// Write a report's tiles as CSV to a file.
pub fn write_csv_file(report: &ComparisonReport, path: &Path) -> Result<(), OutputError> {
    let mut file = std::fs::File::create(path)?;
    write_csv(report, &mut file)
}

/// Write every batch comparison's tiles as one CSV.
pub fn write_batch_csv<W: Write>(batch: &BatchReport, writer: &mut W) -> Result<(), OutputError> {
    writeln!(writer, "left,right,left_start,right_start,length")?;
    for report in &batch.comparisons {
        for tile in &report.tiles {
            writeln!(
                writer,
                "{},{},{},{},{}",
                report.left.name, report.right.name, tile.left, tile.right, tile.len
            )?;
        }
    }
    Ok(())
}

/// Print a human-readable summary of one comparison.
pub fn print_summary(report: &ComparisonReport) {
    println!("=== {} vs {} ===", report.left.name, report.right.name);
    println!(
        "Tokens: {} / {}",
        report.left.token_count, report.right.token_count
    );
    println!(
        "Tiles: {} (longest {}, {} tokens covered)",
        report.summary.tile_count, report.summary.longest_tile, report.summary.covered_tokens
    );
    println!(
        "Coverage: {:.1}% / {:.1}%",
        report.score.coverage_left * 100.0,
        report.score.coverage_right * 100.0
    );
    println!("Combined: {:.3}", report.score.combined);
}

/// Print the first `limit` tiles of a report (all if `limit` is None).
pub fn print_tiles(report: &ComparisonReport, limit: Option<usize>) {
    let count = limit.unwrap_or(report.tiles.len()).min(report.tiles.len());
    for tile in &report.tiles[..count] {
        println!(
            "  A[{}..{}] = B[{}..{}] ({} tokens)",
            tile.left,
            tile.left + tile.len,
            tile.right,
            tile.right + tile.len,
            tile.len
        );
    }
    if count < report.tiles.len() {
        println!("  ... {} more", report.tiles.len() - count);
    }
}

/// Print a batch leaderboard: one line per pair, highest combined first.
pub fn print_batch_summary(batch: &BatchReport, limit: Option<usize>) {
    println!(
        "=== {} submissions, {} pairs ===",
        batch.submission_count, batch.pair_count
    );
    let count = limit
        .unwrap_or(batch.comparisons.len())
        .min(batch.comparisons.len());
    for report in &batch.comparisons[..count] {
        println!(
            "{:.3}  {} vs {} ({} tiles, {} tokens)",
            report.score.combined,
            report.left.name,
            report.right.name,
            report.summary.tile_count,
            report.summary.covered_tokens
        );
    }
    if count < batch.comparisons.len() {
        println!("... {} more", batch.comparisons.len() - count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare_pair;
    use crate::models::{MatcherConfig, TokenSequence};
    use crate::score::SimilarityScorer;

    fn sample_report() -> ComparisonReport {
        let a = TokenSequence::from_codes("a", &[1, 2, 3, 4, 5, 9]);
        let b = TokenSequence::from_codes("b", &[8, 1, 2, 3, 4, 5]);
        compare_pair(
            &a,
            &b,
            &MatcherConfig::new(3),
            &SimilarityScorer::average(),
        )
        .unwrap()
    }

    #[test]
    fn csv_has_header_and_one_row_per_tile() {
        let report = sample_report();
        let mut buf = Vec::new();
        write_csv(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "left,right,left_start,right_start,length");
        assert_eq!(lines.len(), 1 + report.tiles.len());
        assert_eq!(lines[1], "a,b,0,1,5");
    }

    #[test]
    fn json_round_trips() {
        let report = sample_report();
        let mut buf = Vec::new();
        write_json(&report, &mut buf).unwrap();

        let parsed: ComparisonReport = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.tiles, report.tiles);
        assert_eq!(parsed.summary.covered_tokens, report.summary.covered_tokens);
    }
}
