//! Tokentile Similarity Detection Pipeline
//!
//! Compares integer token streams with greedy string tiling to surface
//! likely plagiarism or duplication between submissions.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

mod compare;
mod index;
mod load;
mod matcher;
mod models;
mod output;
mod score;

use compare::{compare_all, compare_pair};
use load::{load_submission, load_submission_dir};
use models::{MatcherConfig, TokenSequence};
use output::{
    print_batch_summary, print_summary, print_tiles, write_batch_json_file, write_csv_file,
    write_json_file,
};
use score::SimilarityScorer;

#[derive(Parser)]
#[command(name = "tokentile")]
#[command(about = "Token-stream similarity detection via greedy string tiling")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Output format for comparison results
#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    /// JSON report with tiles and scores
    Json,
    /// CSV file, one tile per row
    Csv,
}

/// How the two coverage fractions fold into one score
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Combiner {
    /// Arithmetic mean of both coverages
    Avg,
    /// The smaller coverage
    Min,
    /// The larger coverage
    Max,
    /// Harmonic mean (Dice coefficient over token counts)
    Harmonic,
}

impl Combiner {
    fn scorer(self) -> SimilarityScorer {
        match self {
            Combiner::Avg => SimilarityScorer::average(),
            Combiner::Min => SimilarityScorer::minimum(),
            Combiner::Max => SimilarityScorer::maximum(),
            Combiner::Harmonic => SimilarityScorer::harmonic(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two submissions for shared token runs
    Compare {
        /// Left submission file (JSON token stream)
        #[arg(long)]
        left: PathBuf,

        /// Right submission file (JSON token stream)
        #[arg(long)]
        right: PathBuf,

        /// Shortest token run that counts as a match
        #[arg(long)]
        min_match_length: usize,

        /// Output file path (stdout summary only if omitted)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,

        /// Coverage combination
        #[arg(long, value_enum, default_value = "avg")]
        combiner: Combiner,

        /// Parallelize the scan phase of each round
        #[arg(long)]
        parallel_scan: bool,

        /// Suppress the console summary
        #[arg(long)]
        quiet: bool,

        /// Print first N tiles to console
        #[arg(long)]
        show_tiles: Option<usize>,
    },

    /// Compare every pair of submissions in a directory
    Batch {
        /// Directory of *.json submission files
        #[arg(long)]
        dir: PathBuf,

        /// Shortest token run that counts as a match
        #[arg(long)]
        min_match_length: usize,

        /// Drop pairs whose combined score is below this threshold
        #[arg(long)]
        min_similarity: Option<f64>,

        /// Output file path for the JSON batch report
        #[arg(long)]
        output: Option<PathBuf>,

        /// Coverage combination
        #[arg(long, value_enum, default_value = "avg")]
        combiner: Combiner,

        /// Parallelize the scan phase within each comparison too
        #[arg(long)]
        parallel_scan: bool,

        /// Suppress progress output
        #[arg(long)]
        quiet: bool,

        /// Print only the top N pairs in the console leaderboard
        #[arg(long)]
        top: Option<usize>,
    },

    /// Show token statistics for one submission
    Info {
        /// Submission file (JSON token stream)
        #[arg(long)]
        file: PathBuf,
    },

    /// Benchmark matcher performance
    Benchmark {
        /// Number of comparisons per scenario
        #[arg(long, default_value = "100")]
        iterations: usize,

        /// Sequence size in tokens
        #[arg(long, default_value = "1000")]
        size: usize,

        /// Shortest token run that counts as a match
        #[arg(long, default_value = "9")]
        min_match_length: usize,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Compare {
            left,
            right,
            min_match_length,
            output,
            format,
            combiner,
            parallel_scan,
            quiet,
            show_tiles,
        } => {
            let left_seq = load_submission(&left)?;
            let right_seq = load_submission(&right)?;

            let config = MatcherConfig::new(min_match_length).with_parallel_scan(parallel_scan);
            let scorer = combiner.scorer();

            let report = compare_pair(&left_seq, &right_seq, &config, &scorer)?;

            if let Some(path) = output {
                match format {
                    OutputFormat::Json => write_json_file(&report, &path)?,
                    OutputFormat::Csv => write_csv_file(&report, &path)?,
                }
                if !quiet {
                    eprintln!("Output: {}", path.display());
                }
            }

            if !quiet {
                print_summary(&report);
            }
            if let Some(limit) = show_tiles {
                println!("\n=== Tiles ===");
                print_tiles(&report, Some(limit));
            }
        }

        Commands::Batch {
            dir,
            min_match_length,
            min_similarity,
            output,
            combiner,
            parallel_scan,
            quiet,
            top,
        } => {
            let submissions = load_submission_dir(&dir)?;
            if !quiet {
                eprintln!("Loaded {} submissions from {}", submissions.len(), dir.display());
            }

            let config = MatcherConfig::new(min_match_length).with_parallel_scan(parallel_scan);
            let scorer = combiner.scorer();

            let mut batch = compare_all(&submissions, &config, &scorer, !quiet)?;

            if let Some(threshold) = min_similarity {
                batch
                    .comparisons
                    .retain(|report| report.score.combined >= threshold);
            }

            if let Some(path) = output {
                write_batch_json_file(&batch, &path)?;
                if !quiet {
                    eprintln!("Output: {}", path.display());
                }
            }

            if !quiet {
                print_batch_summary(&batch, top);
            }
        }

        Commands::Info { file } => {
            let seq = load_submission(&file)?;

            println!("=== {} ===", seq.name());
            println!("Units: {}", seq.unit_count());
            println!("Tokens: {} ({} with separators)", seq.content_len(), seq.len());
        }

        Commands::Benchmark {
            iterations,
            size,
            min_match_length,
        } => {
            run_benchmark(iterations, size, min_match_length)?;
        }
    }

    Ok(())
}

/// Wall-clock matcher throughput on synthetic streams.
fn run_benchmark(
    iterations: usize,
    size: usize,
    min_match_length: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    use matcher::TileMatcher;
    use std::time::Instant;

    println!("=== Tiling Benchmark ===");
    println!("Iterations: {}", iterations);
    println!("Sequence size: {}", size);

    let matcher = TileMatcher::new(MatcherConfig::new(min_match_length))?;

    let identical: Vec<u32> = (0..size as u32).collect();
    let partial: Vec<u32> = (0..size as u32)
        .map(|i| if i % 10 < 7 { i } else { i + 1_000_000 })
        .collect();
    let disjoint: Vec<u32> = (2_000_000..2_000_000 + size as u32).collect();

    let scenarios = [
        ("Identical sequences", identical.clone(), identical.clone()),
        ("70% match sequences", identical.clone(), partial),
        ("No match sequences", identical, disjoint),
    ];

    for (label, left_codes, right_codes) in scenarios {
        let left = TokenSequence::from_codes("left", &left_codes);
        let right = TokenSequence::from_codes("right", &right_codes);

        println!("\n{}:", label);
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = matcher.matches(&left, &right)?;
        }
        let elapsed = start.elapsed();
        let per_comparison = elapsed.as_secs_f64() / iterations as f64;
        println!("  Total time: {:.3}s", elapsed.as_secs_f64());
        println!("  Per comparison: {:.3}ms", per_comparison * 1000.0);
        println!("  Comparisons/sec: {:.0}", 1.0 / per_comparison);
    }

    Ok(())
}
