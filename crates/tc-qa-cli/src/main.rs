//! TC QA CLI
//!
//! Command-line interface for mapping-file reviews, results summaries and
//! issue digests.

#![allow(clippy::doc_markdown)]
#![allow(clippy::needless_pass_by_value)]

use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tc_qa_cli::{
    Config, DEFAULT_CONFIG_FILE, Result, check_pics, create_workbook, open_workbook, parse_date,
    run_issues, run_merged, run_review, run_summary, run_weekly,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tc-qa")]
#[command(about = "Test-case mapping review and certification reporting", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cross-check the mapping file against the test-case worksheet
    Review {
        /// Mapping file (overrides the config)
        #[arg(long)]
        mapping: Option<PathBuf>,
    },

    /// Rebuild the Summary and Summary Changes worksheets from raw results
    Summary,

    /// Write issue digests from JSON exports
    Issues {
        #[command(subcommand)]
        digest: IssueDigest,
    },

    /// Check PICS token blocks
    Pics {
        /// Token blocks, sub-tokens separated by `|` or `,`
        #[arg(value_name = "TOKENS", required = true)]
        tokens: Vec<String>,
    },
}

#[derive(Subcommand)]
enum IssueDigest {
    /// Per-repository issue lists and the combined list
    List,

    /// New, closed and open issues of the last seven days
    Weekly,

    /// Pull requests merged in a date range
    Merged {
        /// First day, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        start: chrono::NaiveDate,

        /// Last day, YYYY-MM-DD
        #[arg(long, value_parser = parse_date)]
        end: chrono::NaiveDate,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e}");
            1
        }
    };
    std::process::exit(code);
}

fn run(cli: Cli) -> Result<i32> {
    let mut config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Review { mapping } => {
            if let Some(mapping) = mapping {
                config.review.mapping_file = mapping;
            }
            let workbook = open_workbook(&config)?;
            let timestamp = chrono::Local::now().naive_local();
            let outcome = run_review(&config, &workbook, &timestamp)?;

            let report = &outcome.report;
            println!("=== Mapping Review ===");
            println!("  Test cases in mapping file: {}", report.definition_count);
            println!("  Test cases in worksheet: {}", report.sheet_count);
            println!("  Missing from mapping file: {}", report.difference.missing.len());
            println!("  Extra in mapping file: {}", report.difference.extra.len());
            for (kind, count) in report.issue_counts() {
                println!("  {kind}: {count}");
            }
            println!("\nReview log written to: {}", outcome.log_path.display());
        }
        Commands::Summary => {
            let mut workbook = open_workbook(&config)?;
            let outcome = run_summary(&config, &mut workbook)?;

            let aggregation = &outcome.report.aggregation;
            let names = &config.summary.worksheets;
            println!("=== Results Summary ===");
            println!("  Rows read: {}", aggregation.rows_read);
            println!("  Duplicates removed: {}", aggregation.duplicates_removed);
            println!("  Malformed rows dropped: {}", aggregation.malformed_dropped);
            println!("  Test cases: {}", outcome.report.summary.entries.len());
            println!("  Changes: {}", outcome.report.delta.len());
            if !outcome.styles_applied {
                println!("  Formatting: INCOMPLETE (see warnings)");
            }
            println!(
                "\nSummary written to: {}",
                workbook.sheet_path(&names.summary).display()
            );
            println!(
                "Changes written to: {}",
                workbook.sheet_path(&names.delta).display()
            );
        }
        Commands::Issues { digest } => {
            let mut workbook = create_workbook(&config)?;
            let outcome = match digest {
                IssueDigest::List => run_issues(&config, &mut workbook)?,
                IssueDigest::Weekly => run_weekly(&config, &mut workbook, chrono::Utc::now())?,
                IssueDigest::Merged { start, end } => {
                    run_merged(&config, &mut workbook, start, end)?
                }
            };

            for repository in &outcome.skipped {
                println!("  Skipped: {repository} (export not loaded)");
            }
            for (worksheet, rows) in &outcome.worksheets {
                println!(
                    "  {worksheet}: {rows} row(s) → {}",
                    workbook.sheet_path(worksheet).display()
                );
            }
            println!("\nIssue digest written to: {}", workbook.dir().display());
        }
        Commands::Pics { tokens } => {
            let reports = check_pics(&tokens);
            let invalid: Vec<_> = reports.iter().filter(|r| !r.is_valid()).collect();
            for report in &invalid {
                let reasons: Vec<String> =
                    report.violations.iter().map(ToString::to_string).collect();
                println!("  INVALID {}: {}", report.token, reasons.join("; "));
            }
            println!(
                "\n{} token(s) checked, {} invalid",
                reports.len(),
                invalid.len()
            );
            if !invalid.is_empty() {
                return Ok(1);
            }
        }
    }
    Ok(0)
}
