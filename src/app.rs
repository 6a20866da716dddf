//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and sets up logging
//! - parses CLI arguments
//! - runs the adjustment pipeline
//! - prints reports/plots
//! - writes optional exports

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::app::pipeline::{RunConfig, RunOutput, SubjectSource};
use crate::cli::{AdjustArgs, AnalyzeArgs, Cli, Command, InputArgs, PlotArgs};
use crate::domain::{GroupBy, Notice};
use crate::error::AppError;
use crate::io::summary::{AnalysisReport, GroupComparison};
use crate::report::{compare_groups, monthly_trends, property_type_distribution};

pub mod pipeline;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "comp_adjust=warn";

/// How many row issues to list before summarizing the rest.
const MAX_ROW_ISSUES_SHOWN: usize = 10;

/// Entry point for the `comps` binary.
pub fn run() -> Result<(), AppError> {
    // `.env` may carry COMPS_* defaults, so it must be loaded before clap reads env vars.
    dotenvy::dotenv().ok();
    init_logging();

    let cli = Cli::parse();
    match cli.command {
        Command::Adjust(args) => handle_adjust(args),
        Command::Analyze(args) => handle_analyze(args),
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    // A subscriber may already be installed (e.g. when embedded); keep it.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn handle_adjust(args: AdjustArgs) -> Result<(), AppError> {
    let config = adjust_config_from_args(&args)?;
    let run = pipeline::run_adjust(&config)?;
    let source = config.input.display().to_string();

    println!(
        "{}",
        crate::report::format_run_summary(&source, &run.ingest, &run.output, &run.summary, &run.adjust_config)
    );
    print_notices(&run.output.notices);
    print_row_issues(&run);

    println!("{}", crate::report::format_adjusted_table(&run.output.rows, args.top));
    println!("{}", crate::report::format_commentary(&run.summary));

    if args.plot.enabled() {
        print_plots(&run, &args.plot, true);
    }

    if let Some(path) = &args.export {
        crate::io::export::write_adjusted_csv(path, &run.ingest.batch.headers, &run.output.rows)?;
        println!("Wrote adjusted comparables to {}", path.display());
    }
    if let Some(path) = &args.export_summary {
        write_summary(path, &source, &run, None)?;
    }

    Ok(())
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let config = RunConfig {
        input: input_path(&args.input)?,
        filter: args.input.row_filter(),
        subject: SubjectSource::None,
        weights: None,
        default_market_trend_pct: args.market_trend_default,
    };
    let run = pipeline::run_adjust(&config)?;
    let source = config.input.display().to_string();

    println!(
        "{}",
        crate::report::format_run_summary(&source, &run.ingest, &run.output, &run.summary, &run.adjust_config)
    );
    // Analyze never has a subject, so that notice is noise here.
    let notices: Vec<Notice> = run
        .output
        .notices
        .iter()
        .filter(|n| **n != Notice::NoSubject)
        .cloned()
        .collect();
    print_notices(&notices);
    print_row_issues(&run);

    println!("{}", crate::report::format_commentary(&run.summary));
    println!("{}", crate::report::format_monthly_trends(&monthly_trends(&run.output.rows)));
    println!(
        "{}",
        crate::report::format_distribution(&property_type_distribution(&run.output.rows))
    );

    if let Some(group_by) = args.group_by {
        ensure_group_column(&run, group_by)?;
        let groups = compare_groups(&run.output.rows, group_by, &args.compare);
        println!("{}", crate::report::format_group_comparison(group_by, &groups));
    }

    if args.plot.enabled() {
        print_plots(&run, &args.plot, false);
    }

    if let Some(path) = &args.export_summary {
        let groups = args.group_by.map(|g| (g, args.compare.as_slice()));
        write_summary(path, &source, &run, groups)?;
    }

    Ok(())
}

pub fn adjust_config_from_args(args: &AdjustArgs) -> Result<RunConfig, AppError> {
    let subject = match (&args.subject_file, args.subject.to_subject()) {
        (Some(path), _) => SubjectSource::File(path.clone()),
        (None, Some(subject)) => SubjectSource::Inline(subject),
        (None, None) => SubjectSource::None,
    };
    Ok(RunConfig {
        input: input_path(&args.input)?,
        filter: args.input.row_filter(),
        subject,
        weights: args.weights.clone(),
        default_market_trend_pct: args.market_trend_default,
    })
}

/// `-f` if given, otherwise ask.
fn input_path(input: &InputArgs) -> Result<PathBuf, AppError> {
    match &input.file {
        Some(path) => crate::cli::picker::validate_csv_path(path),
        None => crate::cli::picker::prompt_for_csv_path(),
    }
}

fn ensure_group_column(run: &RunOutput, group_by: GroupBy) -> Result<(), AppError> {
    let column = group_by.column();
    if run.ingest.batch.columns.contains(column) {
        Ok(())
    } else {
        Err(AppError::new(
            2,
            format!("`--group-by` needs a `{}` column in the CSV.", column.header()),
        ))
    }
}

fn print_notices(notices: &[Notice]) {
    if !notices.is_empty() {
        println!("{}", crate::report::format_notices(notices));
    }
}

fn print_row_issues(run: &RunOutput) {
    if !run.ingest.row_issues.is_empty() {
        println!(
            "{}",
            crate::report::format_row_issues(&run.ingest.row_issues, MAX_ROW_ISSUES_SHOWN)
        );
    }
}

fn print_plots(run: &RunOutput, plot: &PlotArgs, with_scatter: bool) {
    let rows = &run.output.rows;
    println!(
        "{}",
        crate::plot::render_close_price_histogram(rows, plot.bins, plot.width)
    );
    println!(
        "{}",
        crate::plot::render_days_on_market_histogram(rows, plot.bins, plot.width)
    );
    println!(
        "{}",
        crate::plot::render_adjusted_price_histogram(rows, plot.bins, plot.width)
    );
    if with_scatter {
        println!(
            "{}",
            crate::plot::render_adjustment_scatter(rows, plot.width, plot.height)
        );
    }
}

fn write_summary(
    path: &Path,
    source: &str,
    run: &RunOutput,
    groups: Option<(GroupBy, &[String])>,
) -> Result<(), AppError> {
    let rows = &run.output.rows;
    let report = AnalysisReport {
        tool: "comps".to_string(),
        source: source.to_string(),
        summary: run.summary.clone(),
        monthly_trends: monthly_trends(rows),
        property_types: property_type_distribution(rows),
        groups: groups.map(|(group_by, only)| GroupComparison {
            group_by: group_by.display_name().to_string(),
            groups: compare_groups(rows, group_by, only),
        }),
    };
    crate::io::summary::write_summary_json(path, &report)?;
    println!("Wrote market summary to {}", path.display());
    Ok(())
}
