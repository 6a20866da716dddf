//! Command-line parsing for the comparable-sales adjustment tool.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! adjustment and reporting code. Conversion into typed configuration lives
//! here too, so `app` only dispatches.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{Args, Parser, Subcommand};

use crate::domain::{Characteristics, GroupBy, SubjectProperty, ViewQuality, DEFAULT_MARKET_TREND_PCT};
use crate::io::filter::RowFilter;

pub mod picker;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "comps", version, about = "Comparable sales adjustment calculator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Adjust comparables against a subject property and print the results.
    Adjust(AdjustArgs),
    /// Market report for a comparables file (no subject adjustments).
    Analyze(AnalyzeArgs),
}

/// Input file and row filters shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct InputArgs {
    /// Comparables CSV. Prompts for one when omitted.
    #[arg(short = 'f', long = "file", value_name = "CSV")]
    pub file: Option<PathBuf>,

    /// Keep rows whose city matches (case-insensitive).
    #[arg(long)]
    pub city: Option<String>,

    /// Keep rows with at least this many bedrooms.
    #[arg(long)]
    pub min_bedrooms: Option<f64>,

    /// Keep rows with at least this many bathrooms.
    #[arg(long)]
    pub min_baths: Option<f64>,

    /// Keep rows built in or after this year.
    #[arg(long)]
    pub min_year_built: Option<i32>,
}

impl InputArgs {
    pub fn row_filter(&self) -> RowFilter {
        RowFilter {
            city: self.city.clone(),
            min_bedrooms: self.min_bedrooms,
            min_baths: self.min_baths,
            min_year_built: self.min_year_built,
        }
    }
}

/// Terminal plot options.
#[derive(Debug, Args, Clone)]
pub struct PlotArgs {
    /// Render ASCII plots in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Histogram bins.
    #[arg(long, default_value_t = 10)]
    pub bins: usize,

    /// Plot width (columns).
    #[arg(long, default_value_t = 60)]
    pub width: usize,

    /// Scatter height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,
}

impl PlotArgs {
    pub fn enabled(&self) -> bool {
        self.plot && !self.no_plot
    }
}

/// Subject property given on the command line.
///
/// Any characteristic left out disables that adjustment.
#[derive(Debug, Args, Clone, Default)]
pub struct SubjectArgs {
    /// Subject lot size (square feet).
    #[arg(long, value_name = "SQFT")]
    pub subject_lot_size: Option<f64>,

    /// Subject living area (square feet).
    #[arg(long, value_name = "SQFT")]
    pub subject_living_area: Option<f64>,

    /// Subject bathroom count.
    #[arg(long)]
    pub subject_baths: Option<f64>,

    /// Subject garage spaces.
    #[arg(long)]
    pub subject_garage: Option<f64>,

    /// Subject has a pool (yes/no).
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub subject_pool: Option<bool>,

    /// Subject has a basement (yes/no).
    #[arg(long, value_parser = BoolishValueParser::new())]
    pub subject_basement: Option<bool>,

    /// Subject view quality (Good, Fair, Poor).
    #[arg(long, value_parser = parse_view)]
    pub subject_view: Option<ViewQuality>,
}

impl SubjectArgs {
    /// Subject built from the flags, or `None` when no flag was given.
    pub fn to_subject(&self) -> Option<SubjectProperty> {
        let characteristics = Characteristics {
            lot_size_sqft: self.subject_lot_size,
            living_area_sqft: self.subject_living_area,
            bathrooms: self.subject_baths,
            garage_spaces: self.subject_garage,
            pool: self.subject_pool,
            basement: self.subject_basement,
            view: self.subject_view,
        };
        if characteristics == Characteristics::default() {
            None
        } else {
            Some(SubjectProperty { characteristics })
        }
    }
}

/// Options for `comps adjust`.
#[derive(Debug, Args, Clone)]
pub struct AdjustArgs {
    #[command(flatten)]
    pub input: InputArgs,

    #[command(flatten)]
    pub subject: SubjectArgs,

    /// Subject property JSON (replaces the --subject-* flags).
    #[arg(long = "subject", value_name = "JSON", conflicts_with_all = [
        "subject_lot_size", "subject_living_area", "subject_baths", "subject_garage",
        "subject_pool", "subject_basement", "subject_view",
    ])]
    pub subject_file: Option<PathBuf>,

    /// Weight table JSON; keys left out keep their default weight.
    #[arg(long, value_name = "JSON", env = "COMPS_WEIGHTS")]
    pub weights: Option<PathBuf>,

    /// Market trend (%) used when a row or the whole file has none.
    #[arg(long, env = "COMPS_MARKET_TREND_DEFAULT", default_value_t = DEFAULT_MARKET_TREND_PCT)]
    pub market_trend_default: f64,

    /// Show the first N adjusted rows.
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    #[command(flatten)]
    pub plot: PlotArgs,

    /// Export adjusted rows to CSV.
    #[arg(long, value_name = "CSV")]
    pub export: Option<PathBuf>,

    /// Export the market summary to JSON.
    #[arg(long = "export-summary", value_name = "JSON")]
    pub export_summary: Option<PathBuf>,
}

/// Options for `comps analyze`.
#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Compare average close price across values of this column.
    #[arg(long, value_enum)]
    pub group_by: Option<GroupBy>,

    /// Restrict the comparison to these values.
    #[arg(long, num_args = 1.., requires = "group_by")]
    pub compare: Vec<String>,

    /// Market trend (%) used when a row or the whole file has none.
    #[arg(long, env = "COMPS_MARKET_TREND_DEFAULT", default_value_t = DEFAULT_MARKET_TREND_PCT)]
    pub market_trend_default: f64,

    #[command(flatten)]
    pub plot: PlotArgs,

    /// Export the market summary to JSON.
    #[arg(long = "export-summary", value_name = "JSON")]
    pub export_summary: Option<PathBuf>,
}

fn parse_view(s: &str) -> Result<ViewQuality, String> {
    match ViewQuality::parse(s) {
        ViewQuality::Other => Err(format!("unknown view quality `{s}` (expected Good, Fair or Poor)")),
        view => Ok(view),
    }
}
