//! Shared adjustment pipeline used by both `comps adjust` and `comps analyze`.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! CSV ingest -> row filters -> subject/weights -> adjustment -> summary
//!
//! The subcommands can then focus on presentation.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info, warn};

use crate::adjust::{AdjustOutput, adjust};
use crate::domain::{AdjustConfig, AdjustmentWeights, SubjectProperty};
use crate::error::AppError;
use crate::io::filter::{RowFilter, apply_filters};
use crate::io::ingest::{IngestedData, load_comparables};
use crate::io::subject::{read_subject_json, read_weights_json};
use crate::report::{MarketSummary, summarize};

/// Where the subject property comes from.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum SubjectSource {
    /// No subject: market adjustments only.
    #[default]
    None,
    /// Built from command-line flags.
    Inline(SubjectProperty),
    /// Read from a JSON file.
    File(PathBuf),
}

/// Inputs of a single run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub filter: RowFilter,
    pub subject: SubjectSource,
    pub weights: Option<PathBuf>,
    pub default_market_trend_pct: f64,
}

/// All computed outputs of a single run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    /// Ingested data, with the batch already narrowed by the row filters.
    pub ingest: IngestedData,
    pub adjust_config: AdjustConfig,
    pub output: AdjustOutput,
    pub summary: MarketSummary,
}

/// Execute the full pipeline and return the computed outputs.
pub fn run_adjust(config: &RunConfig) -> Result<RunOutput, AppError> {
    // Resolve JSON inputs before touching the CSV so a typo fails fast.
    let subject = resolve_subject(&config.subject)?;
    let weights = match &config.weights {
        Some(path) => read_weights_json(path)?,
        None => AdjustmentWeights::default(),
    };
    let adjust_config = AdjustConfig {
        default_market_trend_pct: config.default_market_trend_pct,
        weights,
    };

    let mut ingest = load_comparables(&config.input)?;
    let rows_before = ingest.batch.rows.len();
    ingest.batch = apply_filters(ingest.batch, &config.filter)?;
    if ingest.batch.rows.len() != rows_before {
        // Issues of filtered-out rows would describe rows nobody sees.
        let kept: HashSet<usize> = ingest.batch.rows.iter().map(|r| r.line).collect();
        ingest.row_issues.retain(|issue| kept.contains(&issue.line));
        info!(
            kept = ingest.batch.rows.len(),
            dropped = rows_before - ingest.batch.rows.len(),
            "row filters applied"
        );
    }

    let output = adjust(&ingest.batch, subject.as_ref(), &adjust_config)?;
    for notice in &output.notices {
        debug!("{notice}");
    }
    if !output.notices.is_empty() {
        warn!(notices = output.notices.len(), "configuration defaults substituted");
    }
    let summary = summarize(&output.rows);

    Ok(RunOutput {
        ingest,
        adjust_config,
        output,
        summary,
    })
}

fn resolve_subject(source: &SubjectSource) -> Result<Option<SubjectProperty>, AppError> {
    match source {
        SubjectSource::None => Ok(None),
        SubjectSource::Inline(subject) => Ok(Some(subject.clone())),
        SubjectSource::File(path) => read_subject_json(path).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::domain::{Feature, Notice};

    const CSV: &str = "\
MLS #,List Date,Close Date,Close Price,List Price,Lot Size (SF),City\n\
A1,01/01/2024,02/15/2024,\"$300,000\",\"$290,000\",8000,Austin\n\
B2,01/10/2024,03/01/2024,\"$410,000\",\"$400,000\",6500,Round Rock\n\
C3,02/01/2024,,,\"$350,000\",7000,austin\n";

    fn config(dir: &std::path::Path) -> RunConfig {
        let input = dir.join("comps.csv");
        fs::write(&input, CSV).unwrap();
        RunConfig {
            input,
            filter: RowFilter::default(),
            subject: SubjectSource::None,
            weights: None,
            default_market_trend_pct: 7.0,
        }
    }

    #[test]
    fn market_only_run() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_adjust(&config(dir.path())).unwrap();

        assert_eq!(run.output.rows.len(), 3);
        assert_eq!(run.summary.n_rows, 3);
        assert!(run.output.notices.contains(&Notice::NoSubject));
        assert!(run.output.notices.contains(&Notice::MarketTrendColumnMissing { default_pct: 7.0 }));
        let first = run.output.rows[0].price_after_market.unwrap();
        assert!((first - 310_655.17).abs() < 0.01);
        assert_eq!(run.output.rows[2].final_adjusted_price, None);
    }

    #[test]
    fn subject_file_and_weights_file() {
        let dir = tempfile::tempdir().unwrap();
        let subject = dir.path().join("subject.json");
        let weights = dir.path().join("weights.json");
        fs::write(&subject, r#"{ "lot_size_sqft": 7000 }"#).unwrap();
        fs::write(&weights, r#"{ "lot_size": 2.0 }"#).unwrap();

        let run = run_adjust(&RunConfig {
            subject: SubjectSource::File(subject),
            weights: Some(weights),
            ..config(dir.path())
        })
        .unwrap();

        assert_eq!(run.output.rows[0].feature_adjustments[&Feature::LotSize], 2_000.0);
        assert_eq!(run.output.rows[1].feature_adjustments[&Feature::LotSize], -1_000.0);
        assert_eq!(run.adjust_config.weights.lot_size, Some(2.0));
    }

    #[test]
    fn filters_run_before_adjustment() {
        let dir = tempfile::tempdir().unwrap();
        let run = run_adjust(&RunConfig {
            filter: RowFilter {
                city: Some("AUSTIN".to_string()),
                ..RowFilter::default()
            },
            ..config(dir.path())
        })
        .unwrap();

        let ids: Vec<&str> = run.output.rows.iter().map(|r| r.row.id.as_str()).collect();
        assert_eq!(ids, vec!["A1", "C3"]);
        assert_eq!(run.ingest.rows_read, 3);
    }

    #[test]
    fn row_issues_of_filtered_rows_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("issues.csv");
        fs::write(
            &input,
            "MLS #,Close Price,City,Close Date\n\
A1,300000,Austin,not-a-date\n\
B2,410000,Round Rock,13/45/2024\n\
C3,350000,Austin,2024-03-01\n",
        )
        .unwrap();

        let all = run_adjust(&RunConfig {
            input: input.clone(),
            ..config(dir.path())
        })
        .unwrap();
        assert_eq!(all.ingest.row_issues.len(), 2);

        let austin = run_adjust(&RunConfig {
            input,
            filter: RowFilter {
                city: Some("Austin".to_string()),
                ..RowFilter::default()
            },
            ..config(dir.path())
        })
        .unwrap();
        assert_eq!(austin.output.rows.len(), 2);
        let lines: Vec<usize> = austin.ingest.row_issues.iter().map(|i| i.line).collect();
        assert_eq!(lines, vec![2]);
        assert_eq!(austin.ingest.row_issues[0].id.as_deref(), Some("A1"));
    }

    #[test]
    fn missing_close_price_column_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("no_close.csv");
        fs::write(&input, "MLS #,List Price\nA,100\n").unwrap();
        let err = run_adjust(&RunConfig {
            input,
            ..config(dir.path())
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("Close Price"));
    }

    #[test]
    fn bad_subject_json_fails_before_reading_csv() {
        let dir = tempfile::tempdir().unwrap();
        let subject = dir.path().join("subject.json");
        fs::write(&subject, "[1, 2]").unwrap();
        let err = run_adjust(&RunConfig {
            input: dir.path().join("does_not_exist.csv"),
            subject: SubjectSource::File(subject),
            weights: None,
            filter: RowFilter::default(),
            default_market_trend_pct: 7.0,
        })
        .unwrap_err();
        assert!(err.to_string().starts_with("Invalid subject JSON"));
    }
}
