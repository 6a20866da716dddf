//! Market summary JSON export.
//!
//! The JSON is a stable snapshot of the report section of a run, so other
//! tools can pick up the numbers without re-parsing the terminal output.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::report::{CategoryCount, GroupMean, MarketSummary, MonthlyTrend};

/// Everything written by `--export-summary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub tool: String,
    pub source: String,
    pub summary: MarketSummary,
    pub monthly_trends: Vec<MonthlyTrend>,
    pub property_types: Vec<CategoryCount>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub groups: Option<GroupComparison>,
}

/// Group comparison section, present when the run grouped rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupComparison {
    pub group_by: String,
    pub groups: Vec<GroupMean>,
}

pub fn write_summary_json(path: &Path, report: &AnalysisReport) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create summary JSON '{}': {e}", path.display())))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, report)
        .map_err(|e| AppError::new(4, format!("Failed to write summary JSON: {e}")))?;
    writer
        .write_all(b"\n")
        .and_then(|_| writer.flush())
        .map_err(|e| AppError::new(4, format!("Failed to write summary JSON: {e}")))?;
    Ok(())
}
