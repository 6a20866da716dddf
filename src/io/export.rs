//! Export adjusted comparables to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets: every original
//! column in its original order, followed by the derived columns. Missing
//! values are empty cells.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::{AdjustedRow, Feature};
use crate::error::AppError;

/// Header names of the derived columns, in export order.
pub fn derived_headers() -> Vec<String> {
    let mut headers: Vec<String> = [
        "Days on Market",
        "Days Until Withdrawn",
        "Days Until Expired",
        "Price Change (%)",
        "Market Adjustment (%)",
        "Market Adjustment Type",
        "Price After Market Adjustment",
    ]
    .into_iter()
    .map(str::to_string)
    .collect();
    headers.extend(Feature::ALL.iter().map(|f| f.export_header()));
    headers.extend(
        ["Total Adjustments", "Final Adjusted Price", "Listing Outcome"]
            .into_iter()
            .map(str::to_string),
    );
    headers
}

/// Write adjusted rows to a CSV file.
pub fn write_adjusted_csv(path: &Path, headers: &[String], rows: &[AdjustedRow]) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(4, format!("Failed to create export CSV '{}': {e}", path.display())))?;
    write_adjusted(file, headers, rows)
}

/// Write adjusted rows as CSV to any sink.
pub fn write_adjusted<W: Write>(sink: W, headers: &[String], rows: &[AdjustedRow]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(sink);

    let mut header_row: Vec<String> = headers.to_vec();
    header_row.extend(derived_headers());
    writer
        .write_record(&header_row)
        .map_err(|e| AppError::new(4, format!("Failed to write export CSV header: {e}")))?;

    for r in rows {
        let mut record: Vec<String> = r.row.raw.clone();
        record.resize(headers.len(), String::new());
        record.extend(derived_cells(r));
        writer
            .write_record(&record)
            .map_err(|e| AppError::new(4, format!("Failed to write export CSV row '{}': {e}", r.row.id)))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(4, format!("Failed to flush export CSV: {e}")))?;
    Ok(())
}

fn derived_cells(r: &AdjustedRow) -> Vec<String> {
    let mut cells = vec![
        opt_int(r.days_on_market),
        opt_int(r.days_until_withdrawn),
        opt_int(r.days_until_expired),
        format!("{:.4}", r.price_change_pct),
        format!("{:.4}", r.market_adjustment_pct),
        r.adjustment_type.label().to_string(),
        opt_money(r.price_after_market),
    ];
    cells.extend(
        Feature::ALL
            .iter()
            .map(|f| opt_money(r.feature_adjustments.get(f).copied())),
    );
    cells.push(format!("{:.2}", r.total_adjustments));
    cells.push(opt_money(r.final_adjusted_price));
    cells.push(r.outcome.label().to_string());
    cells
}

fn opt_int(v: Option<i64>) -> String {
    v.map(|d| d.to_string()).unwrap_or_default()
}

fn opt_money(v: Option<f64>) -> String {
    v.map(|x| format!("{x:.2}")).unwrap_or_default()
}
