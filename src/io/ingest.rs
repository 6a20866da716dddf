//! CSV ingest and normalization.
//!
//! This module turns an MLS-style comparables export into a typed
//! `ComparableBatch`.
//!
//! Design goals:
//! - **Schema resolved once**: which logical columns exist is decided from the
//!   header row, not re-checked per row
//! - **Row-level tolerance**: an unparseable cell becomes `None` and a
//!   `RowIssue`; no row is ever dropped here
//! - **Pass-through**: the original headers and cells are kept for export
//! - **Separation of concerns**: no adjustment logic here

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};
use csv::{ByteRecord, StringRecord};
use tracing::{debug, warn};

use crate::domain::{
    Characteristics, Column, ColumnSet, ComparableBatch, ComparableRow, ListingMeta, ViewQuality,
};
use crate::error::AppError;

/// A non-fatal problem with a single row.
///
/// The offending value was replaced by `None`; the row itself is kept.
#[derive(Debug, Clone, PartialEq)]
pub struct RowIssue {
    /// 1-based line number in the file (header is line 1).
    pub line: usize,
    pub id: Option<String>,
    pub column: Option<&'static str>,
    pub message: String,
}

/// Ingest output: typed batch + row issues.
#[derive(Debug, Clone)]
pub struct IngestedData {
    pub batch: ComparableBatch,
    pub row_issues: Vec<RowIssue>,
    pub rows_read: usize,
}

/// Load comparables from a CSV file.
pub fn load_comparables(path: &Path) -> Result<IngestedData, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open CSV '{}': {e}", path.display())))?;
    debug!(path = %path.display(), "loading comparables");
    read_comparables(file)
}

/// Read comparables from any CSV source.
pub fn read_comparables<R: Read>(source: R) -> Result<IngestedData, AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(source);

    // Byte records: a cell in a legacy encoding must not take the whole row down.
    let raw_headers = reader
        .byte_headers()
        .map_err(|e| AppError::new(2, format!("Failed to read CSV headers: {e}")))?;
    let headers: StringRecord = raw_headers.iter().map(|h| String::from_utf8_lossy(h)).collect();

    let index = resolve_columns(&build_header_map(&headers));
    let columns: ColumnSet = index.keys().copied().collect();
    let header_names: Vec<String> = headers
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect();

    let mut rows = Vec::new();
    let mut row_issues = Vec::new();

    for (idx, result) in reader.byte_records().enumerate() {
        // byte_records() starts on line 2 (after the header).
        let line = idx + 2;
        let ordinal = idx + 1;

        match result {
            Ok(record) => {
                let (decoded, mut decode_issues) = decode_record(&record, &header_names, &index, line);
                let (row, issues) = parse_row(&decoded, &index, header_names.len(), line, ordinal);
                for issue in &mut decode_issues {
                    issue.id = Some(row.id.clone());
                }
                row_issues.extend(decode_issues);
                row_issues.extend(issues);
                rows.push(row);
            }
            Err(e) => {
                row_issues.push(RowIssue {
                    line,
                    id: None,
                    column: None,
                    message: e.to_string(),
                });
                rows.push(ComparableRow {
                    id: format!("#{ordinal}"),
                    line,
                    raw: vec![String::new(); header_names.len()],
                    ..ComparableRow::default()
                });
            }
        }
    }

    if rows.is_empty() {
        return Err(AppError::new(3, "The CSV contains no data rows."));
    }

    for issue in &row_issues {
        debug!(line = issue.line, column = issue.column.unwrap_or("-"), "{}", issue.message);
    }
    if !row_issues.is_empty() {
        warn!(issues = row_issues.len(), rows = rows.len(), "row issues found while reading CSV");
    }

    let rows_read = rows.len();
    Ok(IngestedData {
        batch: ComparableBatch {
            headers: header_names,
            columns,
            rows,
        },
        row_issues,
        rows_read,
    })
}

/// Decode every cell as UTF-8, replacing invalid bytes.
///
/// Each cell that needed replacement gets its own row issue; the other cells
/// of the row are untouched.
fn decode_record(
    record: &ByteRecord,
    headers: &[String],
    index: &HashMap<Column, usize>,
    line: usize,
) -> (StringRecord, Vec<RowIssue>) {
    let mut issues = Vec::new();
    let mut decoded = StringRecord::with_capacity(record.as_slice().len(), record.len());
    for (pos, bytes) in record.iter().enumerate() {
        match std::str::from_utf8(bytes) {
            Ok(text) => decoded.push_field(text),
            Err(_) => {
                let column = index.iter().find(|(_, i)| **i == pos).map(|(c, _)| c.header());
                let name = headers.get(pos).map(String::as_str).unwrap_or("?");
                issues.push(RowIssue {
                    line,
                    id: None,
                    column,
                    message: format!("Invalid UTF-8 in column '{name}'; unreadable bytes replaced."),
                });
                decoded.push_field(&String::from_utf8_lossy(bytes));
            }
        }
    }
    (decoded, issues)
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins for duplicated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a UTF-8 BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> HashMap<Column, usize> {
    Column::ALL
        .into_iter()
        .filter_map(|column| {
            column
                .aliases()
                .iter()
                .find_map(|alias| header_map.get(&normalize_header_name(alias)))
                .map(|&idx| (column, idx))
        })
        .collect()
}

/// Cell accessor that records parse failures as row issues.
struct RowReader<'a> {
    record: &'a StringRecord,
    index: &'a HashMap<Column, usize>,
    line: usize,
    id: Option<String>,
    issues: Vec<RowIssue>,
}

impl<'a> RowReader<'a> {
    fn text(&self, column: Column) -> Option<&'a str> {
        let idx = self.index.get(&column)?;
        self.record.get(*idx).map(str::trim).filter(|s| !s.is_empty())
    }

    fn owned(&self, column: Column) -> Option<String> {
        self.text(column).map(str::to_string)
    }

    fn parse<T>(&mut self, column: Column, parse: fn(&str) -> Result<T, String>) -> Option<T> {
        let s = self.text(column)?;
        match parse(s) {
            Ok(v) => Some(v),
            Err(message) => {
                self.issues.push(RowIssue {
                    line: self.line,
                    id: self.id.clone(),
                    column: Some(column.header()),
                    message,
                });
                None
            }
        }
    }
}

fn parse_row(
    record: &StringRecord,
    index: &HashMap<Column, usize>,
    width: usize,
    line: usize,
    ordinal: usize,
) -> (ComparableRow, Vec<RowIssue>) {
    let mut r = RowReader {
        record,
        index,
        line,
        id: None,
        issues: Vec::new(),
    };
    r.id = r.owned(Column::ComparableId);
    let id = r.id.clone().unwrap_or_else(|| format!("#{ordinal}"));

    let characteristics = Characteristics {
        lot_size_sqft: r.parse(Column::LotSize, parse_number),
        living_area_sqft: r.parse(Column::LivingArea, parse_number),
        bathrooms: r.parse(Column::Bathrooms, parse_number),
        garage_spaces: r.parse(Column::GarageSpaces, parse_number),
        pool: r.parse(Column::Pool, parse_flag),
        basement: r.parse(Column::Basement, parse_flag),
        view: r.text(Column::View).map(ViewQuality::parse),
    };

    let meta = ListingMeta {
        bedrooms: r.parse(Column::Bedrooms, parse_number),
        year_built: r.parse(Column::YearBuilt, parse_year),
        property_type: r.owned(Column::PropertyType),
        city: r.owned(Column::City),
        subdivision: r.owned(Column::Subdivision),
        school_district: r.owned(Column::SchoolDistrict),
        reported_dom: r.parse(Column::ReportedDom, parse_number),
    };

    let mut raw: Vec<String> = record.iter().map(str::to_string).collect();
    raw.resize(width, String::new());

    let row = ComparableRow {
        id,
        line,
        list_date: r.parse(Column::ListDate, parse_date),
        close_date: r.parse(Column::CloseDate, parse_date),
        withdrawn_date: r.parse(Column::WithdrawnDate, parse_date),
        expiration_date: r.parse(Column::ExpirationDate, parse_date),
        close_price: r.parse(Column::ClosePrice, parse_number),
        list_price: r.parse(Column::ListPrice, parse_number),
        market_trend_pct: r.parse(Column::MarketTrend, parse_number),
        sp_lp_ratio: r.parse(Column::SpLpRatio, parse_ratio),
        characteristics,
        meta,
        raw,
    };

    (row, r.issues)
}

/// Parse a calendar date.
///
/// US-style MLS exports use `MM/DD/YYYY`; ISO dates and ISO datetimes are
/// accepted too. The time part of a datetime is dropped.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    // `%y` before `%Y`: chrono reads "24" as the year 24 under `%Y`.
    const DATE_FMTS: [&str; 5] = ["%Y-%m-%d", "%m/%d/%y", "%m/%d/%Y", "%Y/%m/%d", "%m-%d-%Y"];
    const DATETIME_FMTS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];

    for fmt in DATE_FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    for fmt in DATETIME_FMTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt.date());
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, MM/DD/YYYY, YYYY/MM/DD, MM-DD-YYYY."
    ))
}

/// Parse a number, ignoring `$`, `,`, `%` and inner spaces.
pub fn parse_number(s: &str) -> Result<f64, String> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | '%' | ' '))
        .collect();
    cleaned
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("Invalid number '{s}'."))
}

/// Parse a sale-to-list ratio. `103.5%` means `1.035`.
fn parse_ratio(s: &str) -> Result<f64, String> {
    let v = parse_number(s)?;
    if s.trim_end().ends_with('%') { Ok(v / 100.0) } else { Ok(v) }
}

fn parse_year(s: &str) -> Result<i32, String> {
    let v = parse_number(s)?;
    if v.fract() != 0.0 || !(1000.0..=9999.0).contains(&v) {
        return Err(format!("Invalid year '{s}'."));
    }
    Ok(v as i32)
}

fn parse_flag(s: &str) -> Result<bool, String> {
    match s.trim().to_ascii_lowercase().as_str() {
        "yes" | "y" | "true" | "t" | "1" => Ok(true),
        "no" | "n" | "false" | "f" | "0" | "none" => Ok(false),
        _ => Err(format!("Invalid yes/no value '{s}'.")),
    }
}
