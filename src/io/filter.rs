//! Row filters applied between ingest and adjustment.
//!
//! Filters narrow the comparable set the way the market dashboard's sidebar
//! does (city, minimum bedrooms/baths/year built). They run before the engine,
//! so the engine itself still maps every row it is given.

use crate::domain::{Column, ColumnSet, ComparableBatch, ComparableRow};
use crate::error::AppError;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    pub city: Option<String>,
    pub min_bedrooms: Option<f64>,
    pub min_baths: Option<f64>,
    pub min_year_built: Option<i32>,
}

impl RowFilter {
    pub fn is_empty(&self) -> bool {
        self.city.is_none()
            && self.min_bedrooms.is_none()
            && self.min_baths.is_none()
            && self.min_year_built.is_none()
    }

    /// Every active filter needs its column in the input.
    pub fn ensure_columns_exist(&self, columns: &ColumnSet) -> Result<(), AppError> {
        let required = [
            (self.city.is_some(), "--city", Column::City),
            (self.min_bedrooms.is_some(), "--min-bedrooms", Column::Bedrooms),
            (self.min_baths.is_some(), "--min-baths", Column::Bathrooms),
            (self.min_year_built.is_some(), "--min-year-built", Column::YearBuilt),
        ];
        for (active, flag, column) in required {
            if active && !columns.contains(column) {
                return Err(AppError::new(
                    2,
                    format!("Filter `{flag}` requires a `{}` column in the CSV.", column.header()),
                ));
            }
        }
        Ok(())
    }

    pub fn matches(&self, row: &ComparableRow) -> bool {
        matches_text(row.meta.city.as_deref(), self.city.as_deref())
            && at_least(row.meta.bedrooms, self.min_bedrooms)
            && at_least(row.characteristics.bathrooms, self.min_baths)
            && at_least(row.meta.year_built.map(f64::from), self.min_year_built.map(f64::from))
    }
}

/// Keep the rows matching `filter`, preserving order.
pub fn apply_filters(mut batch: ComparableBatch, filter: &RowFilter) -> Result<ComparableBatch, AppError> {
    if filter.is_empty() {
        return Ok(batch);
    }
    filter.ensure_columns_exist(&batch.columns)?;
    batch.rows.retain(|row| filter.matches(row));
    if batch.rows.is_empty() {
        return Err(AppError::new(3, "No rows remain after filtering."));
    }
    Ok(batch)
}

fn matches_text(value: Option<&str>, filter: Option<&str>) -> bool {
    let Some(filter) = filter else { return true };
    let Some(value) = value else { return false };
    value.trim().eq_ignore_ascii_case(filter.trim())
}

fn at_least(value: Option<f64>, min: Option<f64>) -> bool {
    let Some(min) = min else { return true };
    value.is_some_and(|v| v >= min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Characteristics, ListingMeta};

    fn row(id: &str, city: &str, beds: f64, baths: f64, year: i32) -> ComparableRow {
        ComparableRow {
            id: id.to_string(),
            characteristics: Characteristics {
                bathrooms: Some(baths),
                ..Characteristics::default()
            },
            meta: ListingMeta {
                bedrooms: Some(beds),
                year_built: Some(year),
                city: Some(city.to_string()),
                ..ListingMeta::default()
            },
            ..ComparableRow::default()
        }
    }

    fn batch() -> ComparableBatch {
        ComparableBatch {
            headers: Vec::new(),
            columns: [Column::ClosePrice, Column::City, Column::Bedrooms, Column::Bathrooms, Column::YearBuilt]
                .into_iter()
                .collect(),
            rows: vec![
                row("A", "Austin", 3.0, 2.0, 1995),
                row("B", "round rock", 4.0, 3.0, 2010),
                row("C", "Austin", 2.0, 1.0, 1980),
                row("D", "AUSTIN", 4.0, 2.5, 2005),
            ],
        }
    }

    #[test]
    fn filters_combine_and_preserve_order() {
        let filter = RowFilter {
            city: Some("austin".to_string()),
            min_bedrooms: Some(3.0),
            ..RowFilter::default()
        };
        let out = apply_filters(batch(), &filter).unwrap();
        let ids: Vec<&str> = out.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "D"]);
    }

    #[test]
    fn year_and_baths_thresholds() {
        let filter = RowFilter {
            min_baths: Some(2.5),
            min_year_built: Some(2000),
            ..RowFilter::default()
        };
        let out = apply_filters(batch(), &filter).unwrap();
        let ids: Vec<&str> = out.rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["B", "D"]);
    }

    #[test]
    fn filter_on_missing_column_is_an_error() {
        let mut b = batch();
        b.columns = [Column::ClosePrice].into_iter().collect();
        let filter = RowFilter {
            city: Some("Austin".to_string()),
            ..RowFilter::default()
        };
        let err = apply_filters(b, &filter).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("City/Location"));
    }

    #[test]
    fn everything_filtered_out_is_an_error() {
        let filter = RowFilter {
            min_bedrooms: Some(10.0),
            ..RowFilter::default()
        };
        assert_eq!(apply_filters(batch(), &filter).unwrap_err().exit_code(), 3);
    }
}
