//! Reporting utilities: market summary, trends, and group comparisons.
//!
//! Everything here reads the engine output; nothing feeds back into the
//! adjustment computation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AdjustedRow, AdjustmentType, GroupBy, ListingOutcome};

pub mod format;

pub use format::*;

/// Headline statistics for a set of adjusted comparables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSummary {
    pub n_rows: usize,
    pub avg_close_price: Option<f64>,
    pub median_close_price: Option<f64>,
    pub avg_price_per_sqft: Option<f64>,
    pub median_days_on_market: Option<f64>,
    pub avg_final_adjusted_price: Option<f64>,
    pub median_final_adjusted_price: Option<f64>,
    pub adjustment_types: AdjustmentTypeCounts,
    pub outcomes: OutcomeCounts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjustmentTypeCounts {
    pub upward: usize,
    pub downward: usize,
    pub none: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub closed: usize,
    pub withdrawn: usize,
    pub expired: usize,
}

/// Average close price for one close month (`YYYY-MM`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyTrend {
    pub month: String,
    pub avg_close_price: f64,
    pub n: usize,
}

/// Row count for one category value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub value: String,
    pub count: usize,
}

/// Average close price for one group value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub value: String,
    pub avg_close_price: f64,
    pub n: usize,
}

/// Days on market for a row: derived from dates, else the reported column.
pub fn effective_days_on_market(row: &AdjustedRow) -> Option<f64> {
    row.days_on_market
        .map(|d| d as f64)
        .or(row.row.meta.reported_dom)
}

/// Compute the headline summary.
pub fn summarize(rows: &[AdjustedRow]) -> MarketSummary {
    let close: Vec<f64> = rows.iter().filter_map(|r| r.row.close_price).collect();
    let per_sqft: Vec<f64> = rows
        .iter()
        .filter_map(|r| {
            let area = r.row.characteristics.living_area_sqft?;
            if area > 0.0 { Some(r.row.close_price? / area) } else { None }
        })
        .collect();
    let dom: Vec<f64> = rows.iter().filter_map(effective_days_on_market).collect();
    let adjusted: Vec<f64> = rows.iter().filter_map(|r| r.final_adjusted_price).collect();

    let mut adjustment_types = AdjustmentTypeCounts::default();
    let mut outcomes = OutcomeCounts::default();
    for r in rows {
        match r.adjustment_type {
            AdjustmentType::Upward => adjustment_types.upward += 1,
            AdjustmentType::Downward => adjustment_types.downward += 1,
            AdjustmentType::None => adjustment_types.none += 1,
        }
        match r.outcome {
            ListingOutcome::Closed => outcomes.closed += 1,
            ListingOutcome::Withdrawn => outcomes.withdrawn += 1,
            ListingOutcome::Expired => outcomes.expired += 1,
        }
    }

    MarketSummary {
        n_rows: rows.len(),
        avg_close_price: mean(&close),
        median_close_price: median(&close),
        avg_price_per_sqft: mean(&per_sqft),
        median_days_on_market: median(&dom),
        avg_final_adjusted_price: mean(&adjusted),
        median_final_adjusted_price: median(&adjusted),
        adjustment_types,
        outcomes,
    }
}

/// Average close price per close month, oldest first.
pub fn monthly_trends(rows: &[AdjustedRow]) -> Vec<MonthlyTrend> {
    let mut buckets: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for r in rows {
        let (Some(date), Some(price)) = (r.row.close_date, r.row.close_price) else {
            continue;
        };
        buckets
            .entry(date.format("%Y-%m").to_string())
            .or_default()
            .push(price);
    }

    buckets
        .into_iter()
        .filter_map(|(month, prices)| {
            Some(MonthlyTrend {
                avg_close_price: mean(&prices)?,
                n: prices.len(),
                month,
            })
        })
        .collect()
}

/// Row counts per property type, most common first (ties by name).
pub fn property_type_distribution(rows: &[AdjustedRow]) -> Vec<CategoryCount> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in rows {
        if let Some(t) = r.row.meta.property_type.as_deref() {
            *counts.entry(t).or_default() += 1;
        }
    }

    let mut out: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(value, count)| CategoryCount {
            value: value.to_string(),
            count,
        })
        .collect();
    // Stable sort keeps the alphabetical order from the BTreeMap for ties.
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

/// Average close price per group value.
///
/// When `only` is non-empty, groups are restricted to those values
/// (case-insensitive).
pub fn compare_groups(rows: &[AdjustedRow], group_by: GroupBy, only: &[String]) -> Vec<GroupMean> {
    let mut buckets: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for r in rows {
        let (Some(value), Some(price)) = (group_by.value(&r.row.meta), r.row.close_price) else {
            continue;
        };
        if !only.is_empty() && !only.iter().any(|o| o.trim().eq_ignore_ascii_case(value)) {
            continue;
        }
        buckets.entry(value).or_default().push(price);
    }

    buckets
        .into_iter()
        .filter_map(|(value, prices)| {
            Some(GroupMean {
                value: value.to_string(),
                avg_close_price: mean(&prices)?,
                n: prices.len(),
            })
        })
        .collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}
