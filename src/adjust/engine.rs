//! Batch adjustment engine.
//!
//! Turns a `ComparableBatch` into one `AdjustedRow` per input row:
//!
//! 1. day counts from the listing timeline
//! 2. market-condition adjustment (trend minus sale-to-list premium)
//! 3. characteristic adjustments against the subject property
//! 4. final adjusted price and listing outcome
//!
//! Rows are independent, so they are mapped in parallel. `collect` on an
//! indexed rayon iterator keeps input order.

use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::adjust::features::{active_features, feature_adjustments};
use crate::adjust::market::{days_between, listing_outcome, market_adjustment};
use crate::domain::{
    AdjustConfig, AdjustedRow, Characteristics, Column, ComparableBatch, ComparableRow, Feature, Notice,
    SubjectProperty,
};

/// Batch-level failure. Nothing is computed when this is returned.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdjustError {
    /// A structurally required column is absent from the input schema.
    #[error("Missing required column: `{column}`")]
    Schema { column: &'static str },
}

/// Engine output: adjusted rows (input order) plus batch notices.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustOutput {
    pub rows: Vec<AdjustedRow>,
    pub notices: Vec<Notice>,
}

/// Columns the engine cannot run without.
const REQUIRED_COLUMNS: [Column; 1] = [Column::ClosePrice];

/// Adjust every row of `batch`.
///
/// `subject` is only needed for characteristic adjustments; without it the
/// result is market-only.
pub fn adjust(
    batch: &ComparableBatch,
    subject: Option<&SubjectProperty>,
    config: &AdjustConfig,
) -> Result<AdjustOutput, AdjustError> {
    ensure_required_columns(batch)?;

    let plan = BatchPlan::resolve(batch, subject, config);
    debug!(
        rows = batch.rows.len(),
        features = plan.features.len(),
        "adjusting comparable batch"
    );

    let rows: Vec<AdjustedRow> = batch
        .rows
        .par_iter()
        .map(|row| adjust_row(row, &plan, config))
        .collect();

    Ok(AdjustOutput {
        rows,
        notices: plan.notices,
    })
}

fn ensure_required_columns(batch: &ComparableBatch) -> Result<(), AdjustError> {
    for column in REQUIRED_COLUMNS {
        if !batch.columns.contains(column) {
            return Err(AdjustError::Schema { column: column.header() });
        }
    }
    Ok(())
}

/// Everything resolved once per batch before any row is touched.
struct BatchPlan<'a> {
    subject: Option<&'a Characteristics>,
    features: Vec<Feature>,
    notices: Vec<Notice>,
}

impl<'a> BatchPlan<'a> {
    fn resolve(batch: &ComparableBatch, subject: Option<&'a SubjectProperty>, config: &AdjustConfig) -> Self {
        let mut notices = Vec::new();
        let default_pct = config.default_market_trend_pct;

        if !batch.columns.contains(Column::MarketTrend) {
            notices.push(Notice::MarketTrendColumnMissing { default_pct });
        } else {
            let missing = batch.rows.iter().filter(|r| r.market_trend_pct.is_none()).count();
            if missing > 0 {
                notices.push(Notice::MarketTrendValuesMissing {
                    rows: missing,
                    default_pct,
                });
            }
        }

        let subject = subject.map(|s| &s.characteristics);
        let features = match subject {
            Some(chars) => {
                for feature in Feature::ALL {
                    if config.weights.covers(feature) && chars.value(feature).is_none() {
                        notices.push(Notice::SubjectFeatureMissing(feature));
                    }
                }
                active_features(chars, &config.weights)
            }
            None => {
                notices.push(Notice::NoSubject);
                Vec::new()
            }
        };

        Self {
            subject,
            features,
            notices,
        }
    }
}

fn adjust_row(row: &ComparableRow, plan: &BatchPlan<'_>, config: &AdjustConfig) -> AdjustedRow {
    let market = market_adjustment(row, config.default_market_trend_pct);

    let feature_adjustments = match plan.subject {
        Some(subject) => feature_adjustments(&plan.features, &row.characteristics, subject, &config.weights),
        None => Default::default(),
    };
    let total_adjustments: f64 = feature_adjustments.values().sum();
    let final_adjusted_price = market.price_after_market.map(|p| p + total_adjustments);

    AdjustedRow {
        row: row.clone(),
        days_on_market: days_between(row.list_date, row.close_date),
        days_until_withdrawn: days_between(row.list_date, row.withdrawn_date),
        days_until_expired: days_between(row.list_date, row.expiration_date),
        market_trend_pct: market.market_trend_pct,
        price_change_pct: market.price_change_pct,
        market_adjustment_pct: market.market_adjustment_pct,
        adjustment_type: market.adjustment_type,
        price_after_market: market.price_after_market,
        feature_adjustments,
        total_adjustments,
        final_adjusted_price,
        outcome: listing_outcome(row),
    }
}
