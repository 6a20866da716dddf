//! Market-condition adjustment and listing timeline.
//!
//! All functions here are small and pure so the engine can apply them per row
//! without shared state.

use chrono::NaiveDate;

use crate::domain::{AdjustmentType, ComparableRow, ListingOutcome};

/// Market-side derived values for one row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarketAdjustment {
    pub market_trend_pct: f64,
    pub price_change_pct: f64,
    pub market_adjustment_pct: f64,
    pub adjustment_type: AdjustmentType,
    pub price_after_market: Option<f64>,
}

/// Whole days from `start` to `end`; `None` if either endpoint is missing.
pub fn days_between(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<i64> {
    Some((end? - start?).num_days())
}

/// Sale-to-list ratio: the row's own value, else derived from prices.
pub fn resolve_sp_lp_ratio(row: &ComparableRow) -> Option<f64> {
    if let Some(ratio) = row.sp_lp_ratio {
        return Some(ratio);
    }
    let close = row.close_price?;
    let list = row.list_price?;
    if list > 0.0 {
        Some(close / list)
    } else {
        None
    }
}

/// `(ratio - 1) * 100`, or 0 when no ratio can be resolved.
pub fn price_change_pct(row: &ComparableRow) -> f64 {
    resolve_sp_lp_ratio(row).map_or(0.0, |ratio| (ratio - 1.0) * 100.0)
}

/// Compute the market adjustment for a row.
pub fn market_adjustment(row: &ComparableRow, default_trend_pct: f64) -> MarketAdjustment {
    let market_trend_pct = row.market_trend_pct.unwrap_or(default_trend_pct);
    let price_change_pct = price_change_pct(row);
    let market_adjustment_pct = market_trend_pct - price_change_pct;
    let price_after_market = row
        .close_price
        .map(|price| price * (1.0 + market_adjustment_pct / 100.0));

    MarketAdjustment {
        market_trend_pct,
        price_change_pct,
        market_adjustment_pct,
        adjustment_type: AdjustmentType::from_percent(market_adjustment_pct),
        price_after_market,
    }
}

/// Expired beats Withdrawn beats Closed.
pub fn listing_outcome(row: &ComparableRow) -> ListingOutcome {
    match (row.expiration_date, row.withdrawn_date) {
        (Some(_), _) => ListingOutcome::Expired,
        (None, Some(_)) => ListingOutcome::Withdrawn,
        (None, None) => ListingOutcome::Closed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn days_between_requires_both_dates() {
        assert_eq!(days_between(date(2024, 1, 1), date(2024, 3, 1)), Some(60));
        assert_eq!(days_between(None, date(2024, 3, 1)), None);
        assert_eq!(days_between(date(2024, 1, 1), None), None);
        assert_eq!(days_between(date(2024, 3, 1), date(2024, 1, 1)), Some(-60));
    }

    #[test]
    fn ratio_derived_from_prices() {
        let row = ComparableRow {
            close_price: Some(300_000.0),
            list_price: Some(290_000.0),
            ..ComparableRow::default()
        };
        let ratio = resolve_sp_lp_ratio(&row).unwrap();
        assert!((ratio - 1.034_482_758_6).abs() < 1e-9);
    }

    #[test]
    fn explicit_ratio_wins_over_prices() {
        let row = ComparableRow {
            close_price: Some(300_000.0),
            list_price: Some(290_000.0),
            sp_lp_ratio: Some(0.98),
            ..ComparableRow::default()
        };
        assert!((price_change_pct(&row) + 2.0).abs() < 1e-9);
    }

    #[test]
    fn no_ratio_is_neutral() {
        let row = ComparableRow {
            close_price: Some(300_000.0),
            ..ComparableRow::default()
        };
        assert_eq!(price_change_pct(&row), 0.0);

        let zero_list = ComparableRow {
            close_price: Some(300_000.0),
            list_price: Some(0.0),
            ..ComparableRow::default()
        };
        assert_eq!(price_change_pct(&zero_list), 0.0);
    }

    #[test]
    fn market_adjustment_worked_example() {
        let row = ComparableRow {
            close_price: Some(300_000.0),
            list_price: Some(290_000.0),
            market_trend_pct: Some(7.0),
            ..ComparableRow::default()
        };
        let m = market_adjustment(&row, 0.0);
        assert!((m.price_change_pct - 3.448_275_862).abs() < 1e-6);
        assert!((m.market_adjustment_pct - 3.551_724_138).abs() < 1e-6);
        assert_eq!(m.adjustment_type, AdjustmentType::Upward);
        let after = m.price_after_market.unwrap();
        assert!((after - 310_655.172_4).abs() < 0.01);
    }

    #[test]
    fn missing_close_price_yields_no_adjusted_price() {
        let row = ComparableRow {
            sp_lp_ratio: Some(1.10),
            ..ComparableRow::default()
        };
        let m = market_adjustment(&row, 7.0);
        assert_eq!(m.market_trend_pct, 7.0);
        assert!((m.market_adjustment_pct + 3.0).abs() < 1e-9);
        assert_eq!(m.adjustment_type, AdjustmentType::Downward);
        assert_eq!(m.price_after_market, None);
    }

    #[test]
    fn outcome_priority() {
        let both = ComparableRow {
            withdrawn_date: date(2024, 2, 1),
            expiration_date: date(2024, 3, 1),
            ..ComparableRow::default()
        };
        assert_eq!(listing_outcome(&both), ListingOutcome::Expired);

        let withdrawn = ComparableRow {
            withdrawn_date: date(2024, 2, 1),
            ..ComparableRow::default()
        };
        assert_eq!(listing_outcome(&withdrawn), ListingOutcome::Withdrawn);
        assert_eq!(listing_outcome(&ComparableRow::default()), ListingOutcome::Closed);
    }
}
