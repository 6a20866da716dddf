//! Characteristic (per-feature) adjustments.
//!
//! Each feature is adjusted the same way for every row:
//!
//! - numeric: `(row - subject) * per_unit_weight`
//! - boolean: `(row - subject) * flat_weight`, with `true = 1`, `false = 0`
//! - view:    `weight[row] - weight[subject]`, unknown categories worth 0

use std::collections::BTreeMap;

use crate::domain::{AdjustmentWeights, Characteristics, Feature, FeatureValue};

/// Features that can be adjusted for this batch: covered by the weight table
/// and present on the subject.
pub fn active_features(subject: &Characteristics, weights: &AdjustmentWeights) -> Vec<Feature> {
    Feature::ALL
        .into_iter()
        .filter(|&f| weights.covers(f) && subject.value(f).is_some())
        .collect()
}

/// Adjustment for one feature, or `None` when it can't be computed.
pub fn feature_adjustment(
    feature: Feature,
    row: &Characteristics,
    subject: &Characteristics,
    weights: &AdjustmentWeights,
) -> Option<f64> {
    match (row.value(feature)?, subject.value(feature)?) {
        (FeatureValue::Numeric(r), FeatureValue::Numeric(s)) => {
            Some((r - s) * weights.unit_weight(feature)?)
        }
        (FeatureValue::Flag(r), FeatureValue::Flag(s)) => {
            Some((flag(r) - flag(s)) * weights.unit_weight(feature)?)
        }
        (FeatureValue::View(r), FeatureValue::View(s)) => {
            let table = weights.view.as_ref()?;
            Some(table.value(r) - table.value(s))
        }
        _ => None,
    }
}

/// Adjustments for all `features` that apply to this row.
pub fn feature_adjustments(
    features: &[Feature],
    row: &Characteristics,
    subject: &Characteristics,
    weights: &AdjustmentWeights,
) -> BTreeMap<Feature, f64> {
    features
        .iter()
        .filter_map(|&f| feature_adjustment(f, row, subject, weights).map(|v| (f, v)))
        .collect()
}

fn flag(value: bool) -> f64 {
    if value { 1.0 } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ViewQuality, ViewWeights};

    fn full(lot: f64, area: f64, baths: f64, garage: f64, pool: bool, basement: bool, view: ViewQuality) -> Characteristics {
        Characteristics {
            lot_size_sqft: Some(lot),
            living_area_sqft: Some(area),
            bathrooms: Some(baths),
            garage_spaces: Some(garage),
            pool: Some(pool),
            basement: Some(basement),
            view: Some(view),
        }
    }

    #[test]
    fn lot_size_example() {
        let row = Characteristics {
            lot_size_sqft: Some(8000.0),
            ..Characteristics::default()
        };
        let subject = Characteristics {
            lot_size_sqft: Some(7000.0),
            ..Characteristics::default()
        };
        let adj = feature_adjustment(Feature::LotSize, &row, &subject, &AdjustmentWeights::default());
        assert_eq!(adj, Some(1500.0));
    }

    #[test]
    fn boolean_and_view_features() {
        let weights = AdjustmentWeights::default();
        let row = full(7000.0, 1800.0, 2.0, 2.0, true, false, ViewQuality::Fair);
        let subject = full(7000.0, 2000.0, 3.0, 1.0, false, true, ViewQuality::Good);

        let adj = feature_adjustments(&Feature::ALL, &row, &subject, &weights);
        assert_eq!(adj[&Feature::LotSize], 0.0);
        assert_eq!(adj[&Feature::LivingArea], -10_000.0);
        assert_eq!(adj[&Feature::Bathrooms], -5_000.0);
        assert_eq!(adj[&Feature::Garage], 3_000.0);
        assert_eq!(adj[&Feature::Pool], 10_000.0);
        assert_eq!(adj[&Feature::Basement], -8_000.0);
        assert_eq!(adj[&Feature::View], -10_000.0);
    }

    #[test]
    fn unknown_view_category_is_worth_zero() {
        let weights = AdjustmentWeights {
            view: Some(ViewWeights { good: 15_000.0, fair: 5_000.0, poor: 1_000.0 }),
            ..AdjustmentWeights::default()
        };
        let row = Characteristics {
            view: Some(ViewQuality::Other),
            ..Characteristics::default()
        };
        let subject = Characteristics {
            view: Some(ViewQuality::Poor),
            ..Characteristics::default()
        };
        assert_eq!(feature_adjustment(Feature::View, &row, &subject, &weights), Some(-1_000.0));
    }

    #[test]
    fn missing_row_value_is_skipped() {
        let subject = full(7000.0, 2000.0, 3.0, 1.0, false, true, ViewQuality::Good);
        let row = Characteristics {
            bathrooms: Some(4.0),
            ..Characteristics::default()
        };
        let adj = feature_adjustments(&Feature::ALL, &row, &subject, &AdjustmentWeights::default());
        assert_eq!(adj.len(), 1);
        assert_eq!(adj[&Feature::Bathrooms], 5_000.0);
    }

    #[test]
    fn active_features_respect_subject_and_weights() {
        let weights = AdjustmentWeights {
            garage: None,
            ..AdjustmentWeights::default()
        };
        let subject = Characteristics {
            lot_size_sqft: Some(7000.0),
            garage_spaces: Some(2.0),
            pool: Some(false),
            ..Characteristics::default()
        };
        assert_eq!(active_features(&subject, &weights), vec![Feature::LotSize, Feature::Pool]);
    }
}
