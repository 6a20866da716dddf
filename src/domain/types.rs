//! Shared domain types.
//!
//! These types are kept small and serializable so they can be:
//!
//! - built once per run by the CSV loader
//! - passed through the adjustment engine without hidden state
//! - exported to CSV/JSON for spreadsheets and downstream scripts

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Default market trend (percent) applied when a comparable carries none.
pub const DEFAULT_MARKET_TREND_PCT: f64 = 7.0;

/// A logical input column.
///
/// Each column has a canonical header plus a few aliases seen in MLS exports.
/// Header matching is case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    ComparableId,
    ListDate,
    CloseDate,
    WithdrawnDate,
    ExpirationDate,
    ClosePrice,
    ListPrice,
    MarketTrend,
    SpLpRatio,
    LotSize,
    LivingArea,
    Bathrooms,
    GarageSpaces,
    Pool,
    Basement,
    View,
    Bedrooms,
    YearBuilt,
    PropertyType,
    City,
    Subdivision,
    SchoolDistrict,
    ReportedDom,
}

impl Column {
    pub const ALL: [Column; 23] = [
        Column::ComparableId,
        Column::ListDate,
        Column::CloseDate,
        Column::WithdrawnDate,
        Column::ExpirationDate,
        Column::ClosePrice,
        Column::ListPrice,
        Column::MarketTrend,
        Column::SpLpRatio,
        Column::LotSize,
        Column::LivingArea,
        Column::Bathrooms,
        Column::GarageSpaces,
        Column::Pool,
        Column::Basement,
        Column::View,
        Column::Bedrooms,
        Column::YearBuilt,
        Column::PropertyType,
        Column::City,
        Column::Subdivision,
        Column::SchoolDistrict,
        Column::ReportedDom,
    ];

    /// Canonical header name.
    pub fn header(self) -> &'static str {
        self.aliases()[0]
    }

    /// Accepted header spellings, canonical first.
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Column::ComparableId => &["Comparable ID", "MLS #", "ID"],
            Column::ListDate => &["List Date"],
            Column::CloseDate => &["Close Date"],
            Column::WithdrawnDate => &["Withdrawn Date"],
            Column::ExpirationDate => &["Expiration Date"],
            Column::ClosePrice => &["Close Price"],
            Column::ListPrice => &["List Price"],
            Column::MarketTrend => &["Market Trend (%)"],
            Column::SpLpRatio => &["SP/LP Ratio"],
            Column::LotSize => &["Lot Size (SF)", "Lot Size"],
            Column::LivingArea => &["Living Area (SF)", "SqFt"],
            Column::Bathrooms => &["Bathroom Count", "Baths Total", "Bathrooms"],
            Column::GarageSpaces => &["Garage Spaces", "Garage"],
            Column::Pool => &["Pool"],
            Column::Basement => &["Basement"],
            Column::View => &["View"],
            Column::Bedrooms => &["Bedrooms", "Beds"],
            Column::YearBuilt => &["Year Built"],
            Column::PropertyType => &["Property Type"],
            Column::City => &["City/Location", "City"],
            Column::Subdivision => &["Subdivision"],
            Column::SchoolDistrict => &["School District"],
            Column::ReportedDom => &["DOM", "CDOM"],
        }
    }
}

/// Set of logical columns present in an input file.
///
/// Resolved once per batch so that optional-column handling never has to be
/// re-checked per row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet(BTreeSet<Column>);

impl ColumnSet {
    pub fn contains(&self, column: Column) -> bool {
        self.0.contains(&column)
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// View quality of a property.
///
/// Labels other than Good/Fair/Poor are kept as `Other` and are worth nothing
/// in the view adjustment table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViewQuality {
    #[serde(alias = "good", alias = "GOOD")]
    Good,
    #[serde(alias = "fair", alias = "FAIR")]
    Fair,
    #[serde(alias = "poor", alias = "POOR")]
    Poor,
    #[serde(other)]
    Other,
}

impl ViewQuality {
    /// Total parse: unrecognized labels map to `Other`.
    pub fn parse(label: &str) -> Self {
        let label = label.trim();
        if label.eq_ignore_ascii_case("good") {
            ViewQuality::Good
        } else if label.eq_ignore_ascii_case("fair") {
            ViewQuality::Fair
        } else if label.eq_ignore_ascii_case("poor") {
            ViewQuality::Poor
        } else {
            ViewQuality::Other
        }
    }
}

/// A physical characteristic that carries a price adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    LotSize,
    LivingArea,
    Bathrooms,
    Garage,
    Pool,
    Basement,
    View,
}

impl Feature {
    pub const ALL: [Feature; 7] = [
        Feature::LotSize,
        Feature::LivingArea,
        Feature::Bathrooms,
        Feature::Garage,
        Feature::Pool,
        Feature::Basement,
        Feature::View,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Feature::LotSize => "Lot Size",
            Feature::LivingArea => "Living Area",
            Feature::Bathrooms => "Bathroom",
            Feature::Garage => "Garage",
            Feature::Pool => "Pool",
            Feature::Basement => "Basement",
            Feature::View => "View",
        }
    }

    /// Header of the per-feature column in the adjusted export.
    pub fn export_header(self) -> String {
        format!("{} Adjustment", self.display_name())
    }
}

/// Physical characteristics shared by comparables and the subject property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Characteristics {
    pub lot_size_sqft: Option<f64>,
    pub living_area_sqft: Option<f64>,
    pub bathrooms: Option<f64>,
    pub garage_spaces: Option<f64>,
    pub pool: Option<bool>,
    pub basement: Option<bool>,
    pub view: Option<ViewQuality>,
}

/// A single characteristic value, typed by how it is adjusted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FeatureValue {
    Numeric(f64),
    Flag(bool),
    View(ViewQuality),
}

impl Characteristics {
    pub fn value(&self, feature: Feature) -> Option<FeatureValue> {
        match feature {
            Feature::LotSize => self.lot_size_sqft.map(FeatureValue::Numeric),
            Feature::LivingArea => self.living_area_sqft.map(FeatureValue::Numeric),
            Feature::Bathrooms => self.bathrooms.map(FeatureValue::Numeric),
            Feature::Garage => self.garage_spaces.map(FeatureValue::Numeric),
            Feature::Pool => self.pool.map(FeatureValue::Flag),
            Feature::Basement => self.basement.map(FeatureValue::Flag),
            Feature::View => self.view.map(FeatureValue::View),
        }
    }
}

/// The property being appraised.
///
/// Every characteristic is optional; a missing one disables that feature's
/// adjustment for the whole batch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SubjectProperty {
    #[serde(flatten)]
    pub characteristics: Characteristics,
}

/// Reporting-only attributes of a listing (filters, grouping, summaries).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingMeta {
    pub bedrooms: Option<f64>,
    pub year_built: Option<i32>,
    pub property_type: Option<String>,
    pub city: Option<String>,
    pub subdivision: Option<String>,
    pub school_district: Option<String>,
    /// Days on market as reported by the MLS export (`DOM` / `CDOM`).
    pub reported_dom: Option<f64>,
}

/// One comparable sale, as loaded from the input table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ComparableRow {
    pub id: String,
    /// 1-based line in the input file (header is line 1); 0 when not read from a file.
    pub line: usize,
    pub list_date: Option<NaiveDate>,
    pub close_date: Option<NaiveDate>,
    pub withdrawn_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,

    pub close_price: Option<f64>,
    pub list_price: Option<f64>,
    pub market_trend_pct: Option<f64>,
    pub sp_lp_ratio: Option<f64>,

    pub characteristics: Characteristics,
    pub meta: ListingMeta,

    /// Original cells in input header order (for pass-through export).
    pub raw: Vec<String>,
}

/// A batch of comparables plus the schema it was read with.
#[derive(Debug, Clone, Default)]
pub struct ComparableBatch {
    /// Original header names, in input order.
    pub headers: Vec<String>,
    pub columns: ColumnSet,
    pub rows: Vec<ComparableRow>,
}

/// Direction of the market-condition adjustment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustmentType {
    Upward,
    Downward,
    None,
}

impl AdjustmentType {
    /// Classify by sign; exactly zero (or NaN) is `None`.
    pub fn from_percent(pct: f64) -> Self {
        if pct > 0.0 {
            AdjustmentType::Upward
        } else if pct < 0.0 {
            AdjustmentType::Downward
        } else {
            AdjustmentType::None
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AdjustmentType::Upward => "Upward",
            AdjustmentType::Downward => "Downward",
            AdjustmentType::None => "None",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// How a listing ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ListingOutcome {
    Expired,
    Withdrawn,
    Closed,
}

impl ListingOutcome {
    pub fn label(self) -> &'static str {
        match self {
            ListingOutcome::Expired => "Expired",
            ListingOutcome::Withdrawn => "Withdrawn",
            ListingOutcome::Closed => "Closed",
        }
    }
}

impl fmt::Display for ListingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A comparable plus every derived value.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustedRow {
    pub row: ComparableRow,

    pub days_on_market: Option<i64>,
    pub days_until_withdrawn: Option<i64>,
    pub days_until_expired: Option<i64>,

    /// Market trend actually used (row value or the configured default).
    pub market_trend_pct: f64,
    pub price_change_pct: f64,
    pub market_adjustment_pct: f64,
    pub adjustment_type: AdjustmentType,
    /// `None` when the row has no close price.
    pub price_after_market: Option<f64>,

    /// Adjustments for the features that could be computed on this row.
    pub feature_adjustments: BTreeMap<Feature, f64>,
    pub total_adjustments: f64,
    /// `None` when the row has no close price.
    pub final_adjusted_price: Option<f64>,

    pub outcome: ListingOutcome,
}

/// Flat dollar value per view category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewWeights {
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for ViewWeights {
    fn default() -> Self {
        Self {
            good: 15_000.0,
            fair: 5_000.0,
            poor: 0.0,
        }
    }
}

impl ViewWeights {
    pub fn value(&self, quality: ViewQuality) -> f64 {
        match quality {
            ViewQuality::Good => self.good,
            ViewQuality::Fair => self.fair,
            ViewQuality::Poor => self.poor,
            ViewQuality::Other => 0.0,
        }
    }
}

/// Per-unit (or flat) dollar values for each characteristic.
///
/// A `None` entry removes the feature from the model. In JSON, an omitted
/// key keeps the default and an explicit `null` disables the feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjustmentWeights {
    /// Dollars per square foot of lot.
    pub lot_size: Option<f64>,
    /// Dollars per square foot of living area.
    pub living_area: Option<f64>,
    /// Dollars per bathroom.
    pub bathroom: Option<f64>,
    /// Dollars per garage space.
    pub garage: Option<f64>,
    /// Flat dollars for having a pool.
    pub pool: Option<f64>,
    /// Flat dollars for having a basement.
    pub basement: Option<f64>,
    pub view: Option<ViewWeights>,
}

impl Default for AdjustmentWeights {
    fn default() -> Self {
        Self {
            lot_size: Some(1.50),
            living_area: Some(50.0),
            bathroom: Some(5_000.0),
            garage: Some(3_000.0),
            pool: Some(10_000.0),
            basement: Some(8_000.0),
            view: Some(ViewWeights::default()),
        }
    }
}

impl AdjustmentWeights {
    /// Whether the weight table carries an entry for `feature`.
    pub fn covers(&self, feature: Feature) -> bool {
        match feature {
            Feature::View => self.view.is_some(),
            _ => self.unit_weight(feature).is_some(),
        }
    }

    /// Per-unit weight for numeric and boolean features.
    pub fn unit_weight(&self, feature: Feature) -> Option<f64> {
        match feature {
            Feature::LotSize => self.lot_size,
            Feature::LivingArea => self.living_area,
            Feature::Bathrooms => self.bathroom,
            Feature::Garage => self.garage,
            Feature::Pool => self.pool,
            Feature::Basement => self.basement,
            Feature::View => None,
        }
    }
}

/// Configuration for a single engine call.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustConfig {
    pub default_market_trend_pct: f64,
    pub weights: AdjustmentWeights,
}

impl Default for AdjustConfig {
    fn default() -> Self {
        Self {
            default_market_trend_pct: DEFAULT_MARKET_TREND_PCT,
            weights: AdjustmentWeights::default(),
        }
    }
}

/// A non-blocking notice that a configuration default was substituted.
///
/// Each notice is emitted at most once per batch.
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    /// The input has no market-trend column; every row used the default.
    MarketTrendColumnMissing { default_pct: f64 },
    /// Some rows had an empty market-trend cell and used the default.
    MarketTrendValuesMissing { rows: usize, default_pct: f64 },
    /// No subject property was supplied; only market adjustments were applied.
    NoSubject,
    /// The subject lacks a characteristic; that feature contributes 0 everywhere.
    SubjectFeatureMissing(Feature),
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MarketTrendColumnMissing { default_pct } => write!(
                f,
                "`Market Trend (%)` column not found; using {default_pct:.2}% for every row."
            ),
            Notice::MarketTrendValuesMissing { rows, default_pct } => write!(
                f,
                "{rows} row(s) had no market trend; using {default_pct:.2}%."
            ),
            Notice::NoSubject => {
                write!(f, "No subject property supplied; characteristic adjustments skipped.")
            }
            Notice::SubjectFeatureMissing(feature) => write!(
                f,
                "Subject property has no {} value; {} adjustment skipped.",
                feature.display_name().to_lowercase(),
                feature.display_name().to_lowercase()
            ),
        }
    }
}

/// Attribute used for group comparisons in the market report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum GroupBy {
    PropertyType,
    Subdivision,
    SchoolDistrict,
    City,
}

impl GroupBy {
    pub fn display_name(self) -> &'static str {
        match self {
            GroupBy::PropertyType => "Property Type",
            GroupBy::Subdivision => "Subdivision",
            GroupBy::SchoolDistrict => "School District",
            GroupBy::City => "City/Location",
        }
    }

    pub fn column(self) -> Column {
        match self {
            GroupBy::PropertyType => Column::PropertyType,
            GroupBy::Subdivision => Column::Subdivision,
            GroupBy::SchoolDistrict => Column::SchoolDistrict,
            GroupBy::City => Column::City,
        }
    }

    pub fn value(self, meta: &ListingMeta) -> Option<&str> {
        match self {
            GroupBy::PropertyType => meta.property_type.as_deref(),
            GroupBy::Subdivision => meta.subdivision.as_deref(),
            GroupBy::SchoolDistrict => meta.school_district.as_deref(),
            GroupBy::City => meta.city.as_deref(),
        }
    }
}
