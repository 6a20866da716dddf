//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - input schema (`Column`, `ColumnSet`) and loaded rows (`ComparableRow`, `ComparableBatch`)
//! - the subject property and its `Characteristics`
//! - engine configuration (`AdjustConfig`, `AdjustmentWeights`)
//! - engine outputs (`AdjustedRow`, `Notice`)

pub mod types;

pub use types::*;
