//! Read subject-property and weight-table JSON files.
//!
//! Both files may be partial: omitted keys fall back to `None`
//! (subject) or to the default weight (weights).

use std::fs::File;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::domain::{AdjustmentWeights, SubjectProperty};
use crate::error::AppError;

/// Read a subject property JSON file.
///
/// Example:
/// `{ "lot_size_sqft": 7000, "living_area_sqft": 2000, "bathrooms": 2, "pool": false, "view": "Good" }`
pub fn read_subject_json(path: &Path) -> Result<SubjectProperty, AppError> {
    read_json(path, "subject")
}

/// Read a weight-table JSON file (overrides on top of the defaults).
pub fn read_weights_json(path: &Path) -> Result<AdjustmentWeights, AppError> {
    read_json(path, "weights")
}

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open {what} JSON '{}': {e}", path.display())))?;
    serde_json::from_reader(file).map_err(|e| AppError::new(2, format!("Invalid {what} JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::domain::ViewQuality;

    #[test]
    fn reads_subject_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "lot_size_sqft": 7000, "bathrooms": 2.5, "basement": true, "view": "fair" }}"#).unwrap();

        let subject = read_subject_json(file.path()).unwrap();
        assert_eq!(subject.characteristics.lot_size_sqft, Some(7000.0));
        assert_eq!(subject.characteristics.bathrooms, Some(2.5));
        assert_eq!(subject.characteristics.basement, Some(true));
        assert_eq!(subject.characteristics.view, Some(ViewQuality::Fair));
        assert_eq!(subject.characteristics.garage_spaces, None);
    }

    #[test]
    fn reads_weight_overrides() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "garage": 4500, "view": {{ "good": 20000 }} }}"#).unwrap();

        let weights = read_weights_json(file.path()).unwrap();
        assert_eq!(weights.garage, Some(4500.0));
        assert_eq!(weights.bathroom, Some(5000.0));
        let view = weights.view.unwrap();
        assert_eq!(view.good, 20_000.0);
        assert_eq!(view.fair, 5_000.0);
    }

    #[test]
    fn invalid_json_is_input_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = read_weights_json(file.path()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().starts_with("Invalid weights JSON"));
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = read_subject_json(Path::new("definitely/not/here.json")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
