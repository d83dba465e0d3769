//! Preprocessing: categorical encoding, column ordering and scaling.
//!
//! Turns a validated [`PatientRecord`] into the scaled feature vector the
//! model was trained on. Unknown categories never fail a request: they are
//! encoded with a fallback code and reported as [`UnknownCategory`] warnings.

use std::fmt;
use std::str::FromStr;

use crate::adapters::artifacts::{EncoderSet, FeatureScaler, ScalingError};
use crate::domain::{ColumnValue, PatientRecord, COLUMN_NAMES};

/// Code used for a category the encoder was not fitted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownCategoryPolicy {
    /// Position the value would take in the sorted class list
    #[default]
    SortedInsertion,
    /// Fixed `-1`
    Sentinel,
}

impl UnknownCategoryPolicy {
    pub const SENTINEL_CODE: i64 = -1;
}

impl FromStr for UnknownCategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "insert" | "insertion" | "sorted" => Ok(Self::SortedInsertion),
            "sentinel" => Ok(Self::Sentinel),
            other => Err(format!(
                "unknown category policy {other:?} (expected \"insert\" or \"sentinel\")"
            )),
        }
    }
}

/// A categorical value the encoder does not know, and the code used instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCategory {
    pub column: &'static str,
    pub value: &'static str,
    pub fallback_code: i64,
}

impl fmt::Display for UnknownCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Unknown value {:?} for {}; encoded as {}",
            self.value, self.column, self.fallback_code
        )
    }
}

/// Fatal preprocessing failures.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PreprocessError {
    #[error("No label encoder for column {0}")]
    MissingEncoder(&'static str),

    #[error("Scaler expects column {0:?}, which the record does not have")]
    MissingFeature(String),

    #[error("Scaler expects {expected} features, got {got}")]
    WidthMismatch { expected: usize, got: usize },

    #[error("Scaled value for {column} is not finite")]
    NonFinite { column: String },
}

impl From<ScalingError> for PreprocessError {
    fn from(err: ScalingError) -> Self {
        match err {
            ScalingError::WidthMismatch { expected, got } => Self::WidthMismatch { expected, got },
            ScalingError::NonFinite { column } => Self::NonFinite { column },
        }
    }
}

/// Scaled features for one record plus any encoding warnings.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedFeatureVector {
    /// In the scaler's column order
    pub features: Vec<f64>,
    pub warnings: Vec<UnknownCategory>,
}

/// Applies the fitted encoders and scaler to records.
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor<'a> {
    encoders: &'a EncoderSet,
    scaler: &'a FeatureScaler,
    policy: UnknownCategoryPolicy,
}

impl<'a> Preprocessor<'a> {
    #[must_use]
    pub fn new(
        encoders: &'a EncoderSet,
        scaler: &'a FeatureScaler,
        policy: UnknownCategoryPolicy,
    ) -> Self {
        Self {
            encoders,
            scaler,
            policy,
        }
    }

    /// Encode, reorder and scale `record`.
    ///
    /// # Errors
    /// Returns `PreprocessError` if an encoder is missing, the scaler names a
    /// column the record lacks, or scaling fails.
    pub fn preprocess(
        &self,
        record: &PatientRecord,
    ) -> Result<EncodedFeatureVector, PreprocessError> {
        let mut warnings = Vec::new();
        let mut encoded: Vec<(&'static str, f64)> = Vec::with_capacity(COLUMN_NAMES.len());

        for (column, value) in record.columns() {
            let numeric = match value {
                ColumnValue::Numeric(x) => x,
                ColumnValue::Category(category) => {
                    let encoder = self
                        .encoders
                        .feature(column)
                        .ok_or(PreprocessError::MissingEncoder(column))?;
                    match encoder.encode(category) {
                        Some(code) => code as f64,
                        None => {
                            let fallback_code = match self.policy {
                                UnknownCategoryPolicy::SortedInsertion => {
                                    encoder.insertion_code(category)
                                }
                                UnknownCategoryPolicy::Sentinel => {
                                    UnknownCategoryPolicy::SENTINEL_CODE
                                }
                            };
                            let warning = UnknownCategory {
                                column,
                                value: category,
                                fallback_code,
                            };
                            tracing::warn!("{warning}");
                            warnings.push(warning);
                            fallback_code as f64
                        }
                    }
                }
            };
            encoded.push((column, numeric));
        }

        let row = match self.scaler.feature_names() {
            Some(names) => names
                .iter()
                .map(|name| {
                    encoded
                        .iter()
                        .find(|(column, _)| *column == name.as_str())
                        .map(|(_, v)| *v)
                        .ok_or_else(|| PreprocessError::MissingFeature(name.clone()))
                })
                .collect::<Result<Vec<f64>, _>>()?,
            None => encoded.iter().map(|(_, v)| *v).collect(),
        };

        let features = self.scaler.transform(&row)?;
        Ok(EncodedFeatureVector { features, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::artifacts::{LabelEncoder, TARGET_COLUMN};
    use crate::domain::{RawSubmission, Transport, OBESITY_LEVELS};
    use std::collections::BTreeMap;

    fn encoders(mtrans: &[&str]) -> EncoderSet {
        let mut map = BTreeMap::new();
        let mut add = |column: &str, classes: &[&str]| {
            map.insert(
                column.to_string(),
                LabelEncoder::from_classes(classes.iter().copied()).expect("sorted"),
            );
        };
        add("Gender", &["Female", "Male"]);
        for column in ["family_history_with_overweight", "FAVC", "SMOKE", "SCC"] {
            add(column, &["no", "yes"]);
        }
        for column in ["CAEC", "CALC"] {
            add(column, &["Always", "Frequently", "Sometimes", "no"]);
        }
        add("MTRANS", mtrans);
        add(TARGET_COLUMN, &OBESITY_LEVELS);
        EncoderSet::new(map).expect("Should build")
    }

    fn identity(names: Option<Vec<&str>>, width: usize) -> FeatureScaler {
        FeatureScaler::Standard {
            feature_names_in: names.map(|n| n.into_iter().map(String::from).collect()),
            mean: vec![0.0; width],
            scale: vec![1.0; width],
        }
    }

    const ALL_TRANSPORT: [&str; 5] = [
        "Automobile",
        "Bike",
        "Motorbike",
        "Public_Transportation",
        "Walking",
    ];

    #[test]
    fn test_encodes_in_record_order_without_names() {
        let enc = encoders(&ALL_TRANSPORT);
        let scaler = identity(None, 16);
        let record = RawSubmission::default().parse().expect("Should parse");

        let out = Preprocessor::new(&enc, &scaler, UnknownCategoryPolicy::default())
            .preprocess(&record)
            .expect("Should preprocess");
        assert!(out.warnings.is_empty());
        // Gender=Male → 1, Age, Height, Weight, family_history=yes → 1
        assert_eq!(&out.features[..5], &[1.0, 25.0, 1.80, 85.0, 1.0]);
        // CAEC=no → 3, MTRANS=Automobile → 0
        assert_eq!(out.features[8], 3.0);
        assert_eq!(out.features[15], 0.0);
    }

    #[test]
    fn test_reorders_to_scaler_names() {
        let enc = encoders(&ALL_TRANSPORT);
        let scaler = identity(Some(vec!["Weight", "Gender", "Age"]), 3);
        let record = RawSubmission::default().parse().expect("Should parse");

        let out = Preprocessor::new(&enc, &scaler, UnknownCategoryPolicy::default())
            .preprocess(&record)
            .expect("Should preprocess");
        assert_eq!(out.features, vec![85.0, 1.0, 25.0]);
    }

    #[test]
    fn test_unknown_category_warns_and_continues() {
        let enc = encoders(&["Automobile", "Motorbike", "Walking"]);
        let scaler = identity(None, 16);
        let mut raw = RawSubmission::default();
        raw.transport = Transport::Bike;
        let record = raw.parse().expect("Should parse");

        let inserted = Preprocessor::new(&enc, &scaler, UnknownCategoryPolicy::SortedInsertion)
            .preprocess(&record)
            .expect("Should preprocess");
        assert_eq!(
            inserted.warnings,
            vec![UnknownCategory {
                column: "MTRANS",
                value: "Bike",
                fallback_code: 1,
            }]
        );
        assert_eq!(inserted.features[15], 1.0);

        let sentinel = Preprocessor::new(&enc, &scaler, UnknownCategoryPolicy::Sentinel)
            .preprocess(&record)
            .expect("Should preprocess");
        assert_eq!(sentinel.features[15], -1.0);
        assert_eq!(sentinel.warnings[0].fallback_code, -1);
    }

    #[test]
    fn test_unknown_scaler_column() {
        let enc = encoders(&ALL_TRANSPORT);
        let scaler = identity(Some(vec!["Age", "BMI"]), 2);
        let record = RawSubmission::default().parse().expect("Should parse");

        let err = Preprocessor::new(&enc, &scaler, UnknownCategoryPolicy::default())
            .preprocess(&record)
            .expect_err("Should fail");
        assert_eq!(err, PreprocessError::MissingFeature("BMI".to_string()));
    }

    #[test]
    fn test_scaling_failure_is_fatal() {
        let enc = encoders(&ALL_TRANSPORT);
        let scaler = identity(None, 15);
        let record = RawSubmission::default().parse().expect("Should parse");

        let err = Preprocessor::new(&enc, &scaler, UnknownCategoryPolicy::default())
            .preprocess(&record)
            .expect_err("Should fail");
        assert_eq!(err, PreprocessError::WidthMismatch { expected: 15, got: 16 });
    }

    #[test]
    fn test_policy_parsing() {
        assert_eq!(
            "insert".parse::<UnknownCategoryPolicy>(),
            Ok(UnknownCategoryPolicy::SortedInsertion)
        );
        assert_eq!(
            " Sentinel ".parse::<UnknownCategoryPolicy>(),
            Ok(UnknownCategoryPolicy::Sentinel)
        );
        assert!("drop".parse::<UnknownCategoryPolicy>().is_err());
    }
}
