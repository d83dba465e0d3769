//! Domain layer: Core business types and logic.
//!
//! This module contains pure Rust types with no I/O.
//! Records are serializable and validated before they reach the model.

mod bmi;
mod history;
mod patient;
mod prediction;
mod validation;

pub use bmi::{body_mass_index, BmiCategory, BMI_BANDS};
pub use history::HistoryEntry;
pub use patient::{
    Categorical, ColumnValue, Frequency, Gender, PatientRecord, Transport, YesNo,
    CATEGORICAL_COLUMNS, COLUMN_NAMES,
};
pub use prediction::{
    explanation_for, ClassProbability, PredictionResult, ProbabilityDistribution,
    NO_EXPLANATION, OBESITY_LEVELS,
};
pub use validation::{NumericField, RawSubmission, ValidationError};
