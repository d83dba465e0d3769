//! # Obesense
//!
//! Terminal obesity-level predictor backed by externally trained model
//! artifacts.
//!
//! This crate provides:
//! - Validation of the 16 survey answers collected from a patient
//! - Categorical encoding and feature scaling using exported encoders/scaler
//! - Classification through a tuned model selected from an exported collection
//! - BMI bucketing, result explanations and a session-scoped history
//! - Terminal UI for local use
//!
//! ## Architecture
//!
//! The crate follows Hexagonal Architecture:
//! - `domain`: Core types (PatientRecord, validation rules, BMI, results)
//! - `ports`: Trait definitions at the model and history seams
//! - `adapters`: Concrete implementations (JSON artifacts, in-memory history)
//! - `application`: The stateless request handler and preprocessing
//! - `tui`: Terminal user interface

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod tui;

pub use domain::{BmiCategory, PatientRecord, PredictionResult, RawSubmission};

/// Result type for Obesense operations
pub type Result<T> = std::result::Result<T, ObesenseError>;

/// Main error type for Obesense
#[derive(Debug, thiserror::Error)]
pub enum ObesenseError {
    #[error("Invalid input: {0}")]
    Input(#[from] domain::ValidationError),

    #[error("Artifact error: {0}")]
    Artifact(#[from] adapters::ArtifactError),

    #[error("Preprocessing failed: {0}")]
    Preprocessing(#[from] application::PreprocessError),

    #[error("Prediction failed: {0}")]
    Prediction(#[from] ports::ModelError),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ObesenseError {
    /// Whether the failure was caused by the submitted values rather than
    /// by the artifacts or the model.
    #[must_use]
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}
