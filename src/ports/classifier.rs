//! Classifier port: Trait for a pre-trained model.
//!
//! This trait abstracts the exported model format from the application logic.
//! Models operate on label codes; decoding to class names happens in the
//! application layer through the target encoder.

/// Errors raised while evaluating a model.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("Expected {expected} features, got {got}")]
    FeatureCount { expected: usize, got: usize },

    #[error("Model does not support probability estimates")]
    ProbabilitiesUnsupported,

    #[error("Model produced label code {0} that the target encoder cannot decode")]
    UnknownLabelCode(i64),

    #[error("Malformed model: {0}")]
    Malformed(String),
}

/// Trait for a fitted classifier.
///
/// Implementations are immutable after loading and shared read-only across
/// requests.
pub trait Classifier: Send + Sync {
    /// Number of features the model was fitted on.
    fn n_features(&self) -> usize;

    /// Label codes in the order used by [`Classifier::predict_proba`].
    fn classes(&self) -> &[i64];

    /// Predict the label code for one scaled feature vector.
    ///
    /// # Errors
    /// Returns `ModelError::FeatureCount` if the vector has the wrong width.
    fn predict(&self, features: &[f64]) -> Result<i64, ModelError>;

    /// Whether [`Classifier::predict_proba`] is available.
    fn supports_probabilities(&self) -> bool;

    /// Per-class probabilities, aligned with [`Classifier::classes`].
    ///
    /// # Errors
    /// Returns `ModelError::ProbabilitiesUnsupported` when the model has no
    /// probability estimates.
    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError>;
}
