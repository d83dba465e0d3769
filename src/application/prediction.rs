//! Prediction service: the request handler behind the form.
//!
//! One submission runs synchronously through:
//! 1. Parsing and range validation
//! 2. Encoding and scaling
//! 3. Classification (and probabilities, when the model supports them)
//! 4. Label decoding, BMI and explanation
//! 5. History append (successful requests only)

use std::sync::Arc;

use crate::adapters::ArtifactBundle;
use crate::domain::{
    HistoryEntry, PatientRecord, PredictionResult, ProbabilityDistribution, RawSubmission,
};
use crate::ports::{HistoryLog, ModelError};
use crate::Result;

use super::preprocess::{Preprocessor, UnknownCategory, UnknownCategoryPolicy};

/// Everything produced by one successful request.
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionOutcome {
    pub record: PatientRecord,
    pub result: PredictionResult,
    /// Unknown categories encoded with a fallback code
    pub warnings: Vec<UnknownCategory>,
}

/// Stateless request handler over loaded artifacts.
///
/// Holds no per-request state; the artifacts are shared read-only.
#[derive(Debug, Clone)]
pub struct PredictionService {
    artifacts: Arc<ArtifactBundle>,
    policy: UnknownCategoryPolicy,
}

impl PredictionService {
    #[must_use]
    pub fn new(artifacts: Arc<ArtifactBundle>, policy: UnknownCategoryPolicy) -> Self {
        Self { artifacts, policy }
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        self.artifacts.model_name()
    }

    #[must_use]
    pub fn supports_probabilities(&self) -> bool {
        self.artifacts.classifier().supports_probabilities()
    }

    /// Handle one form submission and record it on success.
    ///
    /// Nothing is appended to `history` when any step fails.
    ///
    /// # Errors
    /// Returns `ObesenseError::Input` for unparseable or out-of-range
    /// answers, and the preprocessing or model error otherwise.
    pub fn submit<H: HistoryLog + ?Sized>(
        &self,
        submission: &RawSubmission,
        history: &mut H,
    ) -> Result<PredictionOutcome> {
        let record = submission.parse().map_err(|e| {
            tracing::info!("Submission rejected: {e}");
            e
        })?;
        let outcome = self.predict(record)?;
        history.append(HistoryEntry::new(
            outcome.record.clone(),
            outcome.result.label.clone(),
        ));
        Ok(outcome)
    }

    /// Predict for an already-built record.
    ///
    /// # Errors
    /// Returns the first validation, preprocessing or model error.
    pub fn predict(&self, record: PatientRecord) -> Result<PredictionOutcome> {
        record.validate()?;

        tracing::debug!("Step 1: encoding and scaling");
        let encoded = Preprocessor::new(
            self.artifacts.encoders(),
            self.artifacts.scaler(),
            self.policy,
        )
        .preprocess(&record)?;

        tracing::debug!("Step 2: classifying with {}", self.artifacts.model_name());
        let classifier = self.artifacts.classifier();
        let code = classifier.predict(&encoded.features)?;
        let target = self.artifacts.encoders().target();
        let label = target
            .decode(code)
            .ok_or(ModelError::UnknownLabelCode(code))?
            .to_string();

        let probabilities = if classifier.supports_probabilities() {
            tracing::debug!("Step 3: estimating class probabilities");
            let scores = classifier.predict_proba(&encoded.features)?;
            let mut labelled = Vec::with_capacity(scores.len());
            for (&class_code, score) in classifier.classes().iter().zip(scores) {
                let class_label = target
                    .decode(class_code)
                    .ok_or(ModelError::UnknownLabelCode(class_code))?;
                labelled.push((class_label.to_string(), score));
            }
            let distribution = ProbabilityDistribution::from_scores(labelled);
            if distribution.is_none() {
                tracing::warn!("Model returned a degenerate probability vector; omitting it");
            }
            distribution
        } else {
            None
        };

        let result = PredictionResult::present(&record, label, probabilities);
        tracing::info!(
            "Prediction complete: label={}, probabilities={}, warnings={}",
            result.label,
            result.probabilities.is_some(),
            encoded.warnings.len()
        );

        Ok(PredictionOutcome {
            record,
            result,
            warnings: encoded.warnings,
        })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::fixed_service as service;
    use super::*;
    use crate::adapters::SessionHistory;
    use crate::domain::{BmiCategory, NumericField};
    use crate::ObesenseError;
    use approx::assert_relative_eq;

    #[test]
    fn test_submit_records_history() {
        let svc = service(1, Some(vec![0.1, 0.6, 0.1, 0.05, 0.05, 0.05, 0.05]));
        let mut history = SessionHistory::new();

        let outcome = svc
            .submit(&RawSubmission::default(), &mut history)
            .expect("Should predict");
        assert_eq!(outcome.result.label, "Normal_Weight");
        assert_eq!(outcome.result.bmi_category, BmiCategory::Overweight);
        let proba = outcome.result.probabilities.expect("Should have probabilities");
        assert_eq!(proba.len(), 7);
        assert_relative_eq!(
            proba.probability_of("Normal_Weight").expect("present"),
            0.6,
            epsilon = 1e-12
        );
        assert_eq!(history.len(), 1);
        assert_eq!(history.entries()[0].predicted_label, "Normal_Weight");
    }

    #[test]
    fn test_invalid_input_leaves_history_untouched() {
        let svc = service(1, None);
        let mut history = SessionHistory::new();
        let mut raw = RawSubmission::default();
        raw.age = "5".to_string();

        let err = svc.submit(&raw, &mut history).expect_err("Should reject");
        assert!(err.is_input_error());
        assert!(
            matches!(err, ObesenseError::Input(ref e) if e.field() == NumericField::Age),
            "{err}"
        );
        assert!(history.is_empty());
    }

    #[test]
    fn test_no_probabilities_when_unsupported() {
        let svc = service(6, None);
        assert!(!svc.supports_probabilities());
        let outcome = svc
            .predict(RawSubmission::default().parse().expect("Should parse"))
            .expect("Should predict");
        assert_eq!(outcome.result.label, "Overweight_Level_II");
        assert!(outcome.result.probabilities.is_none());
    }

    #[test]
    fn test_undecodable_prediction_is_fatal() {
        let svc = service(42, None);
        let mut history = SessionHistory::new();
        let err = svc
            .submit(&RawSubmission::default(), &mut history)
            .expect_err("Should fail");
        assert!(matches!(
            err,
            ObesenseError::Prediction(ModelError::UnknownLabelCode(42))
        ));
        assert!(history.is_empty());
    }

    #[test]
    fn test_predict_validates_records() {
        let svc = service(1, None);
        let mut record = RawSubmission::default().parse().expect("Should parse");
        record.height = 2.6;
        assert!(svc.predict(record).expect_err("Should reject").is_input_error());
    }
}
