//! Prediction result types.
//!
//! Represents the presented output of one successful request.

use serde::{Deserialize, Serialize};

use super::bmi::{body_mass_index, BmiCategory};
use super::patient::PatientRecord;

/// Target classes in the order a label encoder fitted on the dataset
/// stores them (sorted).
pub const OBESITY_LEVELS: [&str; 7] = [
    "Insufficient_Weight",
    "Normal_Weight",
    "Obesity_Type_I",
    "Obesity_Type_II",
    "Obesity_Type_III",
    "Overweight_Level_I",
    "Overweight_Level_II",
];

/// Shown for labels without a canned explanation.
pub const NO_EXPLANATION: &str = "No explanation available.";

/// Canned explanation for a predicted label.
///
/// `Underweight` is accepted as an alias of `Insufficient_Weight` for target
/// encoders exported with that spelling.
#[must_use]
pub fn explanation_for(label: &str) -> &'static str {
    match label {
        "Insufficient_Weight" | "Underweight" => {
            "Your weight is below normal. Consider talking to a nutritionist about increasing your nutrient intake."
        }
        "Normal_Weight" => "Your weight is in the normal range. Keep up your healthy lifestyle!",
        "Overweight_Level_I" => {
            "You are at overweight level I. Consider a balanced diet and regular exercise."
        }
        "Overweight_Level_II" => {
            "You are at overweight level II. Changing your eating habits and increasing physical activity soon is recommended."
        }
        "Obesity_Type_I" => {
            "You are at obesity type I. Talk to a doctor about a weight-loss plan."
        }
        "Obesity_Type_II" => {
            "You are at obesity type II. See a doctor promptly for appropriate medical care."
        }
        "Obesity_Type_III" => {
            "You are at obesity type III (morbid). Urgent medical attention is needed to manage this condition."
        }
        _ => NO_EXPLANATION,
    }
}

/// Probability assigned to one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f64,
}

/// Per-class probabilities: non-negative and summing to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityDistribution {
    classes: Vec<ClassProbability>,
}

impl ProbabilityDistribution {
    /// Build a distribution from raw scores, clamping negatives to zero and
    /// renormalizing.
    ///
    /// Returns `None` if there are no classes, a score is not finite, or
    /// every score is zero.
    #[must_use]
    pub fn from_scores(scores: impl IntoIterator<Item = (String, f64)>) -> Option<Self> {
        let mut classes = Vec::new();
        for (label, score) in scores {
            if !score.is_finite() {
                return None;
            }
            classes.push(ClassProbability {
                label,
                probability: score.max(0.0),
            });
        }

        let total: f64 = classes.iter().map(|c| c.probability).sum();
        if classes.is_empty() || total <= 0.0 {
            return None;
        }
        for class in &mut classes {
            class.probability /= total;
        }
        Some(Self { classes })
    }

    pub fn iter(&self) -> impl Iterator<Item = &ClassProbability> {
        self.classes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Probability of `label`, if it is one of the classes.
    #[must_use]
    pub fn probability_of(&self, label: &str) -> Option<f64> {
        self.classes
            .iter()
            .find(|c| c.label == label)
            .map(|c| c.probability)
    }
}

/// Outcome of one prediction request as presented to the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Decoded class name
    pub label: String,

    /// Present only when the model supports probability estimates
    pub probabilities: Option<ProbabilityDistribution>,

    /// Body mass index derived from the submitted height and weight
    pub bmi: f64,

    pub bmi_category: BmiCategory,

    pub explanation: String,
}

impl PredictionResult {
    /// Assemble the presented result for `record`.
    #[must_use]
    pub fn present(
        record: &PatientRecord,
        label: impl Into<String>,
        probabilities: Option<ProbabilityDistribution>,
    ) -> Self {
        let label = label.into();
        let bmi = body_mass_index(record.weight, record.height);
        Self {
            explanation: explanation_for(&label).to_string(),
            label,
            probabilities,
            bmi,
            bmi_category: BmiCategory::from_bmi(bmi),
        }
    }
}
