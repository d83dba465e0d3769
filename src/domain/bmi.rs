//! Body mass index and its informational categories.
//!
//! The BMI banner is independent of the model's prediction.

use serde::{Deserialize, Serialize};

/// BMI category (WHO adult bands).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiCategory {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

/// Left-closed, right-open bands in ascending order.
pub const BMI_BANDS: [(f64, f64, BmiCategory); 4] = [
    (0.0, 18.5, BmiCategory::Underweight),
    (18.5, 25.0, BmiCategory::Normal),
    (25.0, 30.0, BmiCategory::Overweight),
    (30.0, f64::INFINITY, BmiCategory::Obese),
];

/// `weight / height²`, with weight in kg and height in meters.
#[must_use]
pub fn body_mass_index(weight_kg: f64, height_m: f64) -> f64 {
    weight_kg / (height_m * height_m)
}

impl BmiCategory {
    /// Bucket a BMI value. Values below every band (only reachable with
    /// non-positive inputs) fall into the lowest one.
    #[must_use]
    pub fn from_bmi(bmi: f64) -> Self {
        BMI_BANDS
            .iter()
            .find(|(low, high, _)| *low <= bmi && bmi < *high)
            .map_or(Self::Underweight, |(_, _, category)| *category)
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Underweight => "Underweight",
            Self::Normal => "Normal",
            Self::Overweight => "Overweight",
            Self::Obese => "Obese",
        }
    }
}

impl std::fmt::Display for BmiCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
