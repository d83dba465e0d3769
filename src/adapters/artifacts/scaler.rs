//! Feature scaler exported by the training pipeline.
//!
//! Supports the two transforms the pipeline emits:
//! - `standard`: `(x - mean) / scale`
//! - `min_max`: `x * scale + min`

use serde::{Deserialize, Serialize};

/// Errors raised while applying the scaler to one request.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScalingError {
    #[error("Scaler expects {expected} features, got {got}")]
    WidthMismatch { expected: usize, got: usize },

    #[error("Scaled value for {column} is not finite")]
    NonFinite { column: String },
}

/// A fitted scaler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureScaler {
    Standard {
        /// Column order the scaler was fitted on, when exported
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
    MinMax {
        #[serde(default)]
        feature_names_in: Option<Vec<String>>,
        min: Vec<f64>,
        scale: Vec<f64>,
    },
}

impl FeatureScaler {
    /// Expected column order, if the scaler was fitted on named columns.
    #[must_use]
    pub fn feature_names(&self) -> Option<&[String]> {
        match self {
            Self::Standard {
                feature_names_in, ..
            }
            | Self::MinMax {
                feature_names_in, ..
            } => feature_names_in.as_deref(),
        }
    }

    /// Number of input features.
    #[must_use]
    pub fn n_features(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { min, .. } => min.len(),
        }
    }

    /// Check parameter shapes.
    ///
    /// # Errors
    /// Returns a description of the first inconsistency.
    pub fn check(&self) -> Result<(), String> {
        let (offset, scale) = match self {
            Self::Standard { mean, scale, .. } => (mean, scale),
            Self::MinMax { min, scale, .. } => (min, scale),
        };
        if offset.is_empty() {
            return Err("scaler has no features".to_string());
        }
        if offset.len() != scale.len() {
            return Err(format!(
                "scaler parameter lengths differ ({} vs {})",
                offset.len(),
                scale.len()
            ));
        }
        if let Some(names) = self.feature_names() {
            if names.len() != offset.len() {
                return Err(format!(
                    "scaler has {} feature names for {} features",
                    names.len(),
                    offset.len()
                ));
            }
        }
        if offset.iter().chain(scale.iter()).any(|v| !v.is_finite()) {
            return Err("scaler parameters must be finite".to_string());
        }
        Ok(())
    }

    /// Scale one row whose values are already in [`FeatureScaler::feature_names`] order.
    ///
    /// # Errors
    /// Returns `ScalingError` on a width mismatch or a non-finite result.
    pub fn transform(&self, row: &[f64]) -> Result<Vec<f64>, ScalingError> {
        let expected = self.n_features();
        if row.len() != expected {
            return Err(ScalingError::WidthMismatch {
                expected,
                got: row.len(),
            });
        }

        let scaled: Vec<f64> = match self {
            Self::Standard { mean, scale, .. } => row
                .iter()
                .zip(mean.iter().zip(scale))
                .map(|(x, (m, s))| {
                    // Zero variance columns are left centred but unscaled.
                    let s = if *s == 0.0 { 1.0 } else { *s };
                    (x - m) / s
                })
                .collect(),
            Self::MinMax { min, scale, .. } => row
                .iter()
                .zip(min.iter().zip(scale))
                .map(|(x, (m, s))| x * s + m)
                .collect(),
        };

        if let Some(i) = scaled.iter().position(|v| !v.is_finite()) {
            let column = self
                .feature_names()
                .and_then(|names| names.get(i).cloned())
                .unwrap_or_else(|| format!("#{i}"));
            return Err(ScalingError::NonFinite { column });
        }

        Ok(scaled)
    }
}
