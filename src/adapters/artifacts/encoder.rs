//! Label encoders exported by the training pipeline.
//!
//! Each encoder maps a category string to its index in a sorted class list,
//! matching the fitted encoders the model was trained against.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::ArtifactError;

/// Column holding the target label in `label_encoders.json`.
pub const TARGET_COLUMN: &str = "NObeyesdad";

/// A fitted label encoder: sorted, unique class names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "EncoderParams", into = "EncoderParams")]
pub struct LabelEncoder {
    classes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct EncoderParams {
    classes: Vec<String>,
}

impl TryFrom<EncoderParams> for LabelEncoder {
    type Error = String;

    fn try_from(params: EncoderParams) -> Result<Self, Self::Error> {
        Self::from_classes(params.classes)
    }
}

impl From<LabelEncoder> for EncoderParams {
    fn from(encoder: LabelEncoder) -> Self {
        Self {
            classes: encoder.classes,
        }
    }
}

impl LabelEncoder {
    /// Build an encoder from its class list.
    ///
    /// # Errors
    /// Returns an error if the list is empty, unsorted or has duplicates.
    pub fn from_classes<S: Into<String>>(
        classes: impl IntoIterator<Item = S>,
    ) -> Result<Self, String> {
        let classes: Vec<String> = classes.into_iter().map(Into::into).collect();
        if classes.is_empty() {
            return Err("encoder has no classes".to_string());
        }
        if let Some(pair) = classes.windows(2).find(|w| w[0] >= w[1]) {
            return Err(format!(
                "encoder classes must be sorted and unique ({:?} before {:?})",
                pair[0], pair[1]
            ));
        }
        Ok(Self { classes })
    }

    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Code of a known category.
    #[must_use]
    pub fn encode(&self, value: &str) -> Option<i64> {
        self.classes
            .binary_search_by(|c| c.as_str().cmp(value))
            .ok()
            .map(|i| i as i64)
    }

    /// Position `value` would take if inserted into the sorted class list.
    #[must_use]
    pub fn insertion_code(&self, value: &str) -> i64 {
        self.classes.partition_point(|c| c.as_str() < value) as i64
    }

    /// Class name for a code.
    #[must_use]
    pub fn decode(&self, code: i64) -> Option<&str> {
        usize::try_from(code)
            .ok()
            .and_then(|i| self.classes.get(i))
            .map(String::as_str)
    }
}

/// All encoders from `label_encoders.json`, with the target split out.
#[derive(Debug, Clone)]
pub struct EncoderSet {
    features: BTreeMap<String, LabelEncoder>,
    target: LabelEncoder,
}

impl EncoderSet {
    /// Split a column → encoder map into feature encoders and the target.
    ///
    /// # Errors
    /// Returns `ArtifactError::Inconsistent` when the target entry is missing.
    pub fn new(mut encoders: BTreeMap<String, LabelEncoder>) -> Result<Self, ArtifactError> {
        let target = encoders.remove(TARGET_COLUMN).ok_or_else(|| {
            ArtifactError::Inconsistent(format!(
                "label encoders have no target entry {TARGET_COLUMN:?}"
            ))
        })?;
        Ok(Self {
            features: encoders,
            target,
        })
    }

    /// Encoder for a feature column.
    #[must_use]
    pub fn feature(&self, column: &str) -> Option<&LabelEncoder> {
        self.features.get(column)
    }

    #[must_use]
    pub fn target(&self) -> &LabelEncoder {
        &self.target
    }
}
