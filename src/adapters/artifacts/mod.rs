//! JSON artifact adapter.
//!
//! Loads the three artifacts the training pipeline exports into an artifact
//! directory:
//! - `all_tuned_models.json`: tuned candidate models keyed by name
//! - `scaler.json`: the fitted feature scaler
//! - `label_encoders.json`: per-column label encoders plus the target encoder
//!
//! Loading is fail-fast: any missing file, parse error or inconsistency
//! between the artifacts aborts startup.

mod encoder;
pub mod manifest;
mod model;
mod scaler;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::domain::{CATEGORICAL_COLUMNS, COLUMN_NAMES};
use crate::ports::Classifier;

pub use encoder::{EncoderSet, LabelEncoder, TARGET_COLUMN};
pub use manifest::{IntegrityPolicy, IntegrityStatus};
pub use model::{ExportedModel, FlatTree};
pub use scaler::{FeatureScaler, ScalingError};

pub const MODELS_FILE: &str = "all_tuned_models.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const ENCODERS_FILE: &str = "label_encoders.json";

/// Errors raised while loading artifacts.
#[derive(Debug, thiserror::Error)]
pub enum ArtifactError {
    #[error("Artifact not found: {0:?}")]
    Missing(PathBuf),

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Inconsistent artifacts: {0}")]
    Inconsistent(String),

    #[error("Model {name:?} not found (available: {})", .available.join(", "))]
    ModelNotFound {
        name: String,
        available: Vec<String>,
    },

    #[error("Artifact integrity check failed: {0}")]
    Integrity(String),
}

pub(crate) fn read_artifact(path: &Path) -> Result<Vec<u8>, ArtifactError> {
    fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing(path.to_path_buf())
        } else {
            ArtifactError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })
}

fn parse_artifact<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let bytes = read_artifact(path)?;
    serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Options for [`ArtifactBundle::load`].
#[derive(Debug, Clone, Default)]
pub struct ArtifactOptions {
    /// Candidate to select from `all_tuned_models.json`
    pub model_name: String,
    pub integrity: IntegrityPolicy,
}

/// The loaded model, scaler and encoders. Immutable once built.
pub struct ArtifactBundle {
    model_name: String,
    classifier: Box<dyn Classifier>,
    scaler: FeatureScaler,
    encoders: EncoderSet,
}

impl std::fmt::Debug for ArtifactBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactBundle")
            .field("model_name", &self.model_name)
            .field("n_features", &self.classifier.n_features())
            .field("n_classes", &self.classifier.classes().len())
            .finish_non_exhaustive()
    }
}

impl ArtifactBundle {
    /// Assemble a bundle, checking that the pieces fit together.
    ///
    /// # Errors
    /// Returns `ArtifactError::Inconsistent` if the model width differs from
    /// the scaler, the scaler names an unknown column, a categorical column
    /// has no encoder, or a model class code cannot be decoded.
    pub fn new(
        model_name: impl Into<String>,
        classifier: Box<dyn Classifier>,
        scaler: FeatureScaler,
        encoders: EncoderSet,
    ) -> Result<Self, ArtifactError> {
        let inconsistent = |msg: String| Err(ArtifactError::Inconsistent(msg));

        scaler
            .check()
            .map_err(|e| ArtifactError::Inconsistent(format!("{SCALER_FILE}: {e}")))?;

        if classifier.n_features() != scaler.n_features() {
            return inconsistent(format!(
                "model expects {} features but the scaler has {}",
                classifier.n_features(),
                scaler.n_features()
            ));
        }

        match scaler.feature_names() {
            Some(names) => {
                if let Some(unknown) = names.iter().find(|n| !COLUMN_NAMES.contains(&n.as_str())) {
                    return inconsistent(format!("scaler expects unknown column {unknown:?}"));
                }
            }
            None if scaler.n_features() != COLUMN_NAMES.len() => {
                return inconsistent(format!(
                    "scaler has {} unnamed features; expected {}",
                    scaler.n_features(),
                    COLUMN_NAMES.len()
                ));
            }
            None => {}
        }

        if let Some(column) = CATEGORICAL_COLUMNS
            .iter()
            .find(|column| encoders.feature(column).is_none())
        {
            return inconsistent(format!("no label encoder for column {column:?}"));
        }

        if let Some(code) = classifier
            .classes()
            .iter()
            .find(|&&code| encoders.target().decode(code).is_none())
        {
            return inconsistent(format!(
                "model class code {code} is not decodable by the {TARGET_COLUMN} encoder"
            ));
        }

        Ok(Self {
            model_name: model_name.into(),
            classifier,
            scaler,
            encoders,
        })
    }

    /// Load and cross-check all artifacts from `dir`.
    ///
    /// # Errors
    /// Returns the first [`ArtifactError`] encountered.
    pub fn load(dir: &Path, options: &ArtifactOptions) -> Result<Self, ArtifactError> {
        tracing::info!("Loading artifacts from {:?}", dir);

        let status = manifest::verify_artifacts(dir, &options.integrity)?;
        tracing::debug!("Step 1: integrity {:?}", status);

        let mut candidates: BTreeMap<String, serde_json::Value> =
            parse_artifact(&dir.join(MODELS_FILE))?;
        let available: Vec<String> = candidates.keys().cloned().collect();
        tracing::debug!("Step 2: {} candidate models", available.len());

        let value = candidates
            .remove(&options.model_name)
            .ok_or_else(|| ArtifactError::ModelNotFound {
                name: options.model_name.clone(),
                available,
            })?;
        let model: ExportedModel =
            serde_json::from_value(value).map_err(|source| ArtifactError::Parse {
                path: dir.join(MODELS_FILE),
                source,
            })?;
        model.check().map_err(|e| {
            ArtifactError::Inconsistent(format!("model {:?}: {e}", options.model_name))
        })?;
        tracing::debug!("Step 3: selected {:?} ({})", options.model_name, model.kind());

        let scaler: FeatureScaler = parse_artifact(&dir.join(SCALER_FILE))?;
        let encoders: BTreeMap<String, LabelEncoder> =
            parse_artifact(&dir.join(ENCODERS_FILE))?;
        let encoders = EncoderSet::new(encoders)?;
        tracing::debug!("Step 4: scaler and encoders parsed");

        let bundle = Self::new(options.model_name.clone(), Box::new(model), scaler, encoders)?;
        tracing::info!(
            "Artifacts loaded: model {:?}, {} features, {} classes",
            bundle.model_name,
            bundle.classifier.n_features(),
            bundle.classifier.classes().len()
        );
        Ok(bundle)
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    #[must_use]
    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    #[must_use]
    pub fn scaler(&self) -> &FeatureScaler {
        &self.scaler
    }

    #[must_use]
    pub fn encoders(&self) -> &EncoderSet {
        &self.encoders
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OBESITY_LEVELS;

    const CATEGORICAL: [(&str, &[&str]); 8] = [
        ("Gender", &["Female", "Male"]),
        ("family_history_with_overweight", &["no", "yes"]),
        ("FAVC", &["no", "yes"]),
        ("CAEC", &["Always", "Frequently", "Sometimes", "no"]),
        ("SMOKE", &["no", "yes"]),
        ("SCC", &["no", "yes"]),
        ("CALC", &["Always", "Frequently", "Sometimes", "no"]),
        (
            "MTRANS",
            &["Automobile", "Bike", "Motorbike", "Public_Transportation", "Walking"],
        ),
    ];

    fn encoders_json(skip: Option<&str>) -> String {
        let mut map = serde_json::Map::new();
        for (column, classes) in CATEGORICAL {
            if Some(column) != skip {
                map.insert(column.to_string(), serde_json::json!({ "classes": classes }));
            }
        }
        map.insert(
            TARGET_COLUMN.to_string(),
            serde_json::json!({ "classes": OBESITY_LEVELS }),
        );
        serde_json::Value::Object(map).to_string()
    }

    fn scaler_json(width: usize) -> String {
        serde_json::json!({
            "kind": "standard",
            "feature_names_in": COLUMN_NAMES[..width],
            "mean": vec![0.0; width],
            "scale": vec![1.0; width],
        })
        .to_string()
    }

    fn models_json(width: usize) -> String {
        serde_json::json!({
            "Logistic Regression": {
                "kind": "logistic_regression",
                "classes": [0, 1, 2, 3, 4, 5, 6],
                "coef": vec![vec![0.0; width]; 7],
                "intercept": [0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0],
            }
        })
        .to_string()
    }

    fn write_dir(models: &str, scaler: &str, encoders: &str) -> tempfile::TempDir {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::write(dir.path().join(MODELS_FILE), models).expect("write");
        fs::write(dir.path().join(SCALER_FILE), scaler).expect("write");
        fs::write(dir.path().join(ENCODERS_FILE), encoders).expect("write");
        dir
    }

    fn options(name: &str) -> ArtifactOptions {
        ArtifactOptions {
            model_name: name.to_string(),
            integrity: IntegrityPolicy::default(),
        }
    }

    #[test]
    fn test_load_consistent_artifacts() {
        let dir = write_dir(&models_json(16), &scaler_json(16), &encoders_json(None));
        let bundle =
            ArtifactBundle::load(dir.path(), &options("Logistic Regression")).expect("Should load");
        assert_eq!(bundle.model_name(), "Logistic Regression");
        assert_eq!(bundle.classifier().n_features(), 16);
        assert!(bundle.classifier().supports_probabilities());
        assert_eq!(bundle.encoders().target().classes().len(), 7);
    }

    #[test]
    fn test_missing_file() {
        let dir = write_dir(&models_json(16), &scaler_json(16), &encoders_json(None));
        fs::remove_file(dir.path().join(SCALER_FILE)).expect("remove");
        let err = ArtifactBundle::load(dir.path(), &options("Logistic Regression"))
            .expect_err("Should fail");
        assert!(matches!(err, ArtifactError::Missing(p) if p.ends_with(SCALER_FILE)));
    }

    #[test]
    fn test_unknown_model_name_lists_candidates() {
        let dir = write_dir(&models_json(16), &scaler_json(16), &encoders_json(None));
        let err =
            ArtifactBundle::load(dir.path(), &options("Random Forest")).expect_err("Should fail");
        match err {
            ArtifactError::ModelNotFound { name, available } => {
                assert_eq!(name, "Random Forest");
                assert_eq!(available, vec!["Logistic Regression".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_width_mismatch_is_inconsistent() {
        let dir = write_dir(&models_json(15), &scaler_json(16), &encoders_json(None));
        let err = ArtifactBundle::load(dir.path(), &options("Logistic Regression"))
            .expect_err("Should fail");
        assert!(matches!(err, ArtifactError::Inconsistent(_)));
    }

    #[test]
    fn test_missing_encoder_is_inconsistent() {
        let dir = write_dir(&models_json(16), &scaler_json(16), &encoders_json(Some("CALC")));
        let err = ArtifactBundle::load(dir.path(), &options("Logistic Regression"))
            .expect_err("Should fail");
        assert!(matches!(err, ArtifactError::Inconsistent(msg) if msg.contains("CALC")));
    }

    #[test]
    fn test_malformed_json() {
        let dir = write_dir("{not json", &scaler_json(16), &encoders_json(None));
        let err = ArtifactBundle::load(dir.path(), &options("Logistic Regression"))
            .expect_err("Should fail");
        assert!(matches!(err, ArtifactError::Parse { .. }));
    }

    #[test]
    fn test_undecodable_class_code() {
        let models = serde_json::json!({
            "Linear SVC": {
                "kind": "linear_svc",
                "classes": [0, 9],
                "coef": vec![vec![0.0; 16]; 2],
                "intercept": [0.0, 0.0],
            }
        })
        .to_string();
        let dir = write_dir(&models, &scaler_json(16), &encoders_json(None));
        let err =
            ArtifactBundle::load(dir.path(), &options("Linear SVC")).expect_err("Should fail");
        assert!(matches!(err, ArtifactError::Inconsistent(msg) if msg.contains('9')));
    }
}
