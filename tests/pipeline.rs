//! End-to-end requests against the demo artifacts in `models/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use approx::assert_relative_eq;
use obesense::adapters::artifacts::{ENCODERS_FILE, MODELS_FILE, SCALER_FILE};
use obesense::adapters::{ArtifactBundle, ArtifactError, ArtifactOptions, SessionHistory};
use obesense::application::{PredictionService, UnknownCategoryPolicy};
use obesense::domain::{BmiCategory, NumericField, RawSubmission, Transport, OBESITY_LEVELS};
use obesense::ports::HistoryLog;
use obesense::ObesenseError;

fn demo_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("models")
}

fn options(model_name: &str) -> ArtifactOptions {
    ArtifactOptions {
        model_name: model_name.to_string(),
        ..ArtifactOptions::default()
    }
}

fn service_from(dir: &Path, model_name: &str, policy: UnknownCategoryPolicy) -> PredictionService {
    let bundle = ArtifactBundle::load(dir, &options(model_name)).expect("Should load artifacts");
    PredictionService::new(Arc::new(bundle), policy)
}

fn service(model_name: &str) -> PredictionService {
    service_from(&demo_dir(), model_name, UnknownCategoryPolicy::default())
}

fn submission(weight: &str, height: &str) -> RawSubmission {
    RawSubmission {
        weight: weight.to_string(),
        height: height.to_string(),
        ..RawSubmission::default()
    }
}

#[test]
fn test_every_demo_model_loads() {
    for name in [
        "Random Forest",
        "Decision Tree",
        "Logistic Regression",
        "Linear SVC",
    ] {
        let svc = service(name);
        assert_eq!(svc.model_name(), name);
    }
}

#[test]
fn test_default_submission() {
    let svc = service("Random Forest");
    let mut history = SessionHistory::new();

    let outcome = svc
        .submit(&RawSubmission::default(), &mut history)
        .expect("Should predict");

    assert_relative_eq!(outcome.result.bmi, 26.234_567_901_234_566, epsilon = 1e-9);
    assert_eq!(outcome.result.bmi_category, BmiCategory::Overweight);
    assert_eq!(outcome.result.label, "Overweight_Level_I");
    assert!(outcome.result.explanation.contains("overweight level I"));
    assert!(outcome.warnings.is_empty());

    let proba = outcome
        .result
        .probabilities
        .expect("Random forest has probabilities");
    assert_eq!(proba.len(), OBESITY_LEVELS.len());
    let total: f64 = proba.iter().map(|c| c.probability).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-9);
    assert_relative_eq!(
        proba.probability_of("Overweight_Level_I").expect("present"),
        0.3642,
        epsilon = 1e-3
    );
}

#[test]
fn test_history_follows_submission_order() {
    let svc = service("Random Forest");
    let mut history = SessionHistory::new();
    let requests = [
        (submission("45", "1.70"), "Insufficient_Weight"),
        (submission("60", "1.70"), "Normal_Weight"),
        (submission("140", "1.70"), "Obesity_Type_II"),
    ];

    for (raw, expected) in &requests {
        let outcome = svc.submit(raw, &mut history).expect("Should predict");
        assert_eq!(outcome.result.label, *expected);
    }

    assert_eq!(history.len(), requests.len());
    for (entry, (raw, expected)) in history.entries().iter().zip(&requests) {
        assert_eq!(entry.predicted_label, *expected);
        assert_eq!(entry.record, raw.parse().expect("Should parse"));
    }
}

#[test]
fn test_out_of_range_age_appends_nothing() {
    let svc = service("Random Forest");
    let mut history = SessionHistory::new();
    let raw = RawSubmission {
        age: "5".to_string(),
        ..RawSubmission::default()
    };

    let err = svc.submit(&raw, &mut history).expect_err("Should reject");
    match err {
        ObesenseError::Input(e) => {
            assert_eq!(e.field(), NumericField::Age);
            assert_eq!(e.to_string(), "Age must be between 10 and 100 years");
        }
        other => panic!("Expected an input error, got {other}"),
    }
    assert!(history.is_empty());
}

#[test]
fn test_linear_svc_has_no_probabilities() {
    let svc = service("Linear SVC");
    assert!(!svc.supports_probabilities());
    let mut history = SessionHistory::new();

    let outcome = svc
        .submit(&RawSubmission::default(), &mut history)
        .expect("Should predict");
    assert_eq!(outcome.result.label, "Overweight_Level_I");
    assert!(outcome.result.probabilities.is_none());
    assert_eq!(history.len(), 1);
}

#[test]
fn test_logistic_regression_probabilities() {
    let svc = service("Logistic Regression");
    let outcome = svc
        .predict(submission("45", "1.70").parse().expect("Should parse"))
        .expect("Should predict");
    assert_eq!(outcome.result.label, "Insufficient_Weight");
    assert_eq!(outcome.result.bmi_category, BmiCategory::Underweight);

    let proba = outcome.result.probabilities.expect("Should have probabilities");
    let best = proba
        .iter()
        .max_by(|a, b| a.probability.total_cmp(&b.probability))
        .expect("non-empty");
    assert_eq!(best.label, "Insufficient_Weight");
}

fn copy_demo_artifacts(to: &Path) {
    for name in [MODELS_FILE, SCALER_FILE, ENCODERS_FILE] {
        fs::copy(demo_dir().join(name), to.join(name)).expect("Should copy artifact");
    }
}

#[test]
fn test_unknown_category_warns_and_completes() {
    let tmp = tempfile::tempdir().expect("Should create temp dir");
    copy_demo_artifacts(tmp.path());

    // Encoder fitted without any cyclists
    let path = tmp.path().join(ENCODERS_FILE);
    let mut encoders: serde_json::Value =
        serde_json::from_slice(&fs::read(&path).expect("Should read")).expect("Should parse");
    encoders["MTRANS"]["classes"] =
        serde_json::json!(["Automobile", "Motorbike", "Public_Transportation", "Walking"]);
    fs::write(&path, serde_json::to_vec(&encoders).expect("Should serialize")).expect("Should write");

    let raw = RawSubmission {
        transport: Transport::Bike,
        ..RawSubmission::default()
    };

    let svc = service_from(tmp.path(), "Random Forest", UnknownCategoryPolicy::SortedInsertion);
    let mut history = SessionHistory::new();
    let outcome = svc.submit(&raw, &mut history).expect("Should still predict");
    assert_eq!(outcome.warnings.len(), 1);
    assert_eq!(outcome.warnings[0].column, "MTRANS");
    assert_eq!(outcome.warnings[0].value, "Bike");
    assert_eq!(outcome.warnings[0].fallback_code, 1);
    assert!(OBESITY_LEVELS.contains(&outcome.result.label.as_str()));
    assert_eq!(history.len(), 1);

    let sentinel = service_from(tmp.path(), "Random Forest", UnknownCategoryPolicy::Sentinel);
    let outcome = sentinel
        .predict(raw.parse().expect("Should parse"))
        .expect("Should still predict");
    assert_eq!(outcome.warnings[0].fallback_code, -1);
}

#[test]
fn test_unknown_model_name_fails_load() {
    let err = ArtifactBundle::load(&demo_dir(), &options("Gradient Boosting"))
        .expect_err("Should fail");
    match err {
        ArtifactError::ModelNotFound { name, available } => {
            assert_eq!(name, "Gradient Boosting");
            assert!(available.contains(&"Random Forest".to_string()));
        }
        other => panic!("Expected ModelNotFound, got {other}"),
    }
}

#[test]
fn test_missing_artifact_fails_load() {
    let tmp = tempfile::tempdir().expect("Should create temp dir");
    copy_demo_artifacts(tmp.path());
    fs::remove_file(tmp.path().join(SCALER_FILE)).expect("Should remove");

    let err = ArtifactBundle::load(tmp.path(), &options("Random Forest")).expect_err("Should fail");
    assert!(matches!(err, ArtifactError::Missing(ref p) if p.ends_with(SCALER_FILE)));
}
