//! Exported classifiers.
//!
//! The training pipeline exports each tuned candidate as a JSON document
//! tagged by `kind`. Trees use the flattened layout of the pipeline's tree
//! learner: parallel arrays indexed by node id, `children_left == -1` marks a
//! leaf, and a sample goes left when `x[feature] <= threshold`.

use serde::{Deserialize, Serialize};

use crate::ports::{Classifier, ModelError};

/// A decision tree stored as parallel node arrays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatTree {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions), one entry per class
    pub value: Vec<Vec<f64>>,
}

const LEAF: i64 = -1;

impl FlatTree {
    fn node_count(&self) -> usize {
        self.children_left.len()
    }

    fn check(&self, n_features: usize, n_classes: usize) -> Result<(), ModelError> {
        let n = self.node_count();
        if n == 0 {
            return Err(ModelError::Malformed("tree has no nodes".into()));
        }
        if [
            self.children_right.len(),
            self.feature.len(),
            self.threshold.len(),
            self.value.len(),
        ]
        .iter()
        .any(|&len| len != n)
        {
            return Err(ModelError::Malformed("tree arrays differ in length".into()));
        }

        for node in 0..n {
            if self.value[node].len() != n_classes {
                return Err(ModelError::Malformed(format!(
                    "node {node} has {} class weights, expected {n_classes}",
                    self.value[node].len()
                )));
            }
            if self.children_left[node] == LEAF {
                continue;
            }
            let in_range = |child: i64| child >= 0 && (child as usize) < n;
            if !in_range(self.children_left[node]) || !in_range(self.children_right[node]) {
                return Err(ModelError::Malformed(format!(
                    "node {node} has a child outside the tree"
                )));
            }
            let feature = self.feature[node];
            if feature < 0 || feature as usize >= n_features {
                return Err(ModelError::Malformed(format!(
                    "node {node} splits on feature {feature} of {n_features}"
                )));
            }
        }
        Ok(())
    }

    /// Normalized class distribution of the leaf `features` falls into.
    ///
    /// Bounds are checked on every step, so a tree that skipped
    /// [`ExportedModel::check`] fails with `Malformed` instead of panicking.
    fn leaf_distribution(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        let dangling =
            |node: usize| ModelError::Malformed(format!("node {node} is outside the tree"));
        let mut node = 0usize;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes.
        for _ in 0..=self.node_count() {
            let left = *self.children_left.get(node).ok_or_else(|| dangling(node))?;
            if left == LEAF {
                let weights = self.value.get(node).ok_or_else(|| dangling(node))?;
                let total: f64 = weights.iter().sum();
                if !(total > 0.0) {
                    return Err(ModelError::Malformed(format!(
                        "leaf {node} has no class weight"
                    )));
                }
                return Ok(weights.iter().map(|w| w / total).collect());
            }
            let feature = *self.feature.get(node).ok_or_else(|| dangling(node))?;
            let x = usize::try_from(feature)
                .ok()
                .and_then(|i| features.get(i))
                .ok_or_else(|| {
                    ModelError::Malformed(format!(
                        "node {node} splits on feature {feature} of {}",
                        features.len()
                    ))
                })?;
            let threshold = *self.threshold.get(node).ok_or_else(|| dangling(node))?;
            let next = if *x <= threshold {
                left
            } else {
                *self.children_right.get(node).ok_or_else(|| dangling(node))?
            };
            node = usize::try_from(next).map_err(|_| dangling(node))?;
        }
        Err(ModelError::Malformed("tree contains a cycle".into()))
    }
}

/// One exported candidate model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExportedModel {
    RandomForest {
        classes: Vec<i64>,
        n_features: usize,
        trees: Vec<FlatTree>,
    },
    DecisionTree {
        classes: Vec<i64>,
        n_features: usize,
        tree: FlatTree,
    },
    /// Multinomial logistic regression: softmax over `coef · x + intercept`
    LogisticRegression {
        classes: Vec<i64>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
    /// Linear SVM: argmax of the decision function, no probabilities
    LinearSvc {
        classes: Vec<i64>,
        coef: Vec<Vec<f64>>,
        intercept: Vec<f64>,
    },
}

impl ExportedModel {
    /// Check internal consistency.
    ///
    /// # Errors
    /// Returns `ModelError::Malformed` describing the first problem found.
    pub fn check(&self) -> Result<(), ModelError> {
        let classes = self.classes();
        if classes.is_empty() {
            return Err(ModelError::Malformed("model has no classes".into()));
        }
        let n_features = self.n_features();
        if n_features == 0 {
            return Err(ModelError::Malformed("model has no features".into()));
        }

        match self {
            Self::RandomForest { trees, .. } => {
                if trees.is_empty() {
                    return Err(ModelError::Malformed("forest has no trees".into()));
                }
                for (i, tree) in trees.iter().enumerate() {
                    tree.check(n_features, classes.len()).map_err(|e| {
                        ModelError::Malformed(format!("tree {i}: {e}"))
                    })?;
                }
            }
            Self::DecisionTree { tree, .. } => tree.check(n_features, classes.len())?,
            Self::LogisticRegression {
                coef, intercept, ..
            }
            | Self::LinearSvc {
                coef, intercept, ..
            } => {
                if coef.len() != classes.len() || intercept.len() != classes.len() {
                    return Err(ModelError::Malformed(format!(
                        "expected {} coefficient rows and intercepts",
                        classes.len()
                    )));
                }
                if coef.iter().any(|row| row.len() != n_features) {
                    return Err(ModelError::Malformed(
                        "coefficient rows differ in width".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Human-readable model family.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RandomForest { .. } => "random_forest",
            Self::DecisionTree { .. } => "decision_tree",
            Self::LogisticRegression { .. } => "logistic_regression",
            Self::LinearSvc { .. } => "linear_svc",
        }
    }

    fn ensure_width(&self, features: &[f64]) -> Result<(), ModelError> {
        let expected = self.n_features();
        if features.len() != expected {
            return Err(ModelError::FeatureCount {
                expected,
                got: features.len(),
            });
        }
        Ok(())
    }

    /// Raw per-class scores: probabilities for trees and logistic
    /// regression, decision values for the linear SVM.
    fn scores(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        self.ensure_width(features)?;
        match self {
            Self::RandomForest { trees, classes, .. } => {
                let mut sum = vec![0.0; classes.len()];
                for tree in trees {
                    for (acc, p) in sum.iter_mut().zip(tree.leaf_distribution(features)?) {
                        *acc += p;
                    }
                }
                let n = trees.len() as f64;
                Ok(sum.into_iter().map(|s| s / n).collect())
            }
            Self::DecisionTree { tree, .. } => tree.leaf_distribution(features),
            Self::LogisticRegression {
                coef, intercept, ..
            } => Ok(softmax(&linear_scores(coef, intercept, features))),
            Self::LinearSvc {
                coef, intercept, ..
            } => Ok(linear_scores(coef, intercept, features)),
        }
    }
}

fn linear_scores(coef: &[Vec<f64>], intercept: &[f64], features: &[f64]) -> Vec<f64> {
    coef.iter()
        .zip(intercept)
        .map(|(row, b)| row.iter().zip(features).map(|(w, x)| w * x).sum::<f64>() + b)
        .collect()
}

fn softmax(scores: &[f64]) -> Vec<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / total).collect()
}

/// Index of the first maximum.
fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        if v.is_nan() {
            return None;
        }
        if best.map_or(true, |(_, b)| v > b) {
            best = Some((i, v));
        }
    }
    best.map(|(i, _)| i)
}

impl Classifier for ExportedModel {
    fn n_features(&self) -> usize {
        match self {
            Self::RandomForest { n_features, .. } | Self::DecisionTree { n_features, .. } => {
                *n_features
            }
            Self::LogisticRegression { coef, .. } | Self::LinearSvc { coef, .. } => {
                coef.first().map_or(0, Vec::len)
            }
        }
    }

    fn classes(&self) -> &[i64] {
        match self {
            Self::RandomForest { classes, .. }
            | Self::DecisionTree { classes, .. }
            | Self::LogisticRegression { classes, .. }
            | Self::LinearSvc { classes, .. } => classes,
        }
    }

    fn predict(&self, features: &[f64]) -> Result<i64, ModelError> {
        let scores = self.scores(features)?;
        let best = argmax(&scores)
            .ok_or_else(|| ModelError::Malformed("model produced NaN scores".into()))?;
        self.classes().get(best).copied().ok_or_else(|| {
            ModelError::Malformed(format!("score {best} has no matching class"))
        })
    }

    fn supports_probabilities(&self) -> bool {
        !matches!(self, Self::LinearSvc { .. })
    }

    fn predict_proba(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        if !self.supports_probabilities() {
            return Err(ModelError::ProbabilitiesUnsupported);
        }
        self.scores(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// Splits on feature 0 at 0.5: left leaf favours class 0, right class 1.
    fn stump(left: [f64; 2], right: [f64; 2]) -> FlatTree {
        FlatTree {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![0, -2, -2],
            threshold: vec![0.5, -2.0, -2.0],
            value: vec![vec![1.0, 1.0], left.to_vec(), right.to_vec()],
        }
    }

    fn forest() -> ExportedModel {
        ExportedModel::RandomForest {
            classes: vec![3, 5],
            n_features: 1,
            trees: vec![stump([3.0, 1.0], [0.0, 4.0]), stump([1.0, 1.0], [1.0, 3.0])],
        }
    }

    #[test]
    fn test_forest_averages_trees() {
        let model = forest();
        model.check().expect("Well formed");

        let proba = model.predict_proba(&[0.2]).expect("Should predict");
        assert_relative_eq!(proba[0], (0.75 + 0.5) / 2.0);
        assert_relative_eq!(proba[1], (0.25 + 0.5) / 2.0);
        assert_eq!(model.predict(&[0.2]).expect("Should predict"), 3);
        assert_eq!(model.predict(&[0.9]).expect("Should predict"), 5);
    }

    #[test]
    fn test_threshold_goes_left() {
        let model = ExportedModel::DecisionTree {
            classes: vec![0, 1],
            n_features: 1,
            tree: stump([1.0, 0.0], [0.0, 1.0]),
        };
        assert_eq!(model.predict(&[0.5]).expect("Should predict"), 0);
    }

    #[test]
    fn test_feature_count_checked() {
        let err = forest().predict(&[0.1, 0.2]).expect_err("Should fail");
        assert_eq!(err, ModelError::FeatureCount { expected: 1, got: 2 });
    }

    #[test]
    fn test_logistic_regression_softmax() {
        let model = ExportedModel::LogisticRegression {
            classes: vec![0, 1, 2],
            coef: vec![vec![1.0], vec![0.0], vec![-1.0]],
            intercept: vec![0.0, 0.0, 0.0],
        };
        model.check().expect("Well formed");
        let proba = model.predict_proba(&[2.0]).expect("Should predict");
        assert_relative_eq!(proba.iter().sum::<f64>(), 1.0, epsilon = 1e-12);
        assert!(proba[0] > proba[1] && proba[1] > proba[2]);
        assert_eq!(model.predict(&[-2.0]).expect("Should predict"), 2);
    }

    #[test]
    fn test_linear_svc_has_no_probabilities() {
        let model = ExportedModel::LinearSvc {
            classes: vec![0, 1],
            coef: vec![vec![-1.0], vec![1.0]],
            intercept: vec![0.0, 0.0],
        };
        assert!(!model.supports_probabilities());
        assert_eq!(
            model.predict_proba(&[1.0]).expect_err("Should refuse"),
            ModelError::ProbabilitiesUnsupported
        );
        assert_eq!(model.predict(&[1.0]).expect("Should predict"), 1);
    }

    #[test]
    fn test_check_rejects_bad_trees() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.children_right[0] = 9;
        let model = ExportedModel::DecisionTree {
            classes: vec![0, 1],
            n_features: 1,
            tree,
        };
        assert!(matches!(model.check(), Err(ModelError::Malformed(_))));

        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.feature[0] = 4;
        let model = ExportedModel::DecisionTree {
            classes: vec![0, 1],
            n_features: 1,
            tree,
        };
        assert!(model.check().is_err());
    }

    #[test]
    fn test_unchecked_tree_fails_without_panicking() {
        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.feature[0] = 99;
        let model = ExportedModel::DecisionTree {
            classes: vec![0, 1],
            n_features: 1,
            tree,
        };
        assert!(matches!(
            model.predict(&[0.3]),
            Err(ModelError::Malformed(msg)) if msg.contains("feature 99")
        ));

        let mut tree = stump([1.0, 0.0], [0.0, 1.0]);
        tree.children_right[0] = -1;
        tree.value.truncate(1);
        let model = ExportedModel::DecisionTree {
            classes: vec![0, 1],
            n_features: 1,
            tree,
        };
        assert!(matches!(model.predict(&[0.9]), Err(ModelError::Malformed(_))));
        assert!(matches!(model.predict(&[0.1]), Err(ModelError::Malformed(_))));
    }

    #[test]
    fn test_cycle_is_detected() {
        let tree = FlatTree {
            children_left: vec![0],
            children_right: vec![0],
            feature: vec![0],
            threshold: vec![0.0],
            value: vec![vec![1.0]],
        };
        assert!(tree.leaf_distribution(&[0.0]).is_err());
    }

    #[test]
    fn test_argmax_prefers_first_maximum() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[]), None);
        assert_eq!(argmax(&[0.1, f64::NAN]), None);
    }

    #[test]
    fn test_deserialize_kind_tag() {
        let json = r#"{
            "kind": "linear_svc",
            "classes": [0, 1],
            "coef": [[1.0, 0.0], [0.0, 1.0]],
            "intercept": [0.0, 0.0]
        }"#;
        let model: ExportedModel = serde_json::from_str(json).expect("Should parse");
        assert_eq!(model.kind(), "linear_svc");
        assert_eq!(model.n_features(), 2);
    }
}
