//! Random forest classifier over sparse features.

use serde::Deserialize;

use super::sparse::SparseVector;
use super::{class_at, validate_classes, Classifier, Prediction};
use crate::error::InferenceError;

/// One node of a flattened decision tree.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum Node {
    /// Go to `left` when `x[feature] <= threshold`, else `right`.
    Split {
        /// Feature column.
        feature: usize,
        /// Split threshold.
        threshold: f64,
        /// Index of the left child.
        left: usize,
        /// Index of the right child.
        right: usize,
    },
    /// Per-class weights (sample counts or probabilities).
    Leaf {
        /// One weight per class.
        value: Vec<f64>,
    },
}

/// A single decision tree stored as a node array rooted at index 0.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionTree {
    /// Nodes; children always have a larger index than their parent.
    pub nodes: Vec<Node>,
}

impl DecisionTree {
    fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }

        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature}, model has {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child <= idx || child >= self.nodes.len() {
                            return Err(format!("node {idx} has invalid child {child}"));
                        }
                    }
                }
                Node::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(format!(
                            "leaf {idx} has {} weights, expected {n_classes}",
                            value.len()
                        ));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(format!("leaf {idx} has a negative or non-finite weight"));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(format!("leaf {idx} has zero total weight"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Leaf weights reached by `x`.
    fn leaf(&self, x: &SparseVector) -> Result<&[f64], InferenceError> {
        let mut idx = 0;
        loop {
            match self.nodes.get(idx) {
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let next = if x.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                    if next <= idx {
                        return Err(InferenceError::MalformedModel(format!(
                            "node {idx} points back to {next}"
                        )));
                    }
                    idx = next;
                }
                Some(Node::Leaf { value }) => return Ok(value.as_slice()),
                None => {
                    return Err(InferenceError::MalformedModel(format!(
                        "node {idx} does not exist"
                    )))
                }
            }
        }
    }
}

/// Serialized random forest.
#[derive(Debug, Clone, Deserialize)]
pub struct RandomForest {
    /// Input dimension.
    pub n_features: usize,
    /// Class labels, index-aligned with leaf weights.
    pub classes: Vec<i64>,
    /// Ensemble members.
    pub trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Check structural consistency. Called once at load time.
    pub fn validate(&self) -> Result<(), String> {
        validate_classes(&self.classes)?;
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features, self.classes.len())
                .map_err(|e| format!("tree {i}: {e}"))?;
        }
        Ok(())
    }

    /// Mean class probabilities over all trees.
    pub fn predict_proba(&self, x: &SparseVector) -> Result<Vec<f64>, InferenceError> {
        if x.dim() != self.n_features {
            return Err(InferenceError::DimensionMismatch {
                expected: self.n_features,
                actual: x.dim(),
            });
        }
        if self.trees.is_empty() {
            return Err(InferenceError::MalformedModel("forest has no trees".to_string()));
        }

        let mut proba = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            let leaf = tree.leaf(x)?;
            let total: f64 = leaf.iter().sum();
            if leaf.len() != proba.len() || total <= 0.0 {
                return Err(InferenceError::MalformedModel(
                    "leaf weights do not match classes".to_string(),
                ));
            }
            for (p, w) in proba.iter_mut().zip(leaf) {
                *p += w / total;
            }
        }

        let n_trees = self.trees.len() as f64;
        proba.iter_mut().for_each(|p| *p /= n_trees);
        Ok(proba)
    }
}

impl Classifier for RandomForest {
    fn predict(&self, features: &SparseVector) -> Result<Prediction, InferenceError> {
        let proba = self.predict_proba(features)?;

        // First maximum wins on ties.
        let best = proba
            .iter()
            .enumerate()
            .fold(0, |best, (i, p)| if *p > proba[best] { i } else { best });
        class_at(&self.classes, best)
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn describe(&self) -> String {
        format!(
            "random_forest(trees={}, features={})",
            self.trees.len(),
            self.n_features
        )
    }
}
