//! Binary logistic regression over sparse features.

use serde::Deserialize;

use super::sparse::SparseVector;
use super::{class_at, validate_classes, Classifier, Prediction};
use crate::error::InferenceError;

/// Serialized binary logistic regression.
#[derive(Debug, Clone, Deserialize)]
pub struct LogisticRegression {
    /// Input dimension.
    pub n_features: usize,
    /// Class labels; `classes[1]` is the positive class.
    pub classes: Vec<i64>,
    /// One weight per feature.
    pub coef: Vec<f64>,
    /// Bias term.
    #[serde(default)]
    pub intercept: f64,
}

impl LogisticRegression {
    /// Check structural consistency. Called once at load time.
    pub fn validate(&self) -> Result<(), String> {
        validate_classes(&self.classes)?;
        if self.coef.len() != self.n_features {
            return Err(format!(
                "coef has {} weights, expected {}",
                self.coef.len(),
                self.n_features
            ));
        }
        if !self.intercept.is_finite() || self.coef.iter().any(|w| !w.is_finite()) {
            return Err("weights must be finite".to_string());
        }
        Ok(())
    }

    /// Signed distance from the decision boundary.
    pub fn decision_function(&self, x: &SparseVector) -> Result<f64, InferenceError> {
        if x.dim() != self.n_features {
            return Err(InferenceError::DimensionMismatch {
                expected: self.n_features,
                actual: x.dim(),
            });
        }
        Ok(x.dot(&self.coef) + self.intercept)
    }
}

impl Classifier for LogisticRegression {
    fn predict(&self, features: &SparseVector) -> Result<Prediction, InferenceError> {
        let z = self.decision_function(features)?;
        class_at(&self.classes, usize::from(z > 0.0))
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn describe(&self) -> String {
        format!("logistic_regression(features={})", self.n_features)
    }
}
