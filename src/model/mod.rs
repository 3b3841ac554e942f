//! Inference artifacts: the fitted vectorizer and the trained classifier.
//!
//! Both are read from JSON files once at startup and never mutated after.
//! The [`Vectorizer`] and [`Classifier`] traits keep the detector independent
//! of the concrete model family, so tests can inject fakes.

pub mod forest;
pub mod linear;
pub mod loader;
pub mod sparse;
pub mod tfidf;

use strum::{Display, EnumString};

use crate::error::InferenceError;

pub use forest::RandomForest;
pub use linear::LogisticRegression;
pub use loader::{load_classifier, load_vectorizer, ArtifactPaths, ModelArtifact};
pub use sparse::SparseVector;
pub use tfidf::TfidfVectorizer;

/// Binary verdict for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
pub enum Prediction {
    /// Class 0.
    #[strum(serialize = "Benign")]
    Benign,
    /// Class 1.
    #[strum(serialize = "Malicious")]
    Malicious,
}

impl Prediction {
    /// Integer class as produced by the model.
    pub fn as_class(self) -> u8 {
        match self {
            Self::Benign => 0,
            Self::Malicious => 1,
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Benign => "Benign",
            Self::Malicious => "Malicious",
        }
    }
}

impl TryFrom<i64> for Prediction {
    type Error = InferenceError;

    fn try_from(class: i64) -> Result<Self, Self::Error> {
        match class {
            0 => Ok(Self::Benign),
            1 => Ok(Self::Malicious),
            other => Err(InferenceError::UnknownClass(other)),
        }
    }
}

/// Turns text into the feature row the classifier was trained on.
pub trait Vectorizer: Send + Sync {
    /// Transform a single document.
    fn transform(&self, text: &str) -> Result<SparseVector, InferenceError>;

    /// Output dimension.
    fn n_features(&self) -> usize;

    /// Short summary for logs.
    fn describe(&self) -> String;
}

/// Maps a feature row to a binary prediction.
pub trait Classifier: Send + Sync {
    /// Predict the class of a single row.
    fn predict(&self, features: &SparseVector) -> Result<Prediction, InferenceError>;

    /// Expected input dimension.
    fn n_features(&self) -> usize;

    /// Short summary for logs.
    fn describe(&self) -> String;
}

/// Binary models must be fitted on exactly the classes 0 and 1.
pub(crate) fn validate_classes(classes: &[i64]) -> Result<(), String> {
    if *classes != [0, 1] {
        return Err(format!("classes must be [0, 1], got {classes:?}"));
    }
    Ok(())
}

pub(crate) fn class_at(classes: &[i64], idx: usize) -> Result<Prediction, InferenceError> {
    let class = classes.get(idx).copied().ok_or_else(|| {
        InferenceError::MalformedModel(format!("no class at index {idx}"))
    })?;
    Prediction::try_from(class)
}
