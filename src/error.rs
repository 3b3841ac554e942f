//! Unified error types for the detection service.

use thiserror::Error;

/// Unified error type for the detection service.
#[derive(Error, Debug)]
pub enum DetectorError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Configuration validation error.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Artifact loading error.
    #[error("artifact error: {0}")]
    Artifact(#[from] ArtifactError),

    /// Inference error.
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),
}

/// Errors raised while loading the model and vectorizer artifacts.
///
/// All of these are fatal at startup: the service never serves with a
/// partially loaded model.
#[derive(Error, Debug)]
pub enum ArtifactError {
    /// One or both artifact files do not exist.
    #[error("model or vectorizer files not found: make sure '{model}' and '{vectorizer}' are present")]
    Missing {
        /// Expected model file.
        model: String,
        /// Expected vectorizer file.
        vectorizer: String,
    },

    /// Reading an artifact failed.
    #[error("failed to read {path}: {source}")]
    Io {
        /// Artifact path.
        path: String,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// An artifact is not valid JSON or does not match the schema.
    #[error("failed to parse {path}: {source}")]
    Parse {
        /// Artifact path.
        path: String,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// An artifact parsed but is internally inconsistent.
    #[error("invalid artifact {path}: {reason}")]
    Invalid {
        /// Artifact path.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// Vectorizer output does not fit the classifier input.
    #[error("vectorizer produces {vectorizer} features but classifier expects {classifier}")]
    DimensionMismatch {
        /// Vectorizer output dimension.
        vectorizer: usize,
        /// Classifier input dimension.
        classifier: usize,
    },
}

/// Errors raised while classifying a single query.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InferenceError {
    /// Feature vector has the wrong dimension for the classifier.
    #[error("feature vector has {actual} dimensions, expected {expected}")]
    DimensionMismatch {
        /// Dimension the classifier was trained on.
        expected: usize,
        /// Dimension actually provided.
        actual: usize,
    },

    /// Classifier produced a class outside {0, 1}.
    #[error("classifier produced unknown class {0}")]
    UnknownClass(i64),

    /// Model structure is unusable at prediction time.
    #[error("malformed model: {0}")]
    MalformedModel(String),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, DetectorError>;
