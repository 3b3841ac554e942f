//! Query classification.
//!
//! A [`Detector`] owns the loaded vectorizer and classifier. It is built once
//! before the server starts and shared read-only between requests.

use tracing::{info, instrument};

use crate::error::{ArtifactError, InferenceError};
use crate::model::{
    load_classifier, load_vectorizer, ArtifactPaths, Classifier, Prediction, Vectorizer,
};

/// Result of classifying one query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// The submitted query, unchanged.
    pub query: String,
    /// Model verdict.
    pub prediction: Prediction,
}

impl Detection {
    /// Human-readable label for the verdict.
    pub fn label(&self) -> &'static str {
        self.prediction.label()
    }
}

/// Immutable inference context: one vectorizer feeding one classifier.
pub struct Detector {
    vectorizer: Box<dyn Vectorizer>,
    classifier: Box<dyn Classifier>,
}

impl std::fmt::Debug for Detector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Detector")
            .field("vectorizer", &self.vectorizer.describe())
            .field("classifier", &self.classifier.describe())
            .finish()
    }
}

impl Detector {
    /// Pair a vectorizer with a classifier, checking their dimensions agree.
    pub fn new(
        vectorizer: impl Vectorizer + 'static,
        classifier: impl Classifier + 'static,
    ) -> Result<Self, ArtifactError> {
        Self::from_boxed(Box::new(vectorizer), Box::new(classifier))
    }

    fn from_boxed(
        vectorizer: Box<dyn Vectorizer>,
        classifier: Box<dyn Classifier>,
    ) -> Result<Self, ArtifactError> {
        if vectorizer.n_features() != classifier.n_features() {
            return Err(ArtifactError::DimensionMismatch {
                vectorizer: vectorizer.n_features(),
                classifier: classifier.n_features(),
            });
        }
        Ok(Self {
            vectorizer,
            classifier,
        })
    }

    /// Load both artifacts from disk.
    ///
    /// Fails with [`ArtifactError::Missing`] naming both files if either is
    /// absent, before attempting to parse anything.
    #[instrument(skip_all, fields(model = %paths.model.display(), vectorizer = %paths.vectorizer.display()))]
    pub fn load(paths: &ArtifactPaths) -> Result<Self, ArtifactError> {
        paths.ensure_present()?;

        let classifier = load_classifier(&paths.model)?;
        let vectorizer = load_vectorizer(&paths.vectorizer)?;
        let detector = Self::from_boxed(Box::new(vectorizer), classifier)?;

        info!("Model and vectorizer loaded successfully");
        Ok(detector)
    }

    /// Classify a single query.
    ///
    /// The query is vectorized as-is; empty or unusual strings are not
    /// rejected here.
    pub fn classify(&self, query: &str) -> Result<Detection, InferenceError> {
        let features = self.vectorizer.transform(query)?;
        if features.dim() != self.classifier.n_features() {
            return Err(InferenceError::DimensionMismatch {
                expected: self.classifier.n_features(),
                actual: features.dim(),
            });
        }
        let prediction = self.classifier.predict(&features)?;

        Ok(Detection {
            query: query.to_string(),
            prediction,
        })
    }

    /// Vectorizer summary.
    pub fn vectorizer_info(&self) -> String {
        self.vectorizer.describe()
    }

    /// Classifier summary.
    pub fn classifier_info(&self) -> String {
        self.classifier.describe()
    }

    /// Shared feature dimension.
    pub fn n_features(&self) -> usize {
        self.classifier.n_features()
    }
}
