//! Reading artifacts from disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::forest::RandomForest;
use super::linear::LogisticRegression;
use super::tfidf::{TfidfParams, TfidfVectorizer};
use super::Classifier;
use crate::config::Config;
use crate::error::ArtifactError;

/// Locations of the two artifacts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// Serialized classifier.
    pub model: PathBuf,
    /// Serialized vectorizer.
    pub vectorizer: PathBuf,
}

impl ArtifactPaths {
    /// Create from explicit paths.
    pub fn new(model: impl Into<PathBuf>, vectorizer: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            vectorizer: vectorizer.into(),
        }
    }

    /// Fail with both expected names unless both files exist.
    pub fn ensure_present(&self) -> Result<(), ArtifactError> {
        if self.model.is_file() && self.vectorizer.is_file() {
            return Ok(());
        }
        Err(ArtifactError::Missing {
            model: self.model.display().to_string(),
            vectorizer: self.vectorizer.display().to_string(),
        })
    }
}

impl From<&Config> for ArtifactPaths {
    fn from(config: &Config) -> Self {
        Self::new(&config.model_path, &config.vectorizer_path)
    }
}

/// Serialized classifier, tagged by model family.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ModelArtifact {
    /// Averaged decision trees.
    RandomForest(RandomForest),
    /// Linear model with a logistic link.
    LogisticRegression(LogisticRegression),
}

impl ModelArtifact {
    /// Structural checks for the contained model.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::RandomForest(m) => m.validate(),
            Self::LogisticRegression(m) => m.validate(),
        }
    }

    /// Erase the concrete family.
    pub fn into_classifier(self) -> Box<dyn Classifier> {
        match self {
            Self::RandomForest(m) => Box::new(m),
            Self::LogisticRegression(m) => Box::new(m),
        }
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ArtifactError> {
    let raw = fs::read_to_string(path).map_err(|source| ArtifactError::Io {
        path: path.display().to_string(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ArtifactError::Parse {
        path: path.display().to_string(),
        source,
    })
}

/// Load and validate a classifier artifact.
pub fn load_classifier(path: &Path) -> Result<Box<dyn Classifier>, ArtifactError> {
    let artifact: ModelArtifact = read_json(path)?;
    artifact.validate().map_err(|reason| ArtifactError::Invalid {
        path: path.display().to_string(),
        reason,
    })?;
    let classifier = artifact.into_classifier();
    debug!(path = %path.display(), model = %classifier.describe(), "Classifier loaded");
    Ok(classifier)
}

/// Load and validate a TF-IDF vectorizer artifact.
pub fn load_vectorizer(path: &Path) -> Result<TfidfVectorizer, ArtifactError> {
    let params: TfidfParams = read_json(path)?;
    let vectorizer = TfidfVectorizer::try_from(params).map_err(|reason| ArtifactError::Invalid {
        path: path.display().to_string(),
        reason,
    })?;
    debug!(
        path = %path.display(),
        vocabulary = vectorizer.vocabulary_len(),
        "Vectorizer loaded"
    );
    Ok(vectorizer)
}
