//! SQL injection detection service.
//!
//! Serves a pre-trained text classifier over HTTP. A fitted TF-IDF vectorizer
//! turns the submitted query into a sparse feature row, a trained classifier
//! maps the row to class 0 or 1, and the class is reported as `Benign` or
//! `Malicious`.
//!
//! ```text
//! POST /detect {"query": "1 OR 1=1 --"}
//!   -> {"query": "1 OR 1=1 --", "prediction": 1, "label": "Malicious"}
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`model`]: Artifact formats, vectorizer and classifiers
//! - [`detector`]: The immutable inference context
//! - [`api`]: HTTP API, OpenAPI docs
//! - [`metrics`]: Prometheus metrics
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod detector;
pub mod error;
pub mod metrics;
pub mod model;
pub mod utils;

pub use config::Config;
pub use detector::{Detection, Detector};
pub use error::{DetectorError, Result};
