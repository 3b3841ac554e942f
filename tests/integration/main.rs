//! Integration tests for the SQL injection detection service.
//!
//! HTTP tests drive the router in-process against the fixture artifacts in
//! `tests/fixtures`. Startup tests run the compiled binary.

mod detect;
mod startup;

use std::path::PathBuf;

/// Absolute path of a fixture artifact.
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}
