//! Prometheus metrics for detection traffic.
//!
//! Metrics are labelled by outcome only; query text never reaches a label.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing::debug;

use crate::model::Prediction;

// === Metric Name Constants ===

/// Detection latency metric name.
pub const METRIC_DETECTION_LATENCY: &str = "detection_latency_ms";
/// Detections counter metric name.
pub const METRIC_DETECTIONS: &str = "detections_total";
/// Failed detections counter metric name.
pub const METRIC_DETECTION_ERRORS: &str = "detection_errors_total";

/// Describe all metrics. Call once at startup.
pub fn init_metrics() {
    describe_histogram!(
        METRIC_DETECTION_LATENCY,
        Unit::Milliseconds,
        "Vectorize + predict latency in milliseconds"
    );
    describe_counter!(
        METRIC_DETECTIONS,
        "Total number of classified queries by label"
    );
    describe_counter!(
        METRIC_DETECTION_ERRORS,
        "Total number of rejected or failed detections by kind"
    );

    debug!("Metrics initialized");
}

/// Install the global Prometheus recorder and return its render handle.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    init_metrics();
    Ok(handle)
}

/// Increment the detections counter for a verdict.
pub fn inc_detections(prediction: Prediction) {
    counter!(METRIC_DETECTIONS, "label" => prediction.label()).increment(1);
}

/// Increment the error counter for a failure kind.
pub fn inc_detection_errors(kind: &'static str) {
    counter!(METRIC_DETECTION_ERRORS, "kind" => kind).increment(1);
}

/// RAII guard for timing operations.
/// Automatically records latency when dropped.
pub struct LatencyTimer {
    start: Instant,
    metric_name: &'static str,
}

impl LatencyTimer {
    /// Create a new latency timer for the given metric.
    pub fn new(metric_name: &'static str) -> Self {
        Self {
            start: Instant::now(),
            metric_name,
        }
    }

    /// Get elapsed time in milliseconds (without recording).
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

impl Drop for LatencyTimer {
    fn drop(&mut self) {
        histogram!(self.metric_name).record(self.elapsed_ms());
    }
}

/// Create a latency timer for a detection.
pub fn timer_detection() -> LatencyTimer {
    LatencyTimer::new(METRIC_DETECTION_LATENCY)
}
