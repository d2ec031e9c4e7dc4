//! Pipeline metrics recorded through the `metrics` facade.
//!
//! Without an installed recorder every call here is a no-op. The binary can
//! install a Prometheus recorder and print a snapshot after the run.

use ::metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::warn;

use crate::pipeline::source::SourceKind;

pub struct PipelineMetrics;

impl PipelineMetrics {
    pub fn record_run_started() {
        counter!("datamill_runs_total").increment(1);
    }

    pub fn record_source_success(kind: SourceKind) {
        counter!("datamill_sources_total", "kind" => kind.as_str(), "outcome" => "success").increment(1);
    }

    pub fn record_source_failure(kind: SourceKind, reason: &'static str) {
        counter!("datamill_sources_total", "kind" => kind.as_str(), "outcome" => reason).increment(1);
    }

    pub fn record_cache_hit() {
        counter!("datamill_cache_hits_total").increment(1);
    }

    pub fn record_retry() {
        counter!("datamill_transform_retries_total").increment(1);
    }

    pub fn record_run_duration(duration_secs: f64) {
        histogram!("datamill_run_duration_seconds").record(duration_secs);
    }
}

/// Install an in-process Prometheus recorder; returns `None` if one is already set.
pub fn install_recorder() -> Option<PrometheusHandle> {
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => Some(handle),
        Err(e) => {
            warn!("Prometheus recorder install failed: {}", e);
            None
        }
    }
}
