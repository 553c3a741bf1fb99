//! Metrics for the directory sync pipeline
//!
//! Each pipeline phase defines its metrics in a dedicated submodule. Recording
//! is a no-op until [`init_metrics`] installs the Prometheus recorder, so the
//! pure transformation code can record unconditionally.

pub mod normalize;
pub mod sync;

pub use normalize::NormalizeMetrics;
pub use sync::SyncMetrics;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::{Once, OnceLock};
use tracing::{info, warn};

static INIT: Once = Once::new();
static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Install the in-process Prometheus recorder. Idempotent.
pub fn init_metrics() {
    INIT.call_once(|| match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("METRICS: handle already stored");
            }
            NormalizeMetrics::register_metrics();
            SyncMetrics::register_metrics();
            info!("Prometheus recorder installed");
        }
        Err(e) => {
            warn!("Failed to install Prometheus recorder: {}", e);
        }
    });
}

/// Text exposition of everything recorded so far, if a recorder is installed
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

/// Builds metric names following `dsync_{phase}_{name}[_total]`
macro_rules! phase_metric {
    (counter, $phase:literal, $name:literal) => {
        concat!("dsync_", $phase, "_", $name, "_total")
    };
    (histogram, $phase:literal, $name:literal) => {
        concat!("dsync_", $phase, "_", $name)
    };
}

pub(crate) use phase_metric;
