use crate::domain::EntityKind;
use crate::metrics::phase_metric;

/// Metrics collection for the normalize phase
pub struct NormalizeMetrics;

impl NormalizeMetrics {
    /// Record one raw record transformed into a canonical entity
    pub fn record_normalized(kind: EntityKind) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "records"), "kind" => kind.as_str())
            .increment(1);
    }

    /// Record a tolerated data issue (unresolved reference, missing key, ...)
    pub fn warning_logged(kind: EntityKind) {
        ::metrics::counter!(phase_metric!(counter, "normalize", "warnings"), "kind" => kind.as_str())
            .increment(1);
    }

    pub fn register_metrics() {
        use metrics::{describe_counter, Unit};

        describe_counter!(
            phase_metric!(counter, "normalize", "records"),
            Unit::Count,
            "Raw records transformed into canonical entities"
        );
        describe_counter!(
            phase_metric!(counter, "normalize", "warnings"),
            Unit::Count,
            "Tolerated data issues seen while transforming"
        );
    }
}
