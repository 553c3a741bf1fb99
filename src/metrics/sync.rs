use crate::domain::EntityKind;
use crate::metrics::phase_metric;
use crate::pipeline::processing::merge::MergeDecision;

/// Metrics collection for the sync (merge + upsert) phase
pub struct SyncMetrics;

impl SyncMetrics {
    pub fn record_upserted(kind: EntityKind) {
        ::metrics::counter!(phase_metric!(counter, "sync", "upserts"), "kind" => kind.as_str())
            .increment(1);
    }

    pub fn record_unchanged(kind: EntityKind) {
        ::metrics::counter!(phase_metric!(counter, "sync", "unchanged"), "kind" => kind.as_str())
            .increment(1);
    }

    /// Entity dropped before persistence because its business key was empty
    pub fn record_rejected(kind: EntityKind) {
        ::metrics::counter!(phase_metric!(counter, "sync", "rejected"), "kind" => kind.as_str())
            .increment(1);
    }

    pub fn record_store_error(kind: EntityKind) {
        ::metrics::counter!(phase_metric!(counter, "sync", "store_errors"), "kind" => kind.as_str())
            .increment(1);
    }

    pub fn record_merge_decision(decision: &MergeDecision) {
        ::metrics::counter!(phase_metric!(counter, "sync", "merge_decisions"), "decision" => decision.label())
            .increment(1);
    }

    pub fn record_stage_duration(kind: EntityKind, duration_secs: f64) {
        ::metrics::histogram!(phase_metric!(histogram, "sync", "stage_duration_seconds"), "kind" => kind.as_str())
            .record(duration_secs);
    }

    pub fn register_metrics() {
        use metrics::{describe_counter, describe_histogram, Unit};

        describe_counter!(
            phase_metric!(counter, "sync", "upserts"),
            Unit::Count,
            "Entities written to the store"
        );
        describe_counter!(
            phase_metric!(counter, "sync", "unchanged"),
            Unit::Count,
            "Entities skipped because the stored version is identical"
        );
        describe_counter!(
            phase_metric!(counter, "sync", "rejected"),
            Unit::Count,
            "Entities rejected for an empty business key"
        );
        describe_counter!(
            phase_metric!(counter, "sync", "store_errors"),
            Unit::Count,
            "Store failures during upsert"
        );
        describe_counter!(
            phase_metric!(counter, "sync", "merge_decisions"),
            Unit::Count,
            "Cross-city merge outcomes for doctors"
        );
        describe_histogram!(
            phase_metric!(histogram, "sync", "stage_duration_seconds"),
            Unit::Seconds,
            "Wall time per sync stage"
        );
    }
}
