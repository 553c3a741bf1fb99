use chrono::Utc;
use serde_json::Value;

use crate::constants::DIRECTORY_SOURCE;
use crate::domain::EntityKind;
use crate::metrics::NormalizeMetrics;
use super::super::{NormalizationMetadata, NormalizedEntity, NormalizedRecord, RecordProvenance};

/// Base trait for entity-specific normalizers
pub trait SourceNormalizer: Send + Sync {
    /// Normalize one raw record, pushing tolerated data issues onto `warnings`
    fn normalize(&self, raw: &Value, warnings: &mut Vec<String>) -> NormalizedEntity;

    /// The entity kind this normalizer produces
    fn kind(&self) -> EntityKind;

    /// Get a human-readable name for this normalizer
    fn name(&self) -> &str;
}

/// A wrapper that adds metrics to any normalizer implementation
pub struct MetricsNormalizer<N: SourceNormalizer> {
    inner: N,
}

impl<N: SourceNormalizer> MetricsNormalizer<N> {
    pub fn new(inner: N) -> Self {
        Self { inner }
    }
}

impl<N: SourceNormalizer> SourceNormalizer for MetricsNormalizer<N> {
    fn normalize(&self, raw: &Value, warnings: &mut Vec<String>) -> NormalizedEntity {
        let already_warned = warnings.len();
        let entity = self.inner.normalize(raw, warnings);

        NormalizeMetrics::record_normalized(self.inner.kind());
        for _ in already_warned..warnings.len() {
            NormalizeMetrics::warning_logged(self.inner.kind());
        }

        entity
    }

    fn kind(&self) -> EntityKind {
        self.inner.kind()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Shared utilities for normalizers
pub struct NormalizerUtils;

impl NormalizerUtils {
    /// First non-empty string among `keys`, trimmed; numbers are rendered so
    /// numeric identifiers survive. Missing fields yield an empty string.
    pub fn str_field(data: &Value, keys: &[&str]) -> String {
        Self::opt_str_field(data, keys).unwrap_or_default()
    }

    pub fn opt_str_field(data: &Value, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| Self::value_as_string(data.get(*key)?))
    }

    /// First present value among `keys`, for handing to the coercion helpers
    pub fn first_value<'a>(data: &'a Value, keys: &[&str]) -> Option<&'a Value> {
        keys.iter()
            .filter_map(|key| data.get(*key))
            .find(|value| !value.is_null())
    }

    pub fn value_as_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.trim())
                .filter(|s| !s.is_empty())
                .map(|s| s.to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Array under the first present key; anything else is treated as empty
    pub fn array_field<'a>(data: &'a Value, keys: &[&str]) -> &'a [Value] {
        Self::first_value(data, keys)
            .and_then(|v| v.as_array())
            .map(|items| items.as_slice())
            .unwrap_or(&[])
    }

    /// Slug of a reference that may be a bare string or an object with a `slug`
    pub fn reference_slug(value: &Value) -> Option<String> {
        match value {
            Value::Object(_) => Self::opt_str_field(value, &["slug"]),
            other => Self::value_as_string(other),
        }
    }

    /// Create a base record provenance for a record at `record_path`
    pub fn create_provenance(record_path: &str) -> RecordProvenance {
        RecordProvenance {
            source: DIRECTORY_SOURCE.to_string(),
            record_path: record_path.to_string(),
            normalized_at: Utc::now(),
        }
    }

    pub fn create_record(
        entity: NormalizedEntity,
        provenance: RecordProvenance,
        warnings: Vec<String>,
        strategy: &str,
    ) -> NormalizedRecord {
        NormalizedRecord {
            entity,
            provenance,
            normalization: NormalizationMetadata {
                warnings,
                strategy: strategy.to_string(),
            },
        }
    }

    /// Note a missing business key without failing the transform
    pub fn warn_if_empty(value: &str, field: &str, warnings: &mut Vec<String>) {
        if value.is_empty() {
            warnings.push(format!("missing {}", field));
        }
    }
}
