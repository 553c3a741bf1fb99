use serde_json::Value;

use super::base::{NormalizerUtils, SourceNormalizer};
use crate::domain::{EntityKind, Service};
use crate::pipeline::processing::coerce::{parse_bool, parse_count};
use crate::pipeline::processing::normalize::NormalizedEntity;

/// Normalizer for medical service / procedure records
#[derive(Debug, Default)]
pub struct ServiceNormalizer;

impl ServiceNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, raw: &Value) -> Service {
        self.build(raw, &mut Vec::new())
    }

    fn build(&self, raw: &Value, warnings: &mut Vec<String>) -> Service {
        let service = Service {
            external_id: NormalizerUtils::str_field(raw, &["id"]),
            name: NormalizerUtils::str_field(raw, &["label", "name"]),
            slug: NormalizerUtils::str_field(raw, &["slug"]),
            description: NormalizerUtils::str_field(raw, &["description"]),
            total_doctors: parse_count(NormalizerUtils::first_value(
                raw,
                &["doctors_count", "total_doctors"],
            )),
            is_surgery: parse_bool(raw.get("is_surgery")),
        };

        NormalizerUtils::warn_if_empty(&service.slug, "slug", warnings);
        service
    }
}

impl SourceNormalizer for ServiceNormalizer {
    fn normalize(&self, raw: &Value, warnings: &mut Vec<String>) -> NormalizedEntity {
        NormalizedEntity::Service(self.build(raw, warnings))
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Service
    }

    fn name(&self) -> &str {
        "Service Normalizer"
    }
}
