use serde_json::Value;

use super::base::{NormalizerUtils, SourceNormalizer};
use crate::domain::{EntityKind, Symptom};
use crate::pipeline::processing::coerce::parse_count;
use crate::pipeline::processing::normalize::NormalizedEntity;

/// Normalizer for symptom records. Symptom to specialty links are filled in
/// by a later stage.
#[derive(Debug, Default)]
pub struct SymptomNormalizer;

impl SymptomNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, raw: &Value) -> Symptom {
        self.build(raw, &mut Vec::new())
    }

    fn build(&self, raw: &Value, warnings: &mut Vec<String>) -> Symptom {
        let symptom = Symptom {
            external_id: NormalizerUtils::str_field(raw, &["id"]),
            name: NormalizerUtils::str_field(raw, &["label", "name"]),
            slug: NormalizerUtils::str_field(raw, &["slug"]),
            description: NormalizerUtils::str_field(raw, &["description"]),
            total_doctors: parse_count(NormalizerUtils::first_value(
                raw,
                &["doctors_count", "total_doctors"],
            )),
        };

        NormalizerUtils::warn_if_empty(&symptom.slug, "slug", warnings);
        symptom
    }
}

impl SourceNormalizer for SymptomNormalizer {
    fn normalize(&self, raw: &Value, warnings: &mut Vec<String>) -> NormalizedEntity {
        NormalizedEntity::Symptom(self.build(raw, warnings))
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Symptom
    }

    fn name(&self) -> &str {
        "Symptom Normalizer"
    }
}
