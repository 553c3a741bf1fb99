use serde_json::Value;

use super::base::{NormalizerUtils, SourceNormalizer};
use crate::domain::{EntityKind, Specialty};
use crate::pipeline::processing::coerce::parse_count;
use crate::pipeline::processing::normalize::NormalizedEntity;

/// Normalizer for medical specialty records
#[derive(Debug, Default)]
pub struct SpecialtyNormalizer;

impl SpecialtyNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, raw: &Value) -> Specialty {
        self.build(raw, &mut Vec::new())
    }

    fn build(&self, raw: &Value, warnings: &mut Vec<String>) -> Specialty {
        let specialty = Specialty {
            external_id: NormalizerUtils::str_field(raw, &["id"]),
            name: NormalizerUtils::str_field(raw, &["label", "name"]),
            slug: NormalizerUtils::str_field(raw, &["slug"]),
            description: NormalizerUtils::str_field(raw, &["description"]),
            total_doctors: parse_count(NormalizerUtils::first_value(
                raw,
                &["doctors_count", "total_doctors"],
            )),
            icon_url: NormalizerUtils::str_field(raw, &["icon_url", "icon"]),
            secondary_icon_url: NormalizerUtils::str_field(
                raw,
                &["secondary_icon_url", "icon_secondary"],
            ),
            is_top_specialty: false,
        };

        NormalizerUtils::warn_if_empty(&specialty.slug, "slug", warnings);
        specialty
    }
}

impl SourceNormalizer for SpecialtyNormalizer {
    fn normalize(&self, raw: &Value, warnings: &mut Vec<String>) -> NormalizedEntity {
        NormalizedEntity::Specialty(self.build(raw, warnings))
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Specialty
    }

    fn name(&self) -> &str {
        "Specialty Normalizer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_transform_full_record() {
        let raw = json!({
            "id": 12,
            "label": "Cardiologist",
            "slug": "cardiologist",
            "description": "Heart specialists",
            "doctors_count": "1,204",
            "icon_url": "https://cdn.example.com/cardio.svg",
            "icon_secondary": "https://cdn.example.com/cardio-2.svg",
            "is_top": true
        });

        let specialty = SpecialtyNormalizer::new().transform(&raw);
        assert_eq!(specialty.external_id, "12");
        assert_eq!(specialty.name, "Cardiologist");
        assert_eq!(specialty.slug, "cardiologist");
        assert_eq!(specialty.total_doctors, 1204);
        assert_eq!(specialty.secondary_icon_url, "https://cdn.example.com/cardio-2.svg");
        // curation sets this, never the transform
        assert!(!specialty.is_top_specialty);
    }

    #[test]
    fn test_missing_fields_default() {
        let mut warnings = Vec::new();
        let entity = SpecialtyNormalizer::new().normalize(&json!({}), &mut warnings);
        let NormalizedEntity::Specialty(specialty) = entity else {
            panic!("expected a specialty");
        };
        assert_eq!(specialty.slug, "");
        assert_eq!(specialty.name, "");
        assert_eq!(specialty.total_doctors, 0);
        assert_eq!(warnings, vec!["missing slug".to_string()]);
    }
}
