use serde_json::Value;
use tracing::trace;

use super::base::{NormalizerUtils, SourceNormalizer};
use crate::domain::{EntityKind, GeoPoint, Hospital};
use crate::pipeline::processing::coerce::{parse_count, parse_number};
use crate::pipeline::processing::normalize::NormalizedEntity;

/// Normalizer for hospital and clinic records
#[derive(Debug, Default)]
pub struct HospitalNormalizer;

impl HospitalNormalizer {
    pub fn new() -> Self {
        Self
    }

    pub fn transform(&self, raw: &Value) -> Hospital {
        self.build(raw, &mut Vec::new())
    }

    /// Source id when present, otherwise `lowercase(slug-city)`
    pub fn derive_external_id(source_id: Option<String>, slug: &str, city: &str) -> String {
        source_id.unwrap_or_else(|| Hospital::derived_external_id(slug, city))
    }

    /// Both coordinates must parse or there is no location at all
    fn build_location(raw: &Value) -> Option<GeoPoint> {
        let latitude = parse_number(NormalizerUtils::first_value(raw, &["latitude", "lat"]));
        let longitude = parse_number(NormalizerUtils::first_value(raw, &["longitude", "lng", "lon"]));
        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Some(GeoPoint::new(longitude, latitude)),
            _ => None,
        }
    }

    fn build(&self, raw: &Value, warnings: &mut Vec<String>) -> Hospital {
        let slug = NormalizerUtils::str_field(raw, &["hospitalSlug", "slug"]);
        let city = NormalizerUtils::str_field(raw, &["city"]);
        let source_id = NormalizerUtils::opt_str_field(raw, &["id"]);
        let external_id = Self::derive_external_id(source_id, &slug, &city);

        let location = Self::build_location(raw);
        if location.is_none() {
            trace!("hospital {} has no usable coordinates", external_id);
            warnings.push("location omitted: coordinates missing or unparseable".to_string());
        }

        NormalizerUtils::warn_if_empty(&slug, "slug", warnings);

        Hospital {
            external_id,
            name: NormalizerUtils::str_field(raw, &["hospitalName", "name", "label"]),
            slug,
            address: NormalizerUtils::str_field(raw, &["address"]),
            city,
            profile_picture_url: NormalizerUtils::str_field(raw, &["profile_picture", "image_url"]),
            total_doctors: parse_count(NormalizerUtils::first_value(
                raw,
                &["doctors_count", "total_doctors"],
            )),
            location,
        }
    }
}

impl SourceNormalizer for HospitalNormalizer {
    fn normalize(&self, raw: &Value, warnings: &mut Vec<String>) -> NormalizedEntity {
        NormalizedEntity::Hospital(self.build(raw, warnings))
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Hospital
    }

    fn name(&self) -> &str {
        "Hospital Normalizer"
    }
}
