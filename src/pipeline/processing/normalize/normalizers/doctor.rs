use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use super::base::{NormalizerUtils, SourceNormalizer};
use crate::domain::{Doctor, EntityKind, EntityRef, OrderedSet, Qualification};
use crate::pipeline::processing::coerce::{
    extract_year, parse_bool, parse_count, parse_number, parse_number_or_zero,
};
use crate::pipeline::processing::lookup::{HospitalLookup, SpecialtyLookup};
use crate::pipeline::processing::normalize::NormalizedEntity;

/// Normalizer for practitioner records.
///
/// Specialty and hospital references are resolved only through the lookup
/// tables it was built with; anything the tables do not know is dropped.
#[derive(Debug, Clone, Default)]
pub struct DoctorNormalizer {
    specialties: Arc<SpecialtyLookup>,
    hospitals: Arc<HospitalLookup>,
}

impl DoctorNormalizer {
    pub fn new(specialties: Arc<SpecialtyLookup>, hospitals: Arc<HospitalLookup>) -> Self {
        Self {
            specialties,
            hospitals,
        }
    }

    pub fn transform(&self, raw: &Value) -> Doctor {
        self.transform_at(raw, Utc::now(), &mut Vec::new())
    }

    /// Transform with an explicit sync timestamp
    pub fn transform_at(
        &self,
        raw: &Value,
        synced_at: DateTime<Utc>,
        warnings: &mut Vec<String>,
    ) -> Doctor {
        DoctorTransform {
            specialties: &self.specialties,
            hospitals: &self.hospitals,
        }
        .run(raw, synced_at, warnings)
    }
}

/// Borrowed lookup tables for a single transform
struct DoctorTransform<'a> {
    specialties: &'a SpecialtyLookup,
    hospitals: &'a HospitalLookup,
}

impl DoctorTransform<'_> {
    fn run(&self, raw: &Value, synced_at: DateTime<Utc>, warnings: &mut Vec<String>) -> Doctor {
        let external_id = NormalizerUtils::str_field(raw, &["id"]);
        let full_name = NormalizerUtils::str_field(raw, &["name", "full_name"]);
        NormalizerUtils::warn_if_empty(&external_id, "id", warnings);
        NormalizerUtils::warn_if_empty(&full_name, "name", warnings);

        let mut cities = OrderedSet::new();
        if let Some(city) = NormalizerUtils::opt_str_field(raw, &["city"]) {
            cities.insert(city);
        }

        let qualifications: Vec<Qualification> =
            NormalizerUtils::array_field(raw, &["qualifications"])
                .iter()
                .filter_map(parse_qualification)
                .collect();
        let qualification_names = qualification_names(raw, &qualifications);

        let schedules = ScheduleSummary::collect(
            NormalizerUtils::array_field(raw, &["distinct_schedules"]),
            self.hospitals,
            warnings,
        );

        Doctor {
            external_id,
            doctor_slug: NormalizerUtils::str_field(raw, &["doctor_slug", "slug"]),
            username: NormalizerUtils::str_field(raw, &["username"]),
            pseudo_id: NormalizerUtils::str_field(raw, &["pseudo_id"]),
            doctor_title: NormalizerUtils::str_field(raw, &["title", "doctor_title"]),
            full_name,
            gender: NormalizerUtils::str_field(raw, &["gender"]).to_lowercase(),
            profile_picture: NormalizerUtils::str_field(raw, &["profile_picture", "image_url"]),
            cities,
            years_of_experience: parse_number_or_zero(NormalizerUtils::first_value(
                raw,
                &["experience", "years_of_experience"],
            )),
            total_reviews: parse_count(NormalizerUtils::first_value(
                raw,
                &["reviews_count", "total_reviews"],
            )),
            average_rating: parse_number_or_zero(NormalizerUtils::first_value(
                raw,
                &["rating", "average_rating"],
            )),
            satisfaction_rate: parse_number_or_zero(NormalizerUtils::first_value(
                raw,
                &["satisfaction", "satisfaction_rate"],
            )),
            is_available_today: parse_bool(raw.get("available_today")),
            is_subscribed: parse_bool(NormalizerUtils::first_value(
                raw,
                &["is_subscribed", "subscribed"],
            )),
            doctor_preference: NormalizerUtils::str_field(
                raw,
                &["doctor_preference", "preference"],
            ),
            last_synced_at: synced_at,
            primary_specialty: self.resolve_primary_specialty(raw, warnings),
            specialties: self.resolve_specialties(raw, warnings),
            qualifications,
            qualification_names,
            hospitals: schedules.hospitals,
            consultation_modes: Some(schedules.consultation_modes).filter(|modes| !modes.is_empty()),
            consultation_fee: schedules.min_fee,
        }
    }

    fn resolve_primary_specialty(&self, raw: &Value, warnings: &mut Vec<String>) -> Option<EntityRef> {
        let slug = NormalizerUtils::first_value(raw, &["primary_speciality", "primary_specialty"])
            .and_then(NormalizerUtils::reference_slug)?;
        let resolved = self.specialties.resolve(&slug).cloned();
        if resolved.is_none() {
            debug!("primary specialty '{}' not in lookup table", slug);
            warnings.push(format!("unresolved primary specialty '{}'", slug));
        }
        resolved
    }

    /// Resolved references in input order; unknown slugs are dropped
    fn resolve_specialties(&self, raw: &Value, warnings: &mut Vec<String>) -> Vec<EntityRef> {
        let mut resolved = OrderedSet::new();
        for item in NormalizerUtils::array_field(raw, &["all_specialities", "all_specialties"]) {
            let Some(slug) = NormalizerUtils::reference_slug(item) else {
                continue;
            };
            match self.specialties.resolve(&slug) {
                Some(reference) => {
                    resolved.insert(reference.clone());
                }
                None => {
                    debug!("specialty '{}' not in lookup table", slug);
                    warnings.push(format!("unresolved specialty '{}'", slug));
                }
            }
        }
        resolved.into_vec()
    }
}

impl SourceNormalizer for DoctorNormalizer {
    fn normalize(&self, raw: &Value, warnings: &mut Vec<String>) -> NormalizedEntity {
        NormalizedEntity::Doctor(Box::new(self.transform_at(raw, Utc::now(), warnings)))
    }

    fn kind(&self) -> EntityKind {
        EntityKind::Doctor
    }

    fn name(&self) -> &str {
        "Doctor Normalizer"
    }
}

/// Transform one practitioner record against the given lookup tables
pub fn transform_doctor(
    raw: &Value,
    specialties: &SpecialtyLookup,
    hospitals: &HospitalLookup,
) -> Doctor {
    DoctorTransform {
        specialties,
        hospitals,
    }
    .run(raw, Utc::now(), &mut Vec::new())
}

fn parse_qualification(item: &Value) -> Option<Qualification> {
    match item {
        Value::Object(_) => Some(Qualification {
            degree: NormalizerUtils::str_field(item, &["degree"]),
            institution: NormalizerUtils::str_field(item, &["institute", "institution"]),
            year_from: extract_year(NormalizerUtils::first_value(item, &["session_from", "year_from"])),
            year_to: extract_year(NormalizerUtils::first_value(item, &["session_to", "year_to"])),
            is_verified: parse_bool(NormalizerUtils::first_value(item, &["is_verified", "verified"])),
        }),
        Value::String(degree) if !degree.trim().is_empty() => Some(Qualification {
            degree: degree.trim().to_string(),
            institution: String::new(),
            year_from: None,
            year_to: None,
            is_verified: false,
        }),
        _ => None,
    }
}

/// Explicit names when the source lists them (array or comma-separated),
/// otherwise the non-empty degrees
fn qualification_names(raw: &Value, qualifications: &[Qualification]) -> Vec<String> {
    let names: Vec<String> = match raw.get("qualification_names") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(NormalizerUtils::value_as_string)
            .collect(),
        Some(Value::String(joined)) => joined
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    };
    if !names.is_empty() {
        return names;
    }

    qualifications
        .iter()
        .map(|q| q.degree.clone())
        .filter(|degree| !degree.is_empty())
        .collect()
}

/// Single pass over a practitioner's schedules
#[derive(Debug, Default)]
struct ScheduleSummary {
    hospitals: OrderedSet<EntityRef>,
    /// Lowest parseable, non-negative fee; `None` rather than zero when no
    /// schedule carries one
    min_fee: Option<f64>,
    consultation_modes: OrderedSet<String>,
}

impl ScheduleSummary {
    fn collect(schedules: &[Value], hospitals: &HospitalLookup, warnings: &mut Vec<String>) -> Self {
        let mut summary = ScheduleSummary::default();

        for schedule in schedules {
            if let Some(name) = NormalizerUtils::opt_str_field(schedule, &["hospitalOrClinicName"]) {
                match hospitals.resolve(&name) {
                    Some(reference) => {
                        summary.hospitals.insert(reference.clone());
                    }
                    None => {
                        debug!("hospital '{}' not in lookup table", name);
                        warnings.push(format!("unresolved hospital '{}'", name));
                    }
                }
            }

            if let Some(fee) = parse_number(schedule.get("fee")).filter(|fee| *fee >= 0.0) {
                summary.min_fee = Some(summary.min_fee.map_or(fee, |current| current.min(fee)));
            }

            if let Some(mode) = NormalizerUtils::opt_str_field(schedule, &["consultationType"]) {
                summary.consultation_modes.insert(mode);
            }
        }

        summary
    }
}
