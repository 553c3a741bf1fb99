use chrono::Utc;
use directory_sync::domain::{EntityRef, OrderedSet};
use directory_sync::pipeline::normalize::{DoctorNormalizer, HospitalNormalizer};
use directory_sync::pipeline::processing::coerce::{extract_year, parse_number};
use directory_sync::pipeline::processing::lookup::{HospitalLookup, SpecialtyLookup};
use directory_sync::pipeline::processing::merge::{CityMergeResolver, MergeDecision};
use directory_sync::pipeline::processing::normalize::normalizers::transform_doctor;
use serde_json::{json, Value};
use std::sync::Arc;

fn hospital_map() -> HospitalLookup {
    [("city hospital", EntityRef::from("H1"))].into_iter().collect()
}

fn specialty_map() -> SpecialtyLookup {
    [("cardio", EntityRef::from("id1"))].into_iter().collect()
}

#[test]
fn test_missing_optional_numbers_are_absent() {
    let record = json!({"fee": null, "year": "", "rating": "n/a"});
    for field in ["fee", "year", "rating", "not_there"] {
        assert_eq!(parse_number(record.get(field)), None, "{}", field);
        assert_eq!(extract_year(record.get(field)), None, "{}", field);
    }
    assert_eq!(parse_number(Some(&json!("NaN"))), None);
}

#[test]
fn test_hospital_coordinates_are_longitude_first() {
    let normalizer = HospitalNormalizer::new();
    for (lat, lon) in [(24.8607, 67.0011), (-33.8688, 151.2093), (0.0, 0.0)] {
        let hospital = normalizer.transform(&json!({"hospitalSlug": "h", "city": "c", "latitude": lat, "longitude": lon}));
        assert_eq!(hospital.location.unwrap().coordinates, [lon, lat]);
    }
}

#[test]
fn test_hospital_without_coordinates_omits_location_key() {
    let hospital = HospitalNormalizer::new().transform(&json!({"hospitalSlug": "abc", "city": "Lahore", "latitude": "31.5"}));
    let serialized = serde_json::to_value(&hospital).unwrap();
    assert!(serialized.get("location").is_none());
    assert_eq!(serialized["externalId"], "abc-lahore");
}

#[test]
fn test_doctor_transform_is_idempotent() {
    let raw = json!({
        "id": 42,
        "name": "Dr. Sana Malik",
        "city": "Lahore",
        "primary_speciality": "cardio",
        "all_specialities": ["cardio", "derm"],
        "qualifications": [{"degree": "MBBS", "institute": "KEMU", "session_from": "2001", "session_to": "2006"}],
        "distinct_schedules": [{"hospitalOrClinicName": "City Hospital", "fee": "Rs. 2,000", "consultationType": "In-person"}]
    });
    let normalizer = DoctorNormalizer::new(Arc::new(specialty_map()), Arc::new(hospital_map()));
    let synced_at = Utc::now();

    let first = normalizer.transform_at(&raw, synced_at, &mut Vec::new());
    let second = normalizer.transform_at(&raw, synced_at, &mut Vec::new());
    assert_eq!(first, second);

    let later = normalizer.transform(&raw);
    assert_eq!(
        serde_json::to_value(&first.qualifications).unwrap(),
        serde_json::to_value(&later.qualifications).unwrap()
    );
    assert_eq!(first.consultation_fee, later.consultation_fee);
}

#[test]
fn test_doctor_minimum_fee() {
    let raw = json!({
        "id": "d",
        "name": "Dr. Fee",
        "distinct_schedules": [
            {"hospitalOrClinicName": "A", "fee": 500},
            {"hospitalOrClinicName": "B", "fee": null},
            {"hospitalOrClinicName": "C", "fee": 300},
            {"hospitalOrClinicName": "D", "fee": "450"}
        ]
    });
    let doctor = transform_doctor(&raw, &SpecialtyLookup::empty(), &HospitalLookup::empty());
    assert_eq!(doctor.consultation_fee, Some(300.0));

    let raw = json!({"id": "d", "name": "Dr. Free", "distinct_schedules": [{"fee": "ask"}, {}]});
    let doctor = transform_doctor(&raw, &SpecialtyLookup::empty(), &HospitalLookup::empty());
    assert_eq!(doctor.consultation_fee, None);
    assert!(serde_json::to_value(&doctor).unwrap().get("consultationFee").is_none());
}

#[test]
fn test_unresolved_specialties_are_dropped() {
    let raw = json!({"id": "d", "name": "Dr. Derm", "all_specialities": ["cardio", "derm"]});
    let doctor = transform_doctor(&raw, &specialty_map(), &HospitalLookup::empty());
    assert_eq!(doctor.specialties, vec![EntityRef::from("id1")]);
}

#[test]
fn test_schedules_end_to_end() {
    let raw = json!({
        "id": "d-100",
        "name": "Dr. Karachi",
        "city": "Karachi",
        "distinct_schedules": [
            {"hospitalOrClinicName": "City Hospital", "fee": "1200", "consultationType": "Video"},
            {"hospitalOrClinicName": "City Hospital", "fee": 800, "consultationType": "In-person"}
        ]
    });
    let doctor = transform_doctor(&raw, &SpecialtyLookup::empty(), &hospital_map());

    assert_eq!(doctor.hospitals.into_vec(), vec![EntityRef::from("H1")]);
    assert_eq!(doctor.consultation_fee, Some(800.0));
    assert_eq!(
        doctor.consultation_modes.map(OrderedSet::into_vec),
        Some(vec!["Video".to_string(), "In-person".to_string()])
    );
}

fn doctor_in(city: &str) -> Value {
    json!({"id": "d-7", "name": "Dr. Traveler", "city": city})
}

#[test]
fn test_merge_is_order_insensitive_and_idempotent() {
    let empty = (SpecialtyLookup::empty(), HospitalLookup::empty());
    let lahore = transform_doctor(&doctor_in("Lahore"), &empty.0, &empty.1);
    let karachi = transform_doctor(&doctor_in("Karachi"), &empty.0, &empty.1);
    let resolver = CityMergeResolver::new();

    let forward = resolver.resolve(Some(&lahore), karachi.clone());
    let backward = resolver.resolve(Some(&karachi), lahore.clone());
    for merged in [&forward.entity.cities, &backward.entity.cities] {
        assert_eq!(merged.len(), 2);
        assert!(merged.contains(&"Lahore".to_string()));
        assert!(merged.contains(&"Karachi".to_string()));
    }

    let again = resolver.resolve(Some(&forward.entity), karachi);
    assert_eq!(again.entity.cities, forward.entity.cities);
    assert_eq!(again.decision, MergeDecision::CitiesUnchanged);
}
