use anyhow::Result;
use directory_sync::app::ports::CatalogStorePort;
use directory_sync::app::{SyncBatch, SyncUseCase};
use directory_sync::config::Config;
use directory_sync::domain::{EntityKind, EntityRef};
use directory_sync::pipeline::storage::InMemoryStore;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use tempfile::{tempdir, NamedTempFile};

fn karachi_batch() -> SyncBatch {
    serde_json::from_value(json!({
        "specialties": [
            {"id": 1, "label": "Cardiologist", "slug": "cardiologist", "doctors_count": "1,204"},
            {"id": 2, "label": "Dermatologist", "slug": "dermatologist"}
        ],
        "hospitals": [
            {"hospitalName": "City Hospital", "hospitalSlug": "city-hospital", "city": "Karachi", "lat": "24.86", "lng": "67.00"},
            {"hospitalName": "Clinic Without Coordinates", "hospitalSlug": "cwc", "city": "Karachi"}
        ],
        "symptoms": [{"label": "Chest Pain", "slug": "chest-pain"}],
        "services": [{"label": "Angiography", "slug": "angiography", "is_surgery": "yes"}],
        "doctors": [{
            "id": "doc-1",
            "name": "Dr. Ayesha Khan",
            "city": "Karachi",
            "experience": "12",
            "rating": "4.8",
            "primary_speciality": "cardiologist",
            "all_specialities": ["cardiologist", "neurologist"],
            "qualifications": [
                {"degree": "MBBS", "institute": "DUHS", "session_from": "2004", "session_to": "2009", "is_verified": true},
                "FCPS"
            ],
            "distinct_schedules": [
                {"hospitalOrClinicName": "City Hospital", "fee": "1200", "consultationType": "Video"},
                {"hospitalOrClinicName": "city  hospital", "fee": 800, "consultationType": "In-person"},
                {"hospitalOrClinicName": "Unknown Clinic", "fee": "PKR 1,500", "consultationType": "Video"}
            ]
        }]
    }))
    .expect("valid batch")
}

#[tokio::test]
async fn test_end_to_end_batch() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let use_case = SyncUseCase::new(store.clone());

    let report = use_case.run(&karachi_batch(), &EntityKind::sync_order()).await?;
    assert_eq!(report.total_failed(), 0);
    for stage in &report.stages {
        assert_eq!(stage.committed(), stage.received, "{} stage lost records", stage.kind);
    }

    let snapshot = store.snapshot()?;
    let hospital_ref = snapshot
        .hospitals
        .iter()
        .find(|stored| stored.entity.slug == "city-hospital")
        .map(|stored| stored.id.clone())
        .expect("city hospital committed");
    let cardiology_ref = snapshot
        .specialties
        .iter()
        .find(|stored| stored.entity.slug == "cardiologist")
        .map(|stored| stored.id.clone())
        .expect("cardiologist committed");
    assert!(snapshot.services[0].entity.is_surgery);

    let doctor = store.find_doctor("doc-1").await?.expect("doctor committed");
    assert_eq!(doctor.primary_specialty, Some(cardiology_ref.clone()));
    assert_eq!(doctor.specialties, vec![cardiology_ref]);
    assert_eq!(doctor.hospitals.into_vec(), vec![hospital_ref]);
    assert_eq!(doctor.consultation_fee, Some(800.0));
    assert_eq!(doctor.qualification_names, vec!["MBBS".to_string(), "FCPS".to_string()]);
    assert_eq!(doctor.qualifications[0].year_from, Some(2004));
    assert_eq!(doctor.years_of_experience, 12.0);
    assert_eq!(doctor.average_rating, 4.8);

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_city_batches_keep_every_city() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let use_case = Arc::new(SyncUseCase::new(store.clone()));
    let cities = ["Lahore", "Karachi", "Islamabad", "Peshawar", "Quetta", "Multan"];

    let handles: Vec<_> = cities
        .iter()
        .map(|city| {
            let use_case = use_case.clone();
            let records = vec![json!({"id": "doc-shared", "name": "Dr. Everywhere", "city": city})];
            tokio::spawn(async move { use_case.sync_stage(EntityKind::Doctor, &records).await })
        })
        .collect();

    for handle in handles {
        let report = handle.await??;
        assert_eq!(report.failed, 0);
    }

    let doctor = store.find_doctor("doc-shared").await?.expect("doctor committed");
    assert_eq!(doctor.cities.len(), cities.len());
    for city in cities {
        assert!(doctor.cities.contains(&city.to_string()), "lost {}", city);
    }

    Ok(())
}

#[tokio::test]
async fn test_rerun_changes_nothing() -> Result<()> {
    let store = Arc::new(InMemoryStore::new());
    let use_case = SyncUseCase::new(store.clone());

    use_case.run(&karachi_batch(), &EntityKind::sync_order()).await?;
    let before = serde_json::to_value(store.snapshot()?.specialties)?;

    let report = use_case.run(&karachi_batch(), &EntityKind::sync_order()).await?;
    for stage in &report.stages {
        assert_eq!(stage.unchanged, stage.received, "{} changed on rerun", stage.kind);
    }
    assert_eq!(serde_json::to_value(store.snapshot()?.specialties)?, before);

    Ok(())
}

#[tokio::test]
async fn test_stages_from_config_file() -> Result<()> {
    let output = tempdir()?;
    let mut file = NamedTempFile::new()?;
    writeln!(
        file,
        "[sync]\noutput_dir = \"{}\"\nstages = [\"specialty\", \"doctor\"]",
        output.path().display()
    )?;
    let config = Config::load(file.path())?;

    let store = Arc::new(InMemoryStore::new());
    let use_case = SyncUseCase::with_config(store.clone(), &config.sync);
    let report = use_case.run(&karachi_batch(), &config.sync.stages).await?;

    assert_eq!(report.stages.len(), 2);
    assert!(report.stage(EntityKind::Hospital).is_none());

    // hospitals never ran, so no schedule resolves
    let doctor = store.find_doctor("doc-1").await?.expect("doctor committed");
    assert!(doctor.hospitals.is_empty());
    assert_eq!(doctor.specialties.len(), 1);

    let lookup = store.hospital_lookup().await?;
    assert!(lookup.resolve("City Hospital").is_none());
    assert_ne!(doctor.specialties[0], EntityRef::from(""));

    Ok(())
}
