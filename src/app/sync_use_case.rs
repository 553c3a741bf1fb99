use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn, Instrument};

use crate::app::identity_locks::IdentityLocks;
use crate::app::ports::{CatalogStorePort, UpsertStatus, Upserted};
use crate::config::SyncConfig;
use crate::domain::{Doctor, EntityKind};
use crate::error::SyncError;
use crate::metrics::SyncMetrics;
use crate::pipeline::processing::catalog::validate_for_commit;
use crate::pipeline::processing::merge::{CityMergeResolver, MergeDecision};
use crate::pipeline::processing::normalize::{NormalizationRegistry, NormalizedEntity, RawRecord};

/// One ingestion batch as fetched from the directory API
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncBatch {
    pub specialties: Vec<RawRecord>,
    pub hospitals: Vec<RawRecord>,
    pub symptoms: Vec<RawRecord>,
    pub services: Vec<RawRecord>,
    pub doctors: Vec<RawRecord>,
}

impl SyncBatch {
    /// Read a batch file as written by the fetcher
    pub fn load(path: impl AsRef<Path>) -> crate::error::Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn records(&self, kind: EntityKind) -> &[RawRecord] {
        match kind {
            EntityKind::Specialty => &self.specialties,
            EntityKind::Hospital => &self.hospitals,
            EntityKind::Symptom => &self.symptoms,
            EntityKind::Service => &self.services,
            EntityKind::Doctor => &self.doctors,
        }
    }

    /// JSON field holding records of `kind`, used in provenance paths
    pub fn field_name(kind: EntityKind) -> &'static str {
        match kind {
            EntityKind::Specialty => "specialties",
            EntityKind::Hospital => "hospitals",
            EntityKind::Symptom => "symptoms",
            EntityKind::Service => "services",
            EntityKind::Doctor => "doctors",
        }
    }
}

/// Counters for one sync stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageReport {
    pub kind: EntityKind,
    pub received: usize,
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Dropped before persistence for an empty business key
    pub rejected: usize,
    /// Store failures
    pub failed: usize,
    /// Doctors whose stored cities grew in this stage
    pub cities_extended: usize,
    /// Tolerated data issues across all records of the stage
    pub warnings: usize,
}

impl StageReport {
    pub fn new(kind: EntityKind, received: usize) -> Self {
        Self {
            kind,
            received,
            created: 0,
            updated: 0,
            unchanged: 0,
            rejected: 0,
            failed: 0,
            cities_extended: 0,
            warnings: 0,
        }
    }

    fn record_status(&mut self, status: UpsertStatus) {
        match status {
            UpsertStatus::Created => self.created += 1,
            UpsertStatus::Updated => self.updated += 1,
            UpsertStatus::Unchanged => self.unchanged += 1,
        }
    }

    pub fn committed(&self) -> usize {
        self.created + self.updated + self.unchanged
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub stages: Vec<StageReport>,
}

impl SyncReport {
    pub fn stage(&self, kind: EntityKind) -> Option<&StageReport> {
        self.stages.iter().find(|stage| stage.kind == kind)
    }

    pub fn total_failed(&self) -> usize {
        self.stages.iter().map(|stage| stage.failed).sum()
    }
}

/// Result of committing one normalized entity
#[derive(Debug, Clone)]
pub struct Committed {
    pub upserted: Upserted,
    /// Present for doctors only
    pub merge: Option<MergeDecision>,
}

/// Use case driving raw directory records through normalization, cross-city
/// merging and upsert, stage by stage
pub struct SyncUseCase {
    store: Arc<dyn CatalogStorePort>,
    resolver: CityMergeResolver,
    locks: IdentityLocks,
    continue_on_store_error: bool,
}

impl SyncUseCase {
    pub fn new(store: Arc<dyn CatalogStorePort>) -> Self {
        Self {
            store,
            resolver: CityMergeResolver::new(),
            locks: IdentityLocks::new(),
            continue_on_store_error: true,
        }
    }

    pub fn with_config(store: Arc<dyn CatalogStorePort>, config: &SyncConfig) -> Self {
        Self {
            continue_on_store_error: config.continue_on_store_error,
            ..Self::new(store)
        }
    }

    /// Run the given stages over a batch, in the order given
    pub async fn run(&self, batch: &SyncBatch, stages: &[EntityKind]) -> Result<SyncReport> {
        let started_at = Utc::now();
        let mut reports = Vec::with_capacity(stages.len());

        for kind in stages {
            let span = tracing::info_span!("sync_stage", stage = %kind);
            reports.push(
                self.sync_stage(*kind, batch.records(*kind))
                    .instrument(span)
                    .await?,
            );
        }

        Ok(SyncReport {
            started_at,
            finished_at: Utc::now(),
            stages: reports,
        })
    }

    /// Normalize and commit every record of one kind.
    ///
    /// The doctor stage rebuilds the lookup tables from the store first, so it
    /// sees specialties and hospitals committed by earlier stages.
    pub async fn sync_stage(&self, kind: EntityKind, records: &[RawRecord]) -> Result<StageReport> {
        let start_time = std::time::Instant::now();
        info!("Starting {} stage with {} records", kind, records.len());

        let registry = match kind {
            EntityKind::Doctor => {
                let specialties = self.store.specialty_lookup().await?;
                let hospitals = self.store.hospital_lookup().await?;
                debug!(
                    "Lookup tables: {} specialties, {} hospitals",
                    specialties.len(),
                    hospitals.len()
                );
                NormalizationRegistry::with_lookups(Arc::new(specialties), Arc::new(hospitals))
            }
            _ => NormalizationRegistry::new(),
        };

        let mut report = StageReport::new(kind, records.len());

        for (index, raw) in records.iter().enumerate() {
            let record_path = format!("$.{}[{}]", SyncBatch::field_name(kind), index);
            let normalized = registry.normalize(kind, raw, &record_path)?;

            report.warnings += normalized.normalization.warnings.len();
            for warning in &normalized.normalization.warnings {
                debug!("{}: {}", record_path, warning);
            }

            match self.commit(normalized.entity).await {
                Ok(committed) => {
                    report.record_status(committed.upserted.status);
                    if matches!(committed.merge, Some(MergeDecision::CitiesExtended { .. })) {
                        report.cities_extended += 1;
                    }
                }
                Err(SyncError::Validation { reason, .. }) => {
                    warn!("Rejected {} at {}: {}", kind, record_path, reason);
                    SyncMetrics::record_rejected(kind);
                    report.rejected += 1;
                }
                Err(e) => {
                    error!("Failed to commit {} at {}: {}", kind, record_path, e);
                    SyncMetrics::record_store_error(kind);
                    report.failed += 1;
                    if !self.continue_on_store_error {
                        return Err(e.into());
                    }
                }
            }
        }

        self.locks.prune();

        let duration = start_time.elapsed();
        SyncMetrics::record_stage_duration(kind, duration.as_secs_f64());
        info!(
            "{} stage completed: {}/{} committed ({} created, {} updated, {} unchanged, {} rejected, {} failed) in {}ms",
            kind,
            report.committed(),
            report.received,
            report.created,
            report.updated,
            report.unchanged,
            report.rejected,
            report.failed,
            duration.as_millis()
        );

        Ok(report)
    }

    /// Validate and upsert one canonical entity
    pub async fn commit(&self, entity: NormalizedEntity) -> crate::error::Result<Committed> {
        let kind = entity.kind();
        let upserted = match entity {
            NormalizedEntity::Specialty(specialty) => {
                validate_for_commit(&specialty)?;
                self.store.upsert_specialty(&specialty).await?
            }
            NormalizedEntity::Hospital(hospital) => {
                validate_for_commit(&hospital)?;
                self.store.upsert_hospital(&hospital).await?
            }
            NormalizedEntity::Symptom(symptom) => {
                validate_for_commit(&symptom)?;
                self.store.upsert_symptom(&symptom).await?
            }
            NormalizedEntity::Service(service) => {
                validate_for_commit(&service)?;
                self.store.upsert_service(&service).await?
            }
            NormalizedEntity::Doctor(doctor) => return self.commit_doctor(*doctor).await,
        };

        Self::record_upsert(kind, upserted.status);
        Ok(Committed {
            upserted,
            merge: None,
        })
    }

    /// Merge a freshly transformed doctor with the stored version and upsert.
    ///
    /// Read, merge and write happen under the identity's lock.
    pub async fn commit_doctor(&self, doctor: Doctor) -> crate::error::Result<Committed> {
        validate_for_commit(&doctor)?;

        let _guard = self.locks.acquire(&doctor.external_id).await;

        let existing = self.store.find_doctor(&doctor.external_id).await?;
        let outcome = self.resolver.resolve(existing.as_ref(), doctor);

        if let MergeDecision::CitiesExtended { added } = &outcome.decision {
            info!(
                "Doctor {} seen in new cities: {}",
                outcome.entity.external_id,
                added.join(", ")
            );
        }
        SyncMetrics::record_merge_decision(&outcome.decision);

        let upserted = self.store.upsert_doctor(&outcome.entity).await?;
        Self::record_upsert(EntityKind::Doctor, upserted.status);

        Ok(Committed {
            upserted,
            merge: Some(outcome.decision),
        })
    }

    fn record_upsert(kind: EntityKind, status: UpsertStatus) {
        match status {
            UpsertStatus::Unchanged => SyncMetrics::record_unchanged(kind),
            UpsertStatus::Created | UpsertStatus::Updated => SyncMetrics::record_upserted(kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::storage::InMemoryStore;
    use serde_json::json;

    fn batch() -> SyncBatch {
        SyncBatch {
            specialties: vec![
                json!({"id": 1, "label": "Cardiologist", "slug": "cardiologist"}),
                json!({"id": 2, "label": "No Slug"}),
            ],
            hospitals: vec![json!({
                "hospitalName": "City Hospital",
                "hospitalSlug": "city-hospital",
                "city": "Karachi",
                "lat": 24.86,
                "lng": 67.0
            })],
            symptoms: vec![json!({"label": "Chest Pain", "slug": "chest-pain"})],
            services: vec![json!({"label": "Angioplasty", "slug": "angioplasty", "is_surgery": true})],
            doctors: vec![
                json!({
                    "id": "d-1",
                    "name": "Dr. Ayesha Khan",
                    "city": "Karachi",
                    "all_specialities": ["cardiologist", "dermatologist"],
                    "distinct_schedules": [
                        {"hospitalOrClinicName": "City Hospital", "fee": "1200", "consultationType": "Video"}
                    ]
                }),
                json!({"id": "d-2", "city": "Karachi"}),
            ],
        }
    }

    #[tokio::test]
    async fn test_run_all_stages() {
        let store = Arc::new(InMemoryStore::new());
        let use_case = SyncUseCase::new(store.clone());

        let report = use_case.run(&batch(), &EntityKind::sync_order()).await.unwrap();

        let specialties = report.stage(EntityKind::Specialty).unwrap();
        assert_eq!(specialties.created, 1);
        assert_eq!(specialties.rejected, 1);

        let doctors = report.stage(EntityKind::Doctor).unwrap();
        assert_eq!(doctors.received, 2);
        assert_eq!(doctors.created, 1);
        assert_eq!(doctors.rejected, 1);
        assert!(doctors.warnings >= 1);

        let doctor = store.find_doctor("d-1").await.unwrap().unwrap();
        assert_eq!(doctor.specialties.len(), 1);
        assert_eq!(doctor.hospitals.len(), 1);
        assert_eq!(doctor.consultation_fee, Some(1200.0));
    }

    #[tokio::test]
    async fn test_second_run_is_unchanged() {
        let store = Arc::new(InMemoryStore::new());
        let use_case = SyncUseCase::new(store.clone());

        use_case.run(&batch(), &EntityKind::sync_order()).await.unwrap();
        let report = use_case.run(&batch(), &EntityKind::sync_order()).await.unwrap();

        for stage in &report.stages {
            assert_eq!(stage.created, 0, "{} created on rerun", stage.kind);
            assert_eq!(stage.updated, 0, "{} updated on rerun", stage.kind);
        }
        assert_eq!(report.stage(EntityKind::Doctor).unwrap().unchanged, 1);
    }

    #[tokio::test]
    async fn test_city_batches_accumulate() {
        let store = Arc::new(InMemoryStore::new());
        let use_case = SyncUseCase::new(store.clone());

        let lahore = vec![json!({"id": "d-9", "name": "Dr. Two Cities", "city": "Lahore"})];
        let karachi = vec![json!({"id": "d-9", "name": "Dr. Two Cities", "city": "Karachi"})];

        use_case.sync_stage(EntityKind::Doctor, &lahore).await.unwrap();
        let report = use_case.sync_stage(EntityKind::Doctor, &karachi).await.unwrap();
        assert_eq!(report.updated, 1);
        assert_eq!(report.cities_extended, 1);

        let doctor = store.find_doctor("d-9").await.unwrap().unwrap();
        assert_eq!(
            doctor.cities.into_vec(),
            vec!["Lahore".to_string(), "Karachi".to_string()]
        );
    }

    #[tokio::test]
    async fn test_doctor_stage_before_catalog_resolves_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let use_case = SyncUseCase::new(store.clone());

        use_case
            .run(&batch(), &[EntityKind::Doctor])
            .await
            .unwrap();

        let doctor = store.find_doctor("d-1").await.unwrap().unwrap();
        assert!(doctor.specialties.is_empty());
        assert!(doctor.hospitals.is_empty());
    }

    #[test]
    fn test_batch_load_reports_io_and_json_errors() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"specialties": [{{"slug": "ent"}}]}}"#).unwrap();
        let batch = SyncBatch::load(file.path()).unwrap();
        assert_eq!(batch.records(EntityKind::Specialty).len(), 1);

        let dir = tempfile::tempdir().unwrap();
        let missing = SyncBatch::load(dir.path().join("missing.json")).unwrap_err();
        assert!(matches!(missing, SyncError::Io(_)));

        let mut broken = tempfile::NamedTempFile::new().unwrap();
        write!(broken, "{{\"doctors\": [").unwrap();
        assert!(matches!(SyncBatch::load(broken.path()), Err(SyncError::Json(_))));
    }

    #[test]
    fn test_batch_deserializes_with_missing_sections() {
        let batch: SyncBatch = serde_json::from_value(json!({"doctors": [{"id": "1"}]})).unwrap();
        assert!(batch.specialties.is_empty());
        assert_eq!(batch.records(EntityKind::Doctor).len(), 1);
    }
}
