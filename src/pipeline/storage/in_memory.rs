use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;
use uuid::Uuid;

use crate::app::ports::{CatalogStorePort, UpsertStatus, Upserted};
use crate::domain::{CatalogEntity, Doctor, EntityRef, Hospital, Service, Specialty, Symptom};
use crate::error::{Result, SyncError};
use crate::pipeline::processing::catalog::{validate_for_commit, IdempotencyChecker};
use crate::pipeline::processing::lookup::{HospitalLookup, SpecialtyLookup};

/// A committed entity with its storage-assigned identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredEntity<T> {
    pub id: EntityRef,
    #[serde(flatten)]
    pub entity: T,
}

type Table<T> = Arc<Mutex<BTreeMap<String, StoredEntity<T>>>>;

/// In-memory storage implementation for development/testing.
///
/// Each upsert runs under its table's lock, so reads and writes of a single
/// entity are atomic; cross-call read-merge-write still needs the caller's
/// per-identity serialization.
#[derive(Default)]
pub struct InMemoryStore {
    specialties: Table<Specialty>,
    hospitals: Table<Hospital>,
    symptoms: Table<Symptom>,
    services: Table<Service>,
    doctors: Table<Doctor>,
}

/// Everything committed, ordered by business key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSnapshot {
    pub specialties: Vec<StoredEntity<Specialty>>,
    pub hospitals: Vec<StoredEntity<Hospital>>,
    pub symptoms: Vec<StoredEntity<Symptom>>,
    pub services: Vec<StoredEntity<Service>>,
    pub doctors: Vec<StoredEntity<Doctor>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Result<StoreSnapshot> {
        Ok(StoreSnapshot {
            specialties: Self::values(&self.specialties)?,
            hospitals: Self::values(&self.hospitals)?,
            symptoms: Self::values(&self.symptoms)?,
            services: Self::values(&self.services)?,
            doctors: Self::values(&self.doctors)?,
        })
    }

    fn values<T: Clone>(table: &Table<T>) -> Result<Vec<StoredEntity<T>>> {
        let guard = table
            .lock()
            .map_err(|_| SyncError::Store("table lock poisoned".to_string()))?;
        Ok(guard.values().cloned().collect())
    }

    fn upsert<T, F>(table: &Table<T>, entity: &T, has_changes: F) -> Result<Upserted>
    where
        T: CatalogEntity + Clone,
        F: Fn(&T, &T) -> bool,
    {
        validate_for_commit(entity)?;

        let mut guard = table
            .lock()
            .map_err(|_| SyncError::Store("table lock poisoned".to_string()))?;
        let key = entity.business_key().to_string();

        if let Some(stored) = guard.get_mut(&key) {
            let reference = stored.id.clone();
            if !has_changes(&stored.entity, entity) {
                return Ok(Upserted {
                    reference,
                    status: UpsertStatus::Unchanged,
                });
            }
            stored.entity = entity.clone();
            debug!("Updated {} {} ({})", T::KIND, key, reference);
            return Ok(Upserted {
                reference,
                status: UpsertStatus::Updated,
            });
        }

        let reference = EntityRef::new(Uuid::new_v4().to_string());
        guard.insert(
            key.clone(),
            StoredEntity {
                id: reference.clone(),
                entity: entity.clone(),
            },
        );
        debug!("Created {} {} with id {}", T::KIND, key, reference);
        Ok(Upserted {
            reference,
            status: UpsertStatus::Created,
        })
    }
}

#[async_trait]
impl CatalogStorePort for InMemoryStore {
    async fn upsert_specialty(&self, specialty: &Specialty) -> Result<Upserted> {
        Self::upsert(&self.specialties, specialty, IdempotencyChecker::has_changes)
    }

    async fn upsert_hospital(&self, hospital: &Hospital) -> Result<Upserted> {
        Self::upsert(&self.hospitals, hospital, IdempotencyChecker::has_changes)
    }

    async fn upsert_symptom(&self, symptom: &Symptom) -> Result<Upserted> {
        Self::upsert(&self.symptoms, symptom, IdempotencyChecker::has_changes)
    }

    async fn upsert_service(&self, service: &Service) -> Result<Upserted> {
        Self::upsert(&self.services, service, IdempotencyChecker::has_changes)
    }

    async fn find_doctor(&self, external_id: &str) -> Result<Option<Doctor>> {
        let guard = self
            .doctors
            .lock()
            .map_err(|_| SyncError::Store("table lock poisoned".to_string()))?;
        Ok(guard.get(external_id).map(|stored| stored.entity.clone()))
    }

    async fn upsert_doctor(&self, doctor: &Doctor) -> Result<Upserted> {
        Self::upsert(&self.doctors, doctor, IdempotencyChecker::doctor_has_changes)
    }

    async fn specialty_lookup(&self) -> Result<SpecialtyLookup> {
        let guard = self
            .specialties
            .lock()
            .map_err(|_| SyncError::Store("table lock poisoned".to_string()))?;
        Ok(guard
            .values()
            .map(|stored| (stored.entity.slug.clone(), stored.id.clone()))
            .collect())
    }

    /// Iterates in external id order, so on a shared name the last branch wins
    async fn hospital_lookup(&self) -> Result<HospitalLookup> {
        let guard = self
            .hospitals
            .lock()
            .map_err(|_| SyncError::Store("table lock poisoned".to_string()))?;
        Ok(guard
            .values()
            .map(|stored| (stored.entity.name.clone(), stored.id.clone()))
            .collect())
    }
}
