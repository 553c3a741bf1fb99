use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{Doctor, EntityRef, Hospital, Service, Specialty, Symptom};
use crate::error::Result;
use crate::pipeline::processing::lookup::{HospitalLookup, SpecialtyLookup};

/// What an upsert did to the stored entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertStatus {
    Created,
    Updated,
    /// Semantically identical to the stored version; nothing written
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upserted {
    pub reference: EntityRef,
    pub status: UpsertStatus,
}

/// Storage collaborator holding committed canonical entities.
///
/// Upserts are keyed by business key (slug for specialties, symptoms and
/// services; external id for hospitals and doctors) and must be idempotent
/// for unchanged entities.
#[async_trait]
pub trait CatalogStorePort: Send + Sync {
    async fn upsert_specialty(&self, specialty: &Specialty) -> Result<Upserted>;
    async fn upsert_hospital(&self, hospital: &Hospital) -> Result<Upserted>;
    async fn upsert_symptom(&self, symptom: &Symptom) -> Result<Upserted>;
    async fn upsert_service(&self, service: &Service) -> Result<Upserted>;

    /// Committed doctor for an external identity, if any
    async fn find_doctor(&self, external_id: &str) -> Result<Option<Doctor>>;
    async fn upsert_doctor(&self, doctor: &Doctor) -> Result<Upserted>;

    /// Slug → reference for every committed specialty
    async fn specialty_lookup(&self) -> Result<SpecialtyLookup>;
    /// Hospital name → reference for every committed hospital.
    ///
    /// Keyed by normalized name only: branches in different cities that share
    /// a name collapse to a single reference, the one with the greatest
    /// external id.
    async fn hospital_lookup(&self) -> Result<HospitalLookup>;
}
