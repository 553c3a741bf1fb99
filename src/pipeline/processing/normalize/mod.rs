use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Doctor, EntityKind, Hospital, Service, Specialty, Symptom};

pub mod normalizers;
pub mod registry;

pub use normalizers::{
    DoctorNormalizer, HospitalNormalizer, ServiceNormalizer, SourceNormalizer,
    SpecialtyNormalizer, SymptomNormalizer,
};
pub use registry::NormalizationRegistry;

/// Raw record exactly as the directory API returned it
pub type RawRecord = serde_json::Value;

/// A normalized record that has been converted into a canonical entity
/// but retains lineage back to the source batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// The canonical entity extracted from the raw record
    pub entity: NormalizedEntity,
    /// Provenance information linking back to the source
    pub provenance: RecordProvenance,
    /// Normalization metadata (strategy and tolerated data issues)
    pub normalization: NormalizationMetadata,
}

/// The canonical entities that can be extracted from directory records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "entity", rename_all = "lowercase")]
pub enum NormalizedEntity {
    Specialty(Specialty),
    Hospital(Hospital),
    Symptom(Symptom),
    Service(Service),
    Doctor(Box<Doctor>),
}

impl NormalizedEntity {
    pub fn kind(&self) -> EntityKind {
        match self {
            NormalizedEntity::Specialty(_) => EntityKind::Specialty,
            NormalizedEntity::Hospital(_) => EntityKind::Hospital,
            NormalizedEntity::Symptom(_) => EntityKind::Symptom,
            NormalizedEntity::Service(_) => EntityKind::Service,
            NormalizedEntity::Doctor(_) => EntityKind::Doctor,
        }
    }
}

/// Provenance information tracking the lineage of this normalized record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordProvenance {
    /// The source system that provided the data
    pub source: String,
    /// Location of this record within the batch, e.g. `$.doctors[3]`
    pub record_path: String,
    /// When this record was transformed into its canonical form
    pub normalized_at: DateTime<Utc>,
}

/// Metadata about the normalization process
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizationMetadata {
    /// Tolerated data issues: unresolved references, unparseable values
    pub warnings: Vec<String>,
    /// The normalization strategy used
    pub strategy: String,
}
