// Base trait and utilities for entity normalizers
pub mod base;

// Individual normalizer implementations
pub mod specialty;
pub mod hospital;
pub mod symptom;
pub mod service;
pub mod doctor;

// Re-export the main components
pub use base::{MetricsNormalizer, NormalizerUtils, SourceNormalizer};
pub use specialty::SpecialtyNormalizer;
pub use hospital::HospitalNormalizer;
pub use symptom::SymptomNormalizer;
pub use service::ServiceNormalizer;
pub use doctor::{transform_doctor, DoctorNormalizer};
