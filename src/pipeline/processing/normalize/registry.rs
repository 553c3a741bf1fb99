use std::collections::HashMap;
use std::sync::Arc;
use anyhow::Result;

use super::normalizers::{
    DoctorNormalizer, HospitalNormalizer, MetricsNormalizer, NormalizerUtils, ServiceNormalizer,
    SourceNormalizer, SpecialtyNormalizer, SymptomNormalizer,
};
use super::{NormalizedRecord, RawRecord};
use crate::domain::EntityKind;
use crate::pipeline::processing::lookup::{HospitalLookup, SpecialtyLookup};

/// Registry of entity-specific normalization strategies
pub struct NormalizationRegistry {
    normalizers: HashMap<EntityKind, Box<dyn SourceNormalizer>>,
}

impl NormalizationRegistry {
    /// Registry whose doctor normalizer resolves nothing (empty lookup tables)
    pub fn new() -> Self {
        Self::with_lookups(Arc::new(SpecialtyLookup::empty()), Arc::new(HospitalLookup::empty()))
    }

    /// Create a registry with the built-in normalizers, resolving doctor
    /// references through the given lookup tables
    pub fn with_lookups(specialties: Arc<SpecialtyLookup>, hospitals: Arc<HospitalLookup>) -> Self {
        let mut registry = Self {
            normalizers: HashMap::new(),
        };

        registry.register(Box::new(MetricsNormalizer::new(SpecialtyNormalizer::new())));
        registry.register(Box::new(MetricsNormalizer::new(HospitalNormalizer::new())));
        registry.register(Box::new(MetricsNormalizer::new(SymptomNormalizer::new())));
        registry.register(Box::new(MetricsNormalizer::new(ServiceNormalizer::new())));
        registry.register(Box::new(MetricsNormalizer::new(DoctorNormalizer::new(
            specialties,
            hospitals,
        ))));

        registry
    }

    /// Register (or replace) the normalizer for its entity kind
    pub fn register(&mut self, normalizer: Box<dyn SourceNormalizer>) {
        self.normalizers.insert(normalizer.kind(), normalizer);
    }

    /// Get the normalizer for an entity kind
    pub fn get_normalizer(&self, kind: EntityKind) -> Option<&dyn SourceNormalizer> {
        self.normalizers.get(&kind).map(|n| n.as_ref())
    }

    /// Normalize one raw record located at `record_path` in its batch
    pub fn normalize(&self, kind: EntityKind, raw: &RawRecord, record_path: &str) -> Result<NormalizedRecord> {
        let normalizer = self
            .get_normalizer(kind)
            .ok_or_else(|| anyhow::anyhow!("No normalizer registered for kind: {}", kind))?;

        let mut warnings = Vec::new();
        let entity = normalizer.normalize(raw, &mut warnings);

        Ok(NormalizerUtils::create_record(
            entity,
            NormalizerUtils::create_provenance(record_path),
            warnings,
            normalizer.name(),
        ))
    }

    /// List all registered kinds
    pub fn list_kinds(&self) -> Vec<EntityKind> {
        self.normalizers.keys().copied().collect()
    }
}

impl Default for NormalizationRegistry {
    fn default() -> Self {
        Self::new()
    }
}
