//! Cross-run reconciliation of multi-value fields.
//!
//! The directory lists a practitioner once per city, so each per-city sync
//! sees only one city. Stored coverage grows by union and is never
//! overwritten by a single run.

use serde::{Deserialize, Serialize};
use std::hash::Hash;

use crate::domain::{Doctor, OrderedSet};

/// How an incoming doctor related to the stored version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MergeDecision {
    /// Nothing stored yet for this external identity
    New,
    /// Stored cities extended with cities first seen in this run
    CitiesExtended { added: Vec<String> },
    /// Every incoming city was already stored
    CitiesUnchanged,
}

impl MergeDecision {
    pub fn label(&self) -> &'static str {
        match self {
            MergeDecision::New => "new",
            MergeDecision::CitiesExtended { .. } => "cities_extended",
            MergeDecision::CitiesUnchanged => "cities_unchanged",
        }
    }
}

/// The entity to upsert plus how it was reached
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeOutcome {
    pub entity: Doctor,
    pub decision: MergeDecision,
}

/// Union of a stored multi-value field with this run's values: stored values
/// first in their order, then new values in input order.
pub fn merge_multi_value<T: Hash + Eq + Clone>(
    existing: Option<&OrderedSet<T>>,
    incoming: &OrderedSet<T>,
) -> OrderedSet<T> {
    match existing {
        Some(stored) => stored.union(incoming),
        None => incoming.clone(),
    }
}

/// Reconciles a doctor's `cities` across ingestion runs.
///
/// The result equals `incoming` in every field except `cities`. Callers must
/// serialize resolve-and-write per external identity (or have the store apply
/// it atomically); two unserialized merges against the same stored state lose
/// one side's cities.
#[derive(Debug, Default, Clone, Copy)]
pub struct CityMergeResolver;

impl CityMergeResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, existing: Option<&Doctor>, incoming: Doctor) -> MergeOutcome {
        let Some(stored) = existing else {
            return MergeOutcome {
                entity: incoming,
                decision: MergeDecision::New,
            };
        };

        let added = incoming.cities.difference(&stored.cities);
        let cities = merge_multi_value(Some(&stored.cities), &incoming.cities);

        let decision = if added.is_empty() {
            MergeDecision::CitiesUnchanged
        } else {
            MergeDecision::CitiesExtended { added }
        };

        MergeOutcome {
            entity: Doctor { cities, ..incoming },
            decision,
        }
    }
}
