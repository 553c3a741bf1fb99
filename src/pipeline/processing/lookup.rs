use std::collections::HashMap;
use std::marker::PhantomData;

use crate::domain::EntityRef;

/// How a lookup table canonicalizes its keys on insert and on lookup
pub trait KeyPolicy {
    fn normalize(raw: &str) -> String;
}

/// Specialty slugs match exactly, ignoring surrounding whitespace
#[derive(Debug, Clone, Copy)]
pub struct SlugKey;

impl KeyPolicy for SlugKey {
    fn normalize(raw: &str) -> String {
        raw.trim().to_string()
    }
}

/// Hospital names match case-insensitively with whitespace collapsed
#[derive(Debug, Clone, Copy)]
pub struct HospitalNameKey;

impl KeyPolicy for HospitalNameKey {
    fn normalize(raw: &str) -> String {
        normalize_hospital_name(raw)
    }
}

pub fn normalize_hospital_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Immutable mapping from a business key to a committed entity reference.
///
/// Built by the storage collaborator from entities committed in earlier sync
/// stages. A key that is not present resolves to `None`; references are never
/// fabricated.
#[derive(Debug, Clone)]
pub struct LookupTable<K: KeyPolicy> {
    entries: HashMap<String, EntityRef>,
    _policy: PhantomData<K>,
}

pub type SpecialtyLookup = LookupTable<SlugKey>;
pub type HospitalLookup = LookupTable<HospitalNameKey>;

impl<K: KeyPolicy> LookupTable<K> {
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
            _policy: PhantomData,
        }
    }

    pub fn resolve(&self, raw_key: &str) -> Option<&EntityRef> {
        let key = K::normalize(raw_key);
        if key.is_empty() {
            return None;
        }
        self.entries.get(&key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: KeyPolicy> Default for LookupTable<K> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<K: KeyPolicy, S: AsRef<str>> FromIterator<(S, EntityRef)> for LookupTable<K> {
    fn from_iter<I: IntoIterator<Item = (S, EntityRef)>>(iter: I) -> Self {
        let entries = iter
            .into_iter()
            .map(|(key, reference)| (K::normalize(key.as_ref()), reference))
            .filter(|(key, _)| !key.is_empty())
            .collect();
        Self {
            entries,
            _policy: PhantomData,
        }
    }
}
