use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::hash::Hash;

/// Insertion-ordered collection of unique values.
///
/// Backs the set-like fields of canonical entities (`cities`,
/// `consultationModes`, resolved hospital references). Serializes as a plain
/// JSON array. Equality is order-sensitive, like the array it serializes to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(
    serialize = "T: Serialize + Hash + Eq",
    deserialize = "T: Deserialize<'de> + Hash + Eq"
))]
#[serde(transparent)]
pub struct OrderedSet<T: Hash + Eq> {
    items: IndexSet<T>,
}

impl<T: Hash + Eq> OrderedSet<T> {
    pub fn new() -> Self {
        Self {
            items: IndexSet::new(),
        }
    }

    /// Returns true when the value was not already present
    pub fn insert(&mut self, value: T) -> bool {
        self.items.insert(value)
    }

    pub fn contains(&self, value: &T) -> bool {
        self.items.contains(value)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items.into_iter().collect()
    }
}

impl<T: Hash + Eq + Clone> OrderedSet<T> {
    /// Union keeping `self`'s order first, then values only present in `other`
    pub fn union(&self, other: &OrderedSet<T>) -> OrderedSet<T> {
        let mut merged = self.clone();
        merged.extend(other.iter().cloned());
        merged
    }

    /// Values of `self` that are absent from `other`, in `self`'s order
    pub fn difference(&self, other: &OrderedSet<T>) -> Vec<T> {
        self.items
            .iter()
            .filter(|value| !other.contains(value))
            .cloned()
            .collect()
    }
}

impl<T: Hash + Eq> PartialEq for OrderedSet<T> {
    fn eq(&self, other: &Self) -> bool {
        self.items.iter().eq(other.items.iter())
    }
}

impl<T: Hash + Eq> Eq for OrderedSet<T> {}

impl<T: Hash + Eq> Default for OrderedSet<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Hash + Eq> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.items.extend(iter);
    }
}

impl<T: Hash + Eq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<T: Hash + Eq> From<Vec<T>> for OrderedSet<T> {
    fn from(values: Vec<T>) -> Self {
        values.into_iter().collect()
    }
}

impl<T: Hash + Eq> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = indexmap::set::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_occurrence_order() {
        let mut set = OrderedSet::new();
        assert!(set.insert("Video"));
        assert!(set.insert("In-person"));
        assert!(!set.insert("Video"));
        assert_eq!(set.into_vec(), vec!["Video", "In-person"]);
    }

    #[test]
    fn test_union_existing_first() {
        let existing: OrderedSet<&str> = vec!["Lahore", "Islamabad"].into();
        let incoming: OrderedSet<&str> = vec!["Karachi", "Lahore"].into();
        let merged = existing.union(&incoming);
        assert_eq!(merged.into_vec(), vec!["Lahore", "Islamabad", "Karachi"]);
    }

    #[test]
    fn test_difference() {
        let incoming: OrderedSet<&str> = vec!["Karachi", "Lahore"].into();
        let existing: OrderedSet<&str> = vec!["Lahore"].into();
        assert_eq!(incoming.difference(&existing), vec!["Karachi"]);
    }

    #[test]
    fn test_equality_respects_order() {
        let a: OrderedSet<&str> = vec!["Video", "In-person"].into();
        let b: OrderedSet<&str> = vec!["In-person", "Video"].into();
        assert_ne!(a, b);
        assert_eq!(a, vec!["Video", "In-person"].into());
    }

    #[test]
    fn test_serializes_as_array() {
        let set: OrderedSet<String> = vec!["a".to_string(), "b".to_string(), "a".to_string()].into();
        assert_eq!(serde_json::to_value(&set).unwrap(), serde_json::json!(["a", "b"]));

        let back: OrderedSet<String> = serde_json::from_value(serde_json::json!(["x", "x", "y"])).unwrap();
        assert_eq!(back.len(), 2);
    }
}
