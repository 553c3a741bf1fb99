use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod ordered_set;

pub use ordered_set::OrderedSet;

/// Opaque storage identifier handed out by the storage collaborator
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityRef(String);

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityRef {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// The kinds of records the directory API exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Specialty,
    Hospital,
    Symptom,
    Service,
    Doctor,
}

impl EntityKind {
    /// Dependency order: doctors resolve against specialties and hospitals
    pub fn sync_order() -> [EntityKind; 5] {
        [
            EntityKind::Specialty,
            EntityKind::Hospital,
            EntityKind::Symptom,
            EntityKind::Service,
            EntityKind::Doctor,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Specialty => "specialty",
            EntityKind::Hospital => "hospital",
            EntityKind::Symptom => "symptom",
            EntityKind::Service => "service",
            EntityKind::Doctor => "doctor",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "specialty" | "specialties" => Ok(EntityKind::Specialty),
            "hospital" | "hospitals" => Ok(EntityKind::Hospital),
            "symptom" | "symptoms" => Ok(EntityKind::Symptom),
            "service" | "services" => Ok(EntityKind::Service),
            "doctor" | "doctors" => Ok(EntityKind::Doctor),
            other => Err(format!("unknown entity kind: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialty {
    pub external_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub total_doctors: u32,
    pub icon_url: String,
    pub secondary_icon_url: String,
    /// Curated elsewhere; transformation always leaves this false
    pub is_top_specialty: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeoKind {
    Point,
}

/// GeoJSON point; coordinates are `[longitude, latitude]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    #[serde(rename = "type")]
    pub kind: GeoKind,
    pub coordinates: [f64; 2],
}

impl GeoPoint {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            kind: GeoKind::Point,
            coordinates: [longitude, latitude],
        }
    }

    pub fn longitude(&self) -> f64 {
        self.coordinates[0]
    }

    pub fn latitude(&self) -> f64 {
        self.coordinates[1]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    pub external_id: String,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub city: String,
    pub profile_picture_url: String,
    pub total_doctors: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Symptom {
    pub external_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub total_doctors: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub external_id: String,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub total_doctors: u32,
    pub is_surgery: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Qualification {
    pub degree: String,
    pub institution: String,
    pub year_from: Option<i32>,
    pub year_to: Option<i32>,
    pub is_verified: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Doctor {
    pub external_id: String,
    pub doctor_slug: String,
    pub username: String,
    pub pseudo_id: String,
    pub doctor_title: String,
    pub full_name: String,
    pub gender: String,
    pub profile_picture: String,
    pub cities: OrderedSet<String>,
    pub years_of_experience: f64,
    pub total_reviews: u32,
    pub average_rating: f64,
    pub satisfaction_rate: f64,
    pub is_available_today: bool,
    pub is_subscribed: bool,
    pub doctor_preference: String,
    pub last_synced_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_specialty: Option<EntityRef>,
    #[serde(default)]
    pub specialties: Vec<EntityRef>,
    #[serde(default)]
    pub qualifications: Vec<Qualification>,
    #[serde(default)]
    pub qualification_names: Vec<String>,
    #[serde(default)]
    pub hospitals: OrderedSet<EntityRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_modes: Option<OrderedSet<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consultation_fee: Option<f64>,
}

/// Business key and storage identity shared by every canonical entity
pub trait CatalogEntity {
    const KIND: EntityKind;

    /// Key the storage collaborator upserts by
    fn business_key(&self) -> &str;

    fn display_name(&self) -> &str;

    /// Why the business key cannot identify this entity, if it cannot
    fn key_problem(&self) -> Option<&'static str> {
        if self.business_key().trim().is_empty() {
            return Some("empty business key");
        }
        None
    }
}

impl CatalogEntity for Specialty {
    const KIND: EntityKind = EntityKind::Specialty;

    fn business_key(&self) -> &str {
        &self.slug
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Hospital {
    /// Fallback identity when the source carries no id: `lowercase(slug-city)`
    pub fn derived_external_id(slug: &str, city: &str) -> String {
        format!("{}-{}", slug, city).to_lowercase()
    }

    /// A derived id without a slug collapses every such hospital in a city
    /// onto one key
    pub fn has_slugless_derived_id(&self) -> bool {
        self.slug.trim().is_empty()
            && self.external_id == Self::derived_external_id(&self.slug, &self.city)
    }
}

impl CatalogEntity for Hospital {
    const KIND: EntityKind = EntityKind::Hospital;

    fn business_key(&self) -> &str {
        &self.external_id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn key_problem(&self) -> Option<&'static str> {
        if self.external_id.trim().is_empty() {
            return Some("empty business key");
        }
        if self.has_slugless_derived_id() {
            return Some("external id derived without a slug");
        }
        None
    }
}

impl CatalogEntity for Symptom {
    const KIND: EntityKind = EntityKind::Symptom;

    fn business_key(&self) -> &str {
        &self.slug
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl CatalogEntity for Service {
    const KIND: EntityKind = EntityKind::Service;

    fn business_key(&self) -> &str {
        &self.slug
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl CatalogEntity for Doctor {
    const KIND: EntityKind = EntityKind::Doctor;

    fn business_key(&self) -> &str {
        &self.external_id
    }

    fn display_name(&self) -> &str {
        &self.full_name
    }
}
