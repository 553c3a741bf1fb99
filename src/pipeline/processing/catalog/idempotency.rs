use crate::domain::Doctor;

/// Handles idempotency checks for catalog upserts
pub struct IdempotencyChecker;

impl IdempotencyChecker {
    /// Generic check for entities without sync-time stamps
    pub fn has_changes<T: PartialEq>(existing: &T, updated: &T) -> bool {
        existing != updated
    }

    /// Check if a doctor has changes compared to the stored version.
    ///
    /// `last_synced_at` differs on every run and is ignored.
    pub fn doctor_has_changes(existing: &Doctor, updated: &Doctor) -> bool {
        existing.doctor_slug != updated.doctor_slug
            || existing.username != updated.username
            || existing.pseudo_id != updated.pseudo_id
            || existing.doctor_title != updated.doctor_title
            || existing.full_name != updated.full_name
            || existing.gender != updated.gender
            || existing.profile_picture != updated.profile_picture
            || existing.cities != updated.cities
            || existing.years_of_experience != updated.years_of_experience
            || existing.total_reviews != updated.total_reviews
            || existing.average_rating != updated.average_rating
            || existing.satisfaction_rate != updated.satisfaction_rate
            || existing.is_available_today != updated.is_available_today
            || existing.is_subscribed != updated.is_subscribed
            || existing.doctor_preference != updated.doctor_preference
            || existing.primary_specialty != updated.primary_specialty
            || existing.specialties != updated.specialties
            || existing.qualifications != updated.qualifications
            || existing.qualification_names != updated.qualification_names
            || existing.hospitals != updated.hospitals
            || existing.consultation_modes != updated.consultation_modes
            || existing.consultation_fee != updated.consultation_fee
    }
}
