use crate::domain::{CatalogEntity, EntityKind};
use crate::error::{Result, SyncError};

/// Reject entities that would be committed under an empty or ambiguous
/// business key.
///
/// Transformers never fail on missing identity; this check runs at the
/// boundary with the store. Doctors additionally require a name.
pub fn validate_for_commit<T: CatalogEntity>(entity: &T) -> Result<()> {
    if let Some(problem) = entity.key_problem() {
        return Err(SyncError::validation(T::KIND, problem));
    }
    if T::KIND == EntityKind::Doctor && entity.display_name().trim().is_empty() {
        return Err(SyncError::validation(T::KIND, "doctor has no name"));
    }
    Ok(())
}
