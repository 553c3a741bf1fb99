// Catalog admission: change detection and business-key validation before upsert

pub mod idempotency;
pub mod validation;

pub use idempotency::IdempotencyChecker;
pub use validation::validate_for_commit;
