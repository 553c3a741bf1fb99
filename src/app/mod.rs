pub mod identity_locks;
pub mod ports;
pub mod sync_use_case;

pub use sync_use_case::{StageReport, SyncBatch, SyncReport, SyncUseCase};
