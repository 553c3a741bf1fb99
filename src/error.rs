use thiserror::Error;

use crate::domain::EntityKind;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Rejected {kind} entity: {reason}")]
    Validation { kind: EntityKind, reason: String },

    #[error("Store error: {0}")]
    Store(String),
}

impl SyncError {
    pub fn validation(kind: EntityKind, reason: impl Into<String>) -> Self {
        SyncError::Validation {
            kind,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
