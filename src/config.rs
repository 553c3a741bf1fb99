use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::constants::{CONFIG_ENV_VAR, DEFAULT_CONFIG_PATH};
use crate::domain::EntityKind;
use crate::error::{Result, SyncError};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub logging: LoggingConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Directory for the rolling JSON log files
    pub directory: String,
    pub file_name: String,
    /// Filter directive used when RUST_LOG is not set
    pub default_directive: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            directory: "logs".to_string(),
            file_name: "directory_sync.log".to_string(),
            default_directive: "directory_sync=info".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    pub output_dir: String,
    /// Stages to run, in the order they should run
    pub stages: Vec<EntityKind>,
    /// Keep going when the store rejects a single entity
    pub continue_on_store_error: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            output_dir: "output".to_string(),
            stages: EntityKind::sync_order().to_vec(),
            continue_on_store_error: true,
        }
    }
}

impl Config {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config path from the environment (after loading `.env`),
    /// falling back to defaults when no file exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        let path = std::env::var(CONFIG_ENV_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        if Path::new(&path).exists() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Doctors resolve references against specialties and hospitals, so those
    /// stages must not be scheduled after the doctor stage.
    fn validate(&self) -> Result<()> {
        let position = |kind: EntityKind| self.sync.stages.iter().position(|k| *k == kind);
        if let Some(doctor_at) = position(EntityKind::Doctor) {
            for dependency in [EntityKind::Specialty, EntityKind::Hospital] {
                if matches!(position(dependency), Some(at) if at > doctor_at) {
                    return Err(SyncError::Config(format!(
                        "stage '{}' must run before '{}'",
                        dependency,
                        EntityKind::Doctor
                    )));
                }
            }
        }
        Ok(())
    }
}
