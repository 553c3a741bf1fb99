/// Environment variable naming the TOML config file
pub const CONFIG_ENV_VAR: &str = "DIRECTORY_SYNC_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "directory_sync.toml";

// Output file names written by the `sync` command
pub const REPORT_FILE: &str = "report.json";
pub const SNAPSHOT_FILE: &str = "snapshot.json";

// Source label attached to provenance for records from the directory API
pub const DIRECTORY_SOURCE: &str = "directory_api";

/// Currency markers stripped from fee strings before numeric parsing
pub const CURRENCY_MARKERS: &[&str] = &["PKR", "Rs.", "Rs", "$"];

/// Plausible range for academic session years
pub const MIN_SESSION_YEAR: i32 = 1900;
pub const MAX_SESSION_YEAR: i32 = 2100;
