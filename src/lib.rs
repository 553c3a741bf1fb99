pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;

// Domain data shapes shared across layers
pub mod domain;

// Use cases and the ports they drive
pub mod app;
