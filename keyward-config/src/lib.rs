//! Configuration library for Keyward.
//!
//! Settings are composed from an optional TOML file, then the process
//! environment (with `.env` support), and finally whatever overrides the
//! binary applies from its command line. This crate also owns the logging
//! setup, since the log format is a function of the configured environment.

pub mod loader;
pub mod models;
pub mod sources;
pub mod telemetry;
pub mod util;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader};
pub use models::{
    AuthConfig, Config, ConfigMetadata, ConfigWarning, ConfigWarnings, Environment,
    ServerConfig, StorageConfig,
};
pub use telemetry::init_tracing;
