//! Typed configuration for bodybind.
//!
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Example
//!
//! ```no_run
//! use bodybind_config::ConfigLoader;
//!
//! # fn main() -> Result<(), bodybind_config::ConfigError> {
//! let config = ConfigLoader::new()
//!     .with_defaults()
//!     .with_file("bodybind.toml")?
//!     .with_env_prefix("BODYBIND")
//!     .load()?;
//!
//! println!("binder enabled: {}", config.binder.enabled);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration File Format
//!
//! ```toml
//! [binder]
//! enabled = true
//!
//! [binder.temporal]
//! utc_offset = "+00:00"
//! formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d"]
//!
//! [logging]
//! enabled = true
//! level = "info"
//! format = "json"
//! ansi_enabled = false
//!
//! [metrics]
//! enabled = false
//! service_name = "bodybind"
//! ```
//!
//! # Environment Variable Overrides
//!
//! - `BODYBIND__BINDER__ENABLED=false`
//! - `BODYBIND__BINDER__TEMPORAL__UTC_OFFSET=+08:00`
//! - `BODYBIND__BINDER__TEMPORAL__FORMATS=%Y-%m-%d %H:%M:%S,%Y-%m-%d` (comma separated)
//! - `BODYBIND__LOGGING__LEVEL=debug`
//! - `BODYBIND__METRICS__ENABLED=true`

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::{BodybindConfig, BodybindConfigBuilder};
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::{
    BinderConfig, LogFormat, LoggingConfig, MetricsConfig, TemporalConfig,
    DEFAULT_TEMPORAL_FORMATS,
};
