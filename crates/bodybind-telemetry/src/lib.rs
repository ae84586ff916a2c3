//! Observability for bodybind.
//!
//! - **Logging**: `tracing-subscriber` with an env filter and JSON or pretty output
//! - **Metrics**: bind-outcome counters through the `metrics` facade, exported
//!   in Prometheus text format
//!
//! # Example
//!
//! ```rust,ignore
//! use bodybind_telemetry::{init_telemetry, LogConfig, MetricsConfig};
//!
//! init_telemetry(&LogConfig::production(), &MetricsConfig::default())?;
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod logging;
pub mod metrics;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use metrics::{
    init_metrics, record_bad_request, record_binding, render_metrics, BindOutcome, MetricsConfig,
    MetricsRegistry,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Initializes logging, then metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if either subsystem fails to initialize.
pub fn init_telemetry(log: &LogConfig, metrics: &MetricsConfig) -> TelemetryResult<()> {
    init_logging(log)?;
    init_metrics(metrics)?;
    Ok(())
}
