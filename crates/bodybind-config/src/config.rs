//! Main configuration types.
//!
//! This module provides the top-level [`BodybindConfig`] struct and its builder.

use serde::{Deserialize, Serialize};

use crate::{BinderConfig, ConfigError, LogFormat, LoggingConfig, MetricsConfig};

/// Complete bodybind configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use bodybind_config::BodybindConfig;
///
/// let config = BodybindConfig::default();
/// assert!(config.binder.enabled);
/// assert_eq!(config.binder.temporal.utc_offset, "+00:00");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct BodybindConfig {
    /// Binder configuration.
    #[serde(default)]
    pub binder: BinderConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Metrics configuration.
    #[serde(default)]
    pub metrics: MetricsConfig,
}

impl BodybindConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> BodybindConfigBuilder {
        BodybindConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The temporal offset or a temporal pattern is invalid
    /// - No temporal patterns are configured
    /// - The log level is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.binder.temporal.validate()?;

        if self.logging.enabled {
            bodybind_telemetry::create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting with ANSI colors
    /// - Debug log level with source locations
    ///
    /// # Example
    ///
    /// ```
    /// use bodybind_config::BodybindConfig;
    ///
    /// let config = BodybindConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.ansi_enabled = true;
        config.logging.include_location = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log formatting at info level
    /// - Prometheus metrics enabled
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.logging.ansi_enabled = false;
        config.metrics.enabled = true;

        config
    }

    /// Converts the logging section to the telemetry crate's configuration.
    #[must_use]
    pub fn log_config(&self) -> bodybind_telemetry::LogConfig {
        bodybind_telemetry::LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            json_format: self.logging.format == LogFormat::Json,
            ansi: self.logging.ansi_enabled,
            file_line_info: self.logging.include_location,
            include_target: true,
        }
    }

    /// Converts the metrics section to the telemetry crate's configuration.
    #[must_use]
    pub fn metrics_config(&self) -> bodybind_telemetry::MetricsConfig {
        bodybind_telemetry::MetricsConfig {
            enabled: self.metrics.enabled,
            service_name: self.metrics.service_name.clone(),
        }
    }
}

/// Builder for [`BodybindConfig`].
#[derive(Debug, Default)]
pub struct BodybindConfigBuilder {
    binder: Option<BinderConfig>,
    logging: Option<LoggingConfig>,
    metrics: Option<MetricsConfig>,
}

impl BodybindConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the binder configuration.
    #[must_use]
    pub fn binder(mut self, binder: BinderConfig) -> Self {
        self.binder = Some(binder);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Set the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, metrics: MetricsConfig) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> BodybindConfig {
        BodybindConfig {
            binder: self.binder.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<BodybindConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}
