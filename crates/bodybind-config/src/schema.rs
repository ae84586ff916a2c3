//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use chrono::format::{Item, StrftimeItems};
use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Date/time patterns tried, in order, after RFC 3339.
pub const DEFAULT_TEMPORAL_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y%m%d%H%M%S",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
    "%H:%M:%S%.f",
    "%H:%M",
];

/// Temporal conversion settings.
///
/// # Example
///
/// ```
/// use bodybind_config::TemporalConfig;
///
/// let config = TemporalConfig {
///     utc_offset: "+08:00".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(config.offset().unwrap().local_minus_utc(), 8 * 3600);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct TemporalConfig {
    /// Offset used for strings without a zone and for local decomposition.
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,

    /// chrono patterns tried in order after RFC 3339.
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

impl Default for TemporalConfig {
    fn default() -> Self {
        Self {
            utc_offset: default_utc_offset(),
            formats: default_formats(),
        }
    }
}

impl TemporalConfig {
    /// Parses `utc_offset`.
    ///
    /// Accepts `Z`, `UTC`, `+HH:MM`, `+HHMM` and `+HH`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the offset cannot be parsed.
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        parse_utc_offset(&self.utc_offset).ok_or_else(|| {
            ConfigError::invalid_value(
                "binder.temporal.utc_offset",
                format!("expected Z or +HH:MM, got {:?}", self.utc_offset),
            )
        })
    }

    /// Validates the offset and every format pattern.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` on an unparsable offset, an empty format list
    /// or an invalid pattern.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.offset()?;

        if self.formats.is_empty() {
            return Err(ConfigError::invalid_value(
                "binder.temporal.formats",
                "at least one format is required",
            ));
        }

        if let Some(bad) = self
            .formats
            .iter()
            .find(|f| StrftimeItems::new(f).any(|item| matches!(item, Item::Error)))
        {
            return Err(ConfigError::invalid_value(
                "binder.temporal.formats",
                format!("invalid pattern: {bad}"),
            ));
        }

        Ok(())
    }
}

fn default_utc_offset() -> String {
    "+00:00".to_string()
}

fn default_formats() -> Vec<String> {
    DEFAULT_TEMPORAL_FORMATS
        .iter()
        .map(|f| (*f).to_string())
        .collect()
}

fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if minutes >= 60 {
        return None;
    }

    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Binder configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct BinderConfig {
    /// Whether the binder is attached to eligible handler methods.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Temporal conversion settings.
    #[serde(default)]
    pub temporal: TemporalConfig,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            temporal: TemporalConfig::default(),
        }
    }
}

/// Log format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON formatted logs (production).
    #[default]
    Json,
    /// Human-readable pretty format (development).
    Pretty,
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level or filter directive.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include ANSI color codes in output.
    #[serde(default)]
    pub ansi_enabled: bool,

    /// Include source file and line in logs.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
            ansi_enabled: false,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct MetricsConfig {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Value of the `service` label.
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            service_name: default_service_name(),
        }
    }
}

fn default_service_name() -> String {
    "bodybind".to_string()
}

fn default_true() -> bool {
    true
}
