//! Date and time parsing for temporal targets.

use crate::ValueError;
use bodybind_config::{ConfigError, TemporalConfig, DEFAULT_TEMPORAL_FORMATS};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use serde_json::Value;

/// Parses JSON leaves into instants.
///
/// Numbers are epoch milliseconds. Strings are tried as RFC 3339 first, then
/// against each configured pattern as a date-time, a date (at midnight) and
/// finally a time (on 1970-01-01). Values without a zone are interpreted in
/// the configured offset, which is also used to decompose instants into
/// local values.
///
/// # Example
///
/// ```
/// use bodybind_extract::TemporalParser;
/// use chrono::{FixedOffset, NaiveDate};
/// use serde_json::json;
///
/// let parser = TemporalParser::default();
/// let date = parser.local_date(&json!("2024-02-29")).unwrap();
/// assert_eq!(date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
///
/// let tokyo = TemporalParser::new(FixedOffset::east_opt(9 * 3600).unwrap(), ["%Y-%m-%d %H:%M"]);
/// let instant = tokyo.instant(&json!("2024-01-01 09:00")).unwrap();
/// assert_eq!(instant.to_rfc3339(), "2024-01-01T00:00:00+00:00");
/// ```
#[derive(Debug, Clone)]
pub struct TemporalParser {
    offset: FixedOffset,
    formats: Vec<String>,
}

impl Default for TemporalParser {
    fn default() -> Self {
        Self::new(utc(), DEFAULT_TEMPORAL_FORMATS.iter().copied())
    }
}

impl TemporalParser {
    /// Creates a parser with an offset and chrono format patterns.
    #[must_use]
    pub fn new<I, S>(offset: FixedOffset, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            offset,
            formats: formats.into_iter().map(Into::into).collect(),
        }
    }

    /// Builds a parser from the temporal configuration section.
    pub fn from_config(config: &TemporalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.offset()?, config.formats.iter().cloned()))
    }

    /// Returns the configured offset.
    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Returns the configured patterns.
    #[must_use]
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    /// Parses an absolute instant.
    pub fn instant(&self, value: &Value) -> Result<DateTime<Utc>, ValueError> {
        match value {
            Value::Number(number) => {
                let millis = number
                    .as_i64()
                    .or_else(|| number.as_f64().map(|f| f.trunc() as i64));
                millis
                    .and_then(DateTime::from_timestamp_millis)
                    .ok_or_else(|| {
                        ValueError::conversion(format!("{number} is out of range for an instant"))
                    })
            }
            Value::String(text) => self.parse_text(text.trim()).ok_or_else(|| {
                ValueError::conversion(format!("can not parse {text:?} as a date/time"))
            }),
            other => Err(ValueError::conversion(format!(
                "can not parse {other} as a date/time"
            ))),
        }
    }

    /// Parses a date-time in the configured offset.
    pub fn local_date_time(&self, value: &Value) -> Result<NaiveDateTime, ValueError> {
        self.instant(value)
            .map(|instant| instant.with_timezone(&self.offset).naive_local())
    }

    /// Parses a date in the configured offset.
    pub fn local_date(&self, value: &Value) -> Result<NaiveDate, ValueError> {
        self.local_date_time(value).map(|dt| dt.date())
    }

    /// Parses a time of day in the configured offset.
    pub fn local_time(&self, value: &Value) -> Result<NaiveTime, ValueError> {
        self.local_date_time(value).map(|dt| dt.time())
    }

    fn parse_text(&self, text: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }

        let naive = self
            .formats
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(text, f).ok())
            .or_else(|| {
                self.formats
                    .iter()
                    .find_map(|f| NaiveDate::parse_from_str(text, f).ok())
                    .map(|date| date.and_time(NaiveTime::MIN))
            })
            .or_else(|| {
                self.formats
                    .iter()
                    .find_map(|f| NaiveTime::parse_from_str(text, f).ok())
                    .and_then(|time| NaiveDate::from_ymd_opt(1970, 1, 1).map(|d| d.and_time(time)))
            })?;

        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}
