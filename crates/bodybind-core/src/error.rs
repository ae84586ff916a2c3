//! Error types for bodybind.
//!
//! Binding surfaces exactly two kinds of failure to the host framework:
//!
//! | Variant | When | Status |
//! |---|---|---|
//! | [`BindError::BadRequest`] | request time: bad JSON, bad path, failed conversion | `400` |
//! | [`BindError::Configuration`] | handler registration: unsupported binding shape | `500` |
//!
//! The request-time taxonomy is preserved in [`FailureKind`] so that logs and
//! error envelopes can tell a malformed body apart from a malformed path.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`BindError`].
pub type BindResult<T> = Result<T, BindError>;

/// What went wrong while binding a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// The body is non-blank but not a JSON object or array.
    BadJson,
    /// A path expression could not be evaluated.
    InvalidPath,
    /// A JSON value could not be converted to the parameter type.
    Conversion,
}

impl FailureKind {
    /// Returns the machine-readable error code for this kind.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BadJson => "BAD_JSON",
            Self::InvalidPath => "INVALID_PATH",
            Self::Conversion => "CONVERSION_FAILED",
        }
    }

    /// Returns the label used for metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::BadJson => "bad_json",
            Self::InvalidPath => "invalid_path",
            Self::Conversion => "conversion",
        }
    }
}

/// Standard error type for bodybind.
///
/// # Example
///
/// ```
/// use bodybind_core::{BindError, FailureKind};
/// use http::StatusCode;
///
/// let err = BindError::bad_json("expected value at line 1 column 2");
/// assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
/// assert_eq!(err.failure_kind(), Some(FailureKind::BadJson));
/// ```
#[derive(Error, Debug, Clone)]
pub enum BindError {
    /// The request cannot be bound; the handler must not run.
    #[error("Bad request: {message}")]
    BadRequest {
        /// Which stage failed.
        kind: FailureKind,
        /// Human-readable diagnostic.
        message: String,
        /// The offending parameter, if the failure is parameter specific.
        parameter: Option<String>,
        /// Rendered signature of the handler method.
        method: Option<String>,
    },

    /// A handler declares a binding the binder cannot support.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable diagnostic.
        message: String,
        /// Rendered signature of the rejected handler method.
        method: String,
    },
}

impl BindError {
    /// Creates a bad-request error for an unparseable body.
    #[must_use]
    pub fn bad_json(message: impl Into<String>) -> Self {
        Self::BadRequest {
            kind: FailureKind::BadJson,
            message: message.into(),
            parameter: None,
            method: None,
        }
    }

    /// Creates a bad-request error attributed to one handler parameter.
    #[must_use]
    pub fn parameter(
        kind: FailureKind,
        parameter: impl Into<String>,
        method: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::BadRequest {
            kind,
            message: message.into(),
            parameter: Some(parameter.into()),
            method: Some(method.into()),
        }
    }

    /// Creates a registration-time configuration error.
    #[must_use]
    pub fn configuration(message: impl Into<String>, method: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            method: method.into(),
        }
    }

    /// Returns the request-time failure kind, `None` for configuration errors.
    #[must_use]
    pub const fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Self::BadRequest { kind, .. } => Some(*kind),
            Self::Configuration { .. } => None,
        }
    }

    /// Returns the offending parameter name, if any.
    #[must_use]
    pub fn parameter_name(&self) -> Option<&str> {
        match self {
            Self::BadRequest { parameter, .. } => parameter.as_deref(),
            Self::Configuration { .. } => None,
        }
    }

    /// Returns the rendered method signature, if any.
    #[must_use]
    pub fn method_signature(&self) -> Option<&str> {
        match self {
            Self::BadRequest { method, .. } => method.as_deref(),
            Self::Configuration { method, .. } => Some(method),
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::Configuration { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest { kind, .. } => kind.error_code(),
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self) -> ErrorEnvelope {
        let details = match self {
            Self::BadRequest {
                parameter, method, ..
            } if parameter.is_some() || method.is_some() => Some(serde_json::json!({
                "parameter": parameter,
                "method": method,
            })),
            Self::Configuration { method, .. } => Some(serde_json::json!({ "method": method })),
            Self::BadRequest { .. } => None,
        };

        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.to_string(),
                details,
            },
        }
    }
}

/// Error returned by a handler action.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Binding failed before the action ran.
    #[error(transparent)]
    Bind(#[from] BindError),

    /// The action itself failed.
    #[error("Handler error: {0}")]
    Handler(#[from] anyhow::Error),

    /// No action is registered under the requested key.
    #[error("No action registered for {0}")]
    NotFound(String),
}

impl HandlerError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Bind(err) => err.status_code(),
            Self::Handler(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Additional error details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}
