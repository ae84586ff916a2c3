//! Per-parameter binding errors.
//!
//! A [`ValueError`] never leaves the binder as is: it is either downgraded by
//! `skip_convert_error` or wrapped into a [`BindError::BadRequest`] naming the
//! parameter and handler method.
//!
//! [`BindError::BadRequest`]: bodybind_core::BindError::BadRequest

use bodybind_core::FailureKind;
use thiserror::Error;

/// Error raised while evaluating a path or converting a value.
#[derive(Debug, Error)]
pub enum ValueError {
    /// The path expression is malformed or cannot be applied to the document.
    #[error("invalid path {path:?}: {reason}")]
    InvalidPath {
        /// The full path expression.
        path: String,
        /// What is wrong with it.
        reason: String,
    },

    /// A value cannot be converted to the target type.
    #[error("{0}")]
    Conversion(String),

    /// Deserializing into a user type failed.
    #[error(transparent)]
    Materialize(#[from] serde_json::Error),
}

impl ValueError {
    /// Creates an invalid path error.
    #[must_use]
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Creates a conversion error.
    #[must_use]
    pub fn conversion(message: impl Into<String>) -> Self {
        Self::Conversion(message.into())
    }

    /// Returns the failure kind reported to the host.
    #[must_use]
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::InvalidPath { .. } => FailureKind::InvalidPath,
            Self::Conversion(_) | Self::Materialize(_) => FailureKind::Conversion,
        }
    }
}
