//! # Bodybind
//!
//! **Bind handler parameters from JSON request bodies**
//!
//! Handler methods declare their parameters once at startup. Parameters
//! annotated with [`BindJson`](prelude::BindJson) are filled from the request
//! body before the handler runs:
//!
//! - Dotted paths with array indexes and projections (`order.lines[sku]`)
//! - Primitive, big-number, string, byte and date/time conversions
//! - Maps, collections and serde user types
//! - Type variables fixed by the handler's generic superclass
//! - Registration-time rejection of unsupported binding shapes
//!
//! ## Quick Start
//!
//! ```rust
//! use bodybind::prelude::*;
//! use serde::Deserialize;
//! use std::sync::Arc;
//!
//! #[derive(Deserialize)]
//! struct User {
//!     name: String,
//! }
//!
//! let mut registry = ActionRegistry::new().with_builder(Arc::new(JsonBodyBinder::new()));
//! registry
//!     .register(
//!         HandlerClass::new("UserController"),
//!         vec![MethodDescriptor::new("greet")
//!             .param(ParamDescriptor::new("user", TypeSpec::object::<User>()).bind_json(BindJson::at("user")))
//!             .action(|inv| {
//!                 let user = inv.object::<User>(0).map_or("nobody", |u| u.name.as_str());
//!                 Ok(serde_json::json!(format!("hello {user}")))
//!             })],
//!     )
//!     .unwrap();
//!
//! let reply = registry.handle("UserController.greet", r#"{"user":{"name":"Ada"}}"#).unwrap();
//! assert_eq!(reply, serde_json::json!("hello Ada"));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! register(class, methods) → InterceptorBuilder::build → InterceptorChain per method
//!                                                               ↓
//! handle(key, body) → Invocation → [JsonBodyBinder] → ... → action
//! ```

#![doc(html_root_url = "https://docs.rs/bodybind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use thiserror::Error;

// Re-export core types
pub use bodybind_core as core;

// Re-export the binder
pub use bodybind_extract as extract;

// Re-export configuration
pub use bodybind_config as config;

// Re-export telemetry
pub use bodybind_telemetry as telemetry;

use bodybind_config::{BodybindConfig, ConfigError};
use bodybind_extract::JsonBodyBinder;
use bodybind_telemetry::TelemetryError;

/// Error raised while setting bodybind up from configuration.
#[derive(Debug, Error)]
pub enum InitError {
    /// The configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Validates `config`, installs logging and metrics, and builds the binder.
///
/// Call once at startup, before registering handlers.
///
/// # Example
///
/// ```rust,no_run
/// use bodybind::config::ConfigLoader;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ConfigLoader::new()
///     .with_defaults()
///     .with_optional_file("bodybind.toml")?
///     .with_env_prefix("BODYBIND")
///     .load()?;
///
/// let binder = bodybind::init(&config)?;
/// # let _ = binder;
/// # Ok(())
/// # }
/// ```
pub fn init(config: &BodybindConfig) -> Result<JsonBodyBinder, InitError> {
    config.validate()?;
    bodybind_telemetry::init_telemetry(&config.log_config(), &config.metrics_config())?;

    let binder = JsonBodyBinder::from_config(&config.binder)?;
    tracing::info!(
        enabled = binder.is_enabled(),
        utc_offset = %binder.converter().temporal().offset(),
        "json body binder ready"
    );
    Ok(binder)
}

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use bodybind::prelude::*;
/// ```
pub mod prelude {
    pub use bodybind_core::{
        ActionRegistry, BindError, BindJson, BindResult, BoundValue, FromBound,
        GenericSuperclass, HandlerClass, HandlerError, HandlerResult, Interceptor,
        InterceptorBuilder, InterceptorChain, Invocation, MapType, MethodDescriptor, Next,
        ParamDescriptor, Primitive, TypeSpec,
    };

    pub use bodybind_extract::{JsonBodyBinder, JsonPath, TemporalParser, TypeConverter};

    pub use bodybind_config::{BodybindConfig, ConfigLoader};
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodybind_config::TemporalConfig;

    #[test]
    fn test_init_rejects_invalid_config() {
        let mut config = BodybindConfig::default();
        config.binder.temporal = TemporalConfig {
            utc_offset: "somewhere".to_string(),
            ..Default::default()
        };
        assert!(matches!(init(&config), Err(InitError::Config(_))));
    }
}
