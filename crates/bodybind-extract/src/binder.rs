//! The JSON body binder.
//!
//! [`JsonBodyBinder`] is both the [`InterceptorBuilder`] consulted when
//! handlers are registered and the [`Interceptor`] it attaches.
//!
//! # Chain Position
//!
//! ```text
//! Invocation → ... → [JsonBodyBinder] → ... → Handler action
//! ```
//!
//! # Per Invocation
//!
//! 1. A blank body leaves every slot untouched.
//! 2. The body is parsed once; it must be a JSON object or array.
//! 3. Each parameter carrying [`BindJson`] is bound from the document:
//!    collection targets through [`JsonPath::collection`], everything else
//!    through [`JsonPath::scalar`].
//! 4. Slots are written only after every parameter bound, so a rejected
//!    invocation leaves the arguments as they were.
//!
//! [`BindJson`]: bodybind_core::BindJson

use crate::materialize::{materialize_collection, materialize_object};
use crate::{effective_type, is_absent, JsonPath, TemporalParser, TypeConverter, ValueError};
use bodybind_config::{BinderConfig, ConfigError};
use bodybind_core::{
    BindError, BindResult, BoundValue, FailureKind, HandlerClass, HandlerResult, Interceptor,
    InterceptorBuilder, InterceptorChain, Invocation, MethodDescriptor, Next, TypeSpec,
};
use bodybind_telemetry::{record_bad_request, record_binding, BindOutcome};
use serde_json::Value;
use std::sync::Arc;

/// Binds annotated handler parameters from the JSON request body.
///
/// # Example
///
/// ```
/// use bodybind_core::{ActionRegistry, BindJson, HandlerClass, MethodDescriptor, ParamDescriptor, Primitive, TypeSpec};
/// use bodybind_extract::JsonBodyBinder;
/// use std::sync::Arc;
///
/// let mut registry = ActionRegistry::new().with_builder(Arc::new(JsonBodyBinder::new()));
/// registry
///     .register(
///         HandlerClass::new("UserController"),
///         vec![MethodDescriptor::new("rename")
///             .param(ParamDescriptor::new("name", TypeSpec::String).bind_json(BindJson::at("user.name")))
///             .param(ParamDescriptor::new("age", TypeSpec::Primitive(Primitive::Int)).bind_json(BindJson::at("user.age")))
///             .action(|inv| {
///                 let name: String = inv.get(0).unwrap_or_default();
///                 let age: i32 = inv.get(1).unwrap_or_default();
///                 Ok(serde_json::json!(format!("{name}:{age}")))
///             })],
///     )
///     .unwrap();
///
/// let result = registry
///     .handle("UserController.rename", r#"{"user":{"name":"Ada","age":"36"}}"#)
///     .unwrap();
/// assert_eq!(result, serde_json::json!("Ada:36"));
/// ```
#[derive(Debug, Clone)]
pub struct JsonBodyBinder {
    converter: TypeConverter,
    enabled: bool,
}

impl Default for JsonBodyBinder {
    fn default() -> Self {
        Self::new()
    }
}

impl JsonBodyBinder {
    /// Interceptor name; a chain holds at most one binder.
    pub const NAME: &'static str = "json-body-binder";

    /// Creates an enabled binder with UTC temporal parsing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            converter: TypeConverter::default(),
            enabled: true,
        }
    }

    /// Creates an enabled binder with a custom temporal parser.
    #[must_use]
    pub fn with_temporal(temporal: TemporalParser) -> Self {
        Self {
            converter: TypeConverter::new(temporal),
            enabled: true,
        }
    }

    /// Builds a binder from the `[binder]` configuration section.
    pub fn from_config(config: &BinderConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            converter: TypeConverter::new(TemporalParser::from_config(&config.temporal)?),
            enabled: config.enabled,
        })
    }

    /// Returns `true` if the builder attaches the binder to handler methods.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Returns the converter used for scalar targets.
    #[must_use]
    pub const fn converter(&self) -> &TypeConverter {
        &self.converter
    }

    /// Binds every annotated parameter of `inv` from its raw body.
    pub fn bind(&self, inv: &mut Invocation) -> BindResult<()> {
        if inv.raw_body().trim().is_empty() {
            return Ok(());
        }

        let document: Value = serde_json::from_str(inv.raw_body()).map_err(|e| {
            record_bad_request(FailureKind::BadJson);
            BindError::bad_json(e.to_string())
        })?;
        if !matches!(document, Value::Object(_) | Value::Array(_)) {
            record_bad_request(FailureKind::BadJson);
            return Err(BindError::bad_json(
                "request body must be a JSON object or array",
            ));
        }

        let mut bound = Vec::new();
        for (index, param) in inv.method().params().iter().enumerate() {
            let Some(binding) = param.binding() else {
                continue;
            };
            let declared = effective_type(inv.class(), param.declared());

            let value = match self.bind_value(&document, binding.path(), &declared) {
                Ok(value) => {
                    record_binding(BindOutcome::Bound);
                    value
                }
                Err(err) if binding.skips_convert_error() => {
                    tracing::error!(
                        parameter = param.name(),
                        method = %inv.signature(),
                        path = binding.path(),
                        error = %err,
                        "can not bind parameter, using default"
                    );
                    record_binding(BindOutcome::Skipped);
                    declared.default_value()
                }
                Err(err) => {
                    let kind = err.kind();
                    let signature = inv.signature();
                    record_binding(BindOutcome::Failed);
                    record_bad_request(kind);
                    return Err(BindError::parameter(
                        kind,
                        param.name(),
                        signature.clone(),
                        format!("Can not parse \"{declared}\" in method {signature}, Cause: {err}"),
                    ));
                }
            };
            bound.push((index, value));
        }

        for (index, value) in bound {
            inv.set_arg(index, value);
        }
        Ok(())
    }

    fn bind_value(
        &self,
        document: &Value,
        path: &str,
        declared: &TypeSpec,
    ) -> Result<BoundValue, ValueError> {
        let path = JsonPath::parse(path);

        if let TypeSpec::Collection(collection) = declared {
            return match path.collection(document)? {
                Some(items) => materialize_collection(&items, collection),
                None => Ok(declared.default_value()),
            };
        }

        match path.scalar(document)? {
            value if is_absent(value) => Ok(declared.default_value()),
            Some(object @ Value::Object(_)) => materialize_object(&self.converter, object, declared),
            Some(leaf) => self.converter.convert(leaf, declared),
            None => Ok(declared.default_value()),
        }
    }
}

impl Interceptor for JsonBodyBinder {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn intercept(&self, inv: &mut Invocation, next: Next<'_>) -> HandlerResult {
        self.bind(inv)?;
        next.run(inv)
    }
}

impl InterceptorBuilder for JsonBodyBinder {
    fn build(
        &self,
        class: &HandlerClass,
        method: &MethodDescriptor,
        chain: &mut InterceptorChain,
    ) -> BindResult<()> {
        if !self.enabled || !method.has_bindings() {
            return Ok(());
        }

        for param in method.params().iter().filter(|p| p.binding().is_some()) {
            let declared = effective_type(class, param.declared());
            if declared.is_container() && !class.extends_controller() {
                let signature = method.signature(class.name());
                tracing::error!(
                    parameter = param.name(),
                    method = %signature,
                    declared = %declared,
                    "container binding on a class that does not extend the controller base"
                );
                return Err(BindError::configuration(
                    format!(
                        "Can not bind \"{}\" as {declared}: map, collection and array parameters \
                         need a handler class extending the controller base",
                        param.name()
                    ),
                    signature,
                ));
            }
        }

        if chain.add_if_not_exist(Arc::new(self.clone())) {
            tracing::debug!(
                class = class.name(),
                method = method.name(),
                "attached json body binder"
            );
        }
        Ok(())
    }
}
