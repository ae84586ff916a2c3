//! Handler, method and parameter descriptors.
//!
//! Descriptors are built once when handlers are registered and are read-only
//! afterwards. They carry everything the binder would otherwise learn through
//! reflection: declared parameter types, binding annotations and the generic
//! superclass a concrete handler fixes.

use crate::interceptor::HandlerResult;
use crate::{Invocation, TypeSpec};
use std::fmt;
use std::sync::Arc;

/// The immediate generic superclass of a handler class, with its type
/// arguments fixed by the subclass.
///
/// # Example
///
/// ```
/// use bodybind_core::{GenericSuperclass, TypeSpec};
///
/// // class UserController extends CrudController<User, Long>
/// let parent = GenericSuperclass::new("CrudController", ["T", "ID"])
///     .with_args([TypeSpec::String, TypeSpec::Boxed(bodybind_core::Primitive::Long)]);
///
/// assert_eq!(parent.type_params(), ["T", "ID"]);
/// assert_eq!(parent.type_args().len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct GenericSuperclass {
    name: String,
    type_params: Vec<&'static str>,
    type_args: Vec<TypeSpec>,
}

impl GenericSuperclass {
    /// Creates a superclass declaration with its type parameter names.
    #[must_use]
    pub fn new(name: impl Into<String>, type_params: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            name: name.into(),
            type_params: type_params.into_iter().collect(),
            type_args: Vec::new(),
        }
    }

    /// Sets the actual type arguments, positionally matching the parameters.
    #[must_use]
    pub fn with_args(mut self, type_args: impl IntoIterator<Item = TypeSpec>) -> Self {
        self.type_args = type_args.into_iter().collect();
        self
    }

    /// Returns the superclass name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the type variables declared by the superclass.
    #[must_use]
    pub fn type_params(&self) -> &[&'static str] {
        &self.type_params
    }

    /// Returns the actual type arguments.
    #[must_use]
    pub fn type_args(&self) -> &[TypeSpec] {
        &self.type_args
    }
}

/// The runtime class of a handler instance.
#[derive(Debug, Clone)]
pub struct HandlerClass {
    name: String,
    extends_controller: bool,
    generic_superclass: Option<GenericSuperclass>,
}

impl HandlerClass {
    /// Creates a plain handler class.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extends_controller: false,
            generic_superclass: None,
        }
    }

    /// Marks the class as extending the controller base that supports
    /// container bindings and generic resolution.
    #[must_use]
    pub fn extending_controller(mut self) -> Self {
        self.extends_controller = true;
        self
    }

    /// Declares the immediate generic superclass.
    #[must_use]
    pub fn with_generic_superclass(mut self, superclass: GenericSuperclass) -> Self {
        self.generic_superclass = Some(superclass);
        self
    }

    /// Returns the class name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the class extends the controller base.
    #[must_use]
    pub const fn extends_controller(&self) -> bool {
        self.extends_controller
    }

    /// Returns the immediate generic superclass, if declared.
    #[must_use]
    pub const fn generic_superclass(&self) -> Option<&GenericSuperclass> {
        self.generic_superclass.as_ref()
    }
}

/// The binding annotation attached to a parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindJson {
    path: String,
    skip_convert_error: bool,
}

impl BindJson {
    /// Binds the whole body.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds the fragment at `path`.
    #[must_use]
    pub fn at(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            skip_convert_error: false,
        }
    }

    /// Downgrades conversion failures to a logged error and a default value.
    #[must_use]
    pub fn skip_convert_error(mut self) -> Self {
        self.skip_convert_error = true;
        self
    }

    /// Returns the path expression.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if conversion failures are skipped.
    #[must_use]
    pub const fn skips_convert_error(&self) -> bool {
        self.skip_convert_error
    }
}

/// A handler method parameter.
#[derive(Debug, Clone)]
pub struct ParamDescriptor {
    name: String,
    declared: TypeSpec,
    binding: Option<BindJson>,
}

impl ParamDescriptor {
    /// Creates an unannotated parameter.
    #[must_use]
    pub fn new(name: impl Into<String>, declared: TypeSpec) -> Self {
        Self {
            name: name.into(),
            declared,
            binding: None,
        }
    }

    /// Attaches the binding annotation.
    #[must_use]
    pub fn bind_json(mut self, binding: BindJson) -> Self {
        self.binding = Some(binding);
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub const fn declared(&self) -> &TypeSpec {
        &self.declared
    }

    /// Returns the binding annotation, if present.
    #[must_use]
    pub const fn binding(&self) -> Option<&BindJson> {
        self.binding.as_ref()
    }
}

/// A handler action: receives the bound invocation.
pub type ActionFn = Arc<dyn Fn(&Invocation) -> HandlerResult + Send + Sync>;

/// A handler method.
///
/// # Example
///
/// ```
/// use bodybind_core::{BindJson, MethodDescriptor, ParamDescriptor, Primitive, TypeSpec};
///
/// let method = MethodDescriptor::new("save")
///     .param(ParamDescriptor::new("name", TypeSpec::String).bind_json(BindJson::at("user.name")))
///     .param(ParamDescriptor::new("age", TypeSpec::Primitive(Primitive::Int)));
///
/// assert_eq!(method.signature("UserController"), "UserController.save(String name, int age)");
/// assert!(method.has_bindings());
/// ```
#[derive(Clone)]
pub struct MethodDescriptor {
    name: String,
    params: Vec<ParamDescriptor>,
    action: Option<ActionFn>,
}

impl MethodDescriptor {
    /// Creates a method without parameters or action.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Vec::new(),
            action: None,
        }
    }

    /// Appends a parameter.
    #[must_use]
    pub fn param(mut self, param: ParamDescriptor) -> Self {
        self.params.push(param);
        self
    }

    /// Sets the action run after all interceptors.
    #[must_use]
    pub fn action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Invocation) -> HandlerResult + Send + Sync + 'static,
    {
        self.action = Some(Arc::new(action));
        self
    }

    /// Returns the method name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the parameters in declaration order.
    #[must_use]
    pub fn params(&self) -> &[ParamDescriptor] {
        &self.params
    }

    /// Returns the action, if set.
    #[must_use]
    pub const fn action_fn(&self) -> Option<&ActionFn> {
        self.action.as_ref()
    }

    /// Returns `true` if any parameter carries the binding annotation.
    #[must_use]
    pub fn has_bindings(&self) -> bool {
        self.params.iter().any(|p| p.binding.is_some())
    }

    /// Renders `Class.method(Type name, ...)` for diagnostics.
    #[must_use]
    pub fn signature(&self, class: &str) -> String {
        let params = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.declared, p.name))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{class}.{}({params})", self.name)
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("action", &self.action.is_some())
            .finish()
    }
}
