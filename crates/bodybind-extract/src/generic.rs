//! Resolution of type variables against the handler's generic superclass.

use bodybind_core::{HandlerClass, TypeSpec};
use std::borrow::Cow;

/// Resolves type variable `var` through the immediate generic superclass of
/// `class`.
///
/// With a single type argument that argument is returned whatever the
/// variable's name. With several, the argument at the position of `var` in
/// the superclass's declared parameters is returned. An argument that is
/// itself a type variable does not count as a resolution.
///
/// # Example
///
/// ```
/// use bodybind_core::{GenericSuperclass, HandlerClass, TypeSpec};
/// use bodybind_extract::resolve_type_var;
///
/// let class = HandlerClass::new("TagController")
///     .extending_controller()
///     .with_generic_superclass(
///         GenericSuperclass::new("CrudController", ["T", "ID"])
///             .with_args([TypeSpec::String, TypeSpec::BigInteger]),
///     );
///
/// assert!(matches!(resolve_type_var(&class, "ID"), Some(TypeSpec::BigInteger)));
/// assert!(resolve_type_var(&class, "X").is_none());
/// ```
#[must_use]
pub fn resolve_type_var(class: &HandlerClass, var: &str) -> Option<TypeSpec> {
    let superclass = class.generic_superclass()?;
    let resolved = match superclass.type_args() {
        [] => None,
        [only] => Some(only),
        args => superclass
            .type_params()
            .iter()
            .position(|param| *param == var)
            .and_then(|index| args.get(index)),
    }?;

    match resolved {
        TypeSpec::Var(_) => None,
        concrete => Some(concrete.clone()),
    }
}

/// Returns the type a parameter binds as: its declared type, or the resolved
/// type argument when it is declared as a type variable.
///
/// Unresolved variables stay as they are and bind as erased JSON.
#[must_use]
pub fn effective_type<'a>(class: &HandlerClass, declared: &'a TypeSpec) -> Cow<'a, TypeSpec> {
    match declared {
        TypeSpec::Var(var) => match resolve_type_var(class, var) {
            Some(resolved) => {
                tracing::trace!(class = class.name(), var, resolved = %resolved, "resolved type variable");
                Cow::Owned(resolved)
            }
            None => Cow::Borrowed(declared),
        },
        other => Cow::Borrowed(other),
    }
}
