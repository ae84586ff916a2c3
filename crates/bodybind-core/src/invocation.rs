//! Handler invocation context.
//!
//! The [`Invocation`] carries one request through the interceptor chain: the
//! runtime handler class, the target method, the raw request body and the
//! argument slots interceptors fill in.

use crate::{BoundValue, FromBound, HandlerClass, MethodDescriptor};
use std::any::Any;
use std::sync::Arc;

/// A single handler invocation.
///
/// # Example
///
/// ```
/// use bodybind_core::{BoundValue, HandlerClass, Invocation, MethodDescriptor, ParamDescriptor, TypeSpec};
/// use std::sync::Arc;
///
/// let class = Arc::new(HandlerClass::new("EchoController"));
/// let method = Arc::new(MethodDescriptor::new("echo").param(ParamDescriptor::new("text", TypeSpec::String)));
///
/// let mut inv = Invocation::new(class, method, r#"{"text":"hi"}"#);
/// assert!(inv.arg(0).unwrap().is_null());
///
/// inv.set_arg(0, BoundValue::String("hi".into()));
/// assert_eq!(inv.get::<String>(0).as_deref(), Some("hi"));
/// ```
#[derive(Debug, Clone)]
pub struct Invocation {
    class: Arc<HandlerClass>,
    method: Arc<MethodDescriptor>,
    raw_body: String,
    args: Vec<BoundValue>,
}

impl Invocation {
    /// Creates an invocation with one `Null` slot per method parameter.
    #[must_use]
    pub fn new(
        class: Arc<HandlerClass>,
        method: Arc<MethodDescriptor>,
        raw_body: impl Into<String>,
    ) -> Self {
        let args = vec![BoundValue::Null; method.params().len()];
        Self {
            class,
            method,
            raw_body: raw_body.into(),
            args,
        }
    }

    /// Returns the runtime handler class.
    #[must_use]
    pub fn class(&self) -> &HandlerClass {
        &self.class
    }

    /// Returns the target method.
    #[must_use]
    pub fn method(&self) -> &MethodDescriptor {
        &self.method
    }

    /// Returns the raw request body.
    #[must_use]
    pub fn raw_body(&self) -> &str {
        &self.raw_body
    }

    /// Returns all argument slots.
    #[must_use]
    pub fn args(&self) -> &[BoundValue] {
        &self.args
    }

    /// Returns the argument at `index`.
    #[must_use]
    pub fn arg(&self, index: usize) -> Option<&BoundValue> {
        self.args.get(index)
    }

    /// Replaces the argument at `index`, returning the previous value.
    ///
    /// Out-of-range indexes are ignored and return `None`.
    pub fn set_arg(&mut self, index: usize, value: BoundValue) -> Option<BoundValue> {
        self.args
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, value))
    }

    /// Reads the argument at `index` as `T`.
    #[must_use]
    pub fn get<T: FromBound>(&self, index: usize) -> Option<T> {
        self.args.get(index).and_then(T::from_bound)
    }

    /// Borrows a materialized user value at `index`.
    #[must_use]
    pub fn object<T: Any>(&self, index: usize) -> Option<&T> {
        self.args.get(index).and_then(BoundValue::downcast_ref::<T>)
    }

    /// Returns the method signature rendered against the runtime class.
    #[must_use]
    pub fn signature(&self) -> String {
        self.method.signature(self.class.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParamDescriptor, Primitive, TypeSpec};

    fn invocation(body: &str) -> Invocation {
        let class = Arc::new(HandlerClass::new("C"));
        let method = Arc::new(
            MethodDescriptor::new("m")
                .param(ParamDescriptor::new("a", TypeSpec::Primitive(Primitive::Int)))
                .param(ParamDescriptor::new("b", TypeSpec::String)),
        );
        Invocation::new(class, method, body)
    }

    #[test]
    fn test_slots_start_null() {
        let inv = invocation("{}");
        assert_eq!(inv.args().len(), 2);
        assert!(inv.args().iter().all(BoundValue::is_null));
        assert_eq!(inv.raw_body(), "{}");
    }

    #[test]
    fn test_set_arg() {
        let mut inv = invocation("");
        let previous = inv.set_arg(0, BoundValue::Int(5));
        assert_eq!(previous, Some(BoundValue::Null));
        assert_eq!(inv.get::<i32>(0), Some(5));
        assert_eq!(inv.set_arg(9, BoundValue::Int(1)), None);
    }

    #[test]
    fn test_object_access() {
        let mut inv = invocation("");
        inv.set_arg(1, BoundValue::object(vec!["x".to_string()]));
        assert_eq!(inv.object::<Vec<String>>(1).map(Vec::len), Some(1));
        assert!(inv.object::<Vec<String>>(0).is_none());
        assert_eq!(inv.signature(), "C.m(int a, String b)");
    }
}
