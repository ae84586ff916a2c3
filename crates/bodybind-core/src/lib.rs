//! # Bodybind Core
//!
//! Core types shared by the bodybind crates.
//!
//! - [`TypeSpec`] - Declared parameter types, with captured serde materializers
//! - [`BoundValue`] - Values written into handler argument slots
//! - [`HandlerClass`], [`MethodDescriptor`], [`ParamDescriptor`], [`BindJson`] - Registration-time descriptors
//! - [`Invocation`] - One request travelling through the interceptor chain
//! - [`Interceptor`], [`InterceptorChain`], [`InterceptorBuilder`] - The chain around handler actions
//! - [`ActionRegistry`] - Handler discovery and dispatch
//! - [`BindError`] - Standard error type

#![doc(html_root_url = "https://docs.rs/bodybind-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod action;
mod descriptor;
mod error;
mod interceptor;
mod invocation;
pub mod types;
mod value;

pub use action::{Action, ActionRegistry};
pub use descriptor::{
    ActionFn, BindJson, GenericSuperclass, HandlerClass, MethodDescriptor, ParamDescriptor,
};
pub use error::{BindError, BindResult, ErrorDetail, ErrorEnvelope, FailureKind, HandlerError};
pub use interceptor::{
    ActionRef, HandlerResult, Interceptor, InterceptorBuilder, InterceptorChain, Next,
};
pub use invocation::Invocation;
pub use types::{
    AnyValue, CollectionKind, CollectionType, ElementType, MapType, ObjectType, Primitive,
    TypeSpec,
};
pub use value::{BoundValue, FromBound};
