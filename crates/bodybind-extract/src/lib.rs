//! # Bodybind Extract
//!
//! Binds handler parameters from a JSON request body.
//!
//! Parameters opt in with [`BindJson`](bodybind_core::BindJson), optionally
//! naming a path into the body. The binder evaluates the path, then converts
//! or materializes the selected fragment into the parameter's declared type.
//!
//! | Component | Role |
//! |-----------|------|
//! | [`JsonPath`] | Dotted path expressions with indexes and projections |
//! | [`TypeConverter`] | JSON leaves to primitives, strings, big numbers and dates |
//! | [`TemporalParser`] | Epoch milliseconds and configurable date patterns |
//! | [`materialize_object`], [`materialize_collection`] | Objects and arrays to maps, collections and user types |
//! | [`resolve_type_var`] | Type variables fixed by the handler's generic superclass |
//! | [`JsonBodyBinder`] | The interceptor and its registration-time builder |
//!
//! ## Path Syntax
//!
//! ```text
//! user.name          field of a nested object
//! users[0].name      element of an array (users[] is users[0])
//! orders[id]         collection targets only: `id` of every order
//! ```
//!
//! ## Example
//!
//! ```rust
//! use bodybind_core::{BindJson, HandlerClass, Invocation, MethodDescriptor, ParamDescriptor, TypeSpec};
//! use bodybind_extract::JsonBodyBinder;
//! use std::sync::Arc;
//!
//! let method = MethodDescriptor::new("tag")
//!     .param(ParamDescriptor::new("ids", TypeSpec::list::<u64>()).bind_json(BindJson::at("items[id]")));
//! let class = HandlerClass::new("TagController").extending_controller();
//!
//! let mut inv = Invocation::new(
//!     Arc::new(class),
//!     Arc::new(method),
//!     r#"{"items": [{"id": 4}, {"id": 9}]}"#,
//! );
//! JsonBodyBinder::new().bind(&mut inv).unwrap();
//!
//! assert_eq!(inv.object::<Vec<u64>>(0), Some(&vec![4, 9]));
//! ```

#![doc(html_root_url = "https://docs.rs/bodybind-extract/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod binder;
mod convert;
mod error;
mod generic;
mod materialize;
mod path;
mod temporal;

pub use binder::JsonBodyBinder;
pub use convert::{is_absent, string_form, TypeConverter};
pub use error::ValueError;
pub use generic::{effective_type, resolve_type_var};
pub use materialize::{materialize_collection, materialize_object};
pub use path::JsonPath;
pub use temporal::TemporalParser;
