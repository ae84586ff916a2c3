//! Declared parameter types.
//!
//! Handlers describe each parameter with a [`TypeSpec`]. Variants that need a
//! user type (`Object`, typed collections, parameterized maps) capture a
//! monomorphised serde materializer at construction, so the binder can turn a
//! JSON subtree into the concrete Rust value without runtime reflection.

use crate::BoundValue;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::any::Any;
use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// A materialized user value.
pub type AnyValue = Arc<dyn Any + Send + Sync>;

/// Deserializes a JSON value into a concrete, type-erased Rust value.
pub type MaterializeFn = fn(&Value) -> Result<AnyValue, serde_json::Error>;

/// Builds a concrete map from the entries of a JSON object.
pub type ConstructMapFn = fn(&Map<String, Value>) -> AnyValue;

/// Primitive kinds, shared by unboxed and boxed targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// 32-bit signed integer.
    Int,
    /// 64-bit signed integer.
    Long,
    /// 16-bit signed integer.
    Short,
    /// 8-bit signed integer.
    Byte,
    /// A single character.
    Char,
    /// 32-bit float.
    Float,
    /// 64-bit float.
    Double,
    /// Boolean.
    Boolean,
}

impl Primitive {
    /// Returns the unboxed type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Long => "long",
            Self::Short => "short",
            Self::Byte => "byte",
            Self::Char => "char",
            Self::Float => "float",
            Self::Double => "double",
            Self::Boolean => "boolean",
        }
    }

    /// Returns the boxed type name.
    #[must_use]
    pub const fn boxed_name(&self) -> &'static str {
        match self {
            Self::Int => "Integer",
            Self::Long => "Long",
            Self::Short => "Short",
            Self::Byte => "Byte",
            Self::Char => "Character",
            Self::Float => "Float",
            Self::Double => "Double",
            Self::Boolean => "Boolean",
        }
    }

    /// Returns the zero value substituted when a primitive target has no input.
    #[must_use]
    pub const fn default_value(&self) -> BoundValue {
        match self {
            Self::Int => BoundValue::Int(0),
            Self::Long => BoundValue::Long(0),
            Self::Short => BoundValue::Short(0),
            Self::Byte => BoundValue::Byte(0),
            Self::Char => BoundValue::Char('\0'),
            Self::Float => BoundValue::Float(0.0),
            Self::Double => BoundValue::Double(0.0),
            Self::Boolean => BoundValue::Bool(false),
        }
    }
}

/// Mapping targets.
#[derive(Debug, Clone, Copy)]
pub enum MapType {
    /// The unparameterized mapping interface.
    Raw,
    /// The JSON library's own object type.
    JsonObject,
    /// A constructible map type without declared generic arguments.
    Concrete {
        /// Display name of the map type.
        name: &'static str,
        /// Copies all entries into a fresh instance.
        construct: ConstructMapFn,
    },
}

impl MapType {
    /// A concrete map type built by default-constructing `M` and copying entries.
    #[must_use]
    pub fn concrete<M>() -> Self
    where
        M: Default + Extend<(String, Value)> + Send + Sync + 'static,
    {
        Self::Concrete {
            name: std::any::type_name::<M>(),
            construct: construct_map::<M>,
        }
    }
}

/// Kinds of multi-valued targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    /// Ordered list.
    List,
    /// Set with duplicate removal.
    Set,
    /// Fixed-size array.
    Array,
}

/// Element type of a parameterized collection.
#[derive(Debug, Clone, Copy)]
pub struct ElementType {
    /// Display name of the element type.
    pub name: &'static str,
    /// Materializes the whole JSON array into the collection.
    pub materialize: MaterializeFn,
}

/// Collection or array targets.
#[derive(Debug, Clone, Copy)]
pub struct CollectionType {
    /// Container kind.
    pub kind: CollectionKind,
    /// Element type, `None` for the unparameterized kind.
    pub element: Option<ElementType>,
}

/// A user type materialized through serde.
#[derive(Debug, Clone, Copy)]
pub struct ObjectType {
    /// Display name of the type.
    pub name: &'static str,
    /// Whether the type is a parameterized map.
    pub map_like: bool,
    /// Materializes a JSON value into the type.
    pub materialize: MaterializeFn,
}

/// The declared type of a handler parameter.
///
/// # Example
///
/// ```
/// use bodybind_core::{Primitive, TypeSpec};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     name: String,
/// }
///
/// let age = TypeSpec::Primitive(Primitive::Int);
/// let user = TypeSpec::object::<User>();
/// let ids = TypeSpec::list::<i32>();
///
/// assert!(age.is_primitive());
/// assert!(!user.is_container());
/// assert!(ids.is_collection());
/// assert_eq!(ids.to_string(), "List<i32>");
/// ```
#[derive(Debug, Clone)]
pub enum TypeSpec {
    /// An unboxed primitive; missing input yields its zero value.
    Primitive(Primitive),
    /// A boxed primitive; missing input yields null.
    Boxed(Primitive),
    /// Text.
    String,
    /// Arbitrary-precision integer.
    BigInteger,
    /// Arbitrary-precision decimal.
    BigDecimal,
    /// Byte sequence.
    Bytes,
    /// Absolute instant.
    Instant,
    /// Local date-time.
    LocalDateTime,
    /// Local date.
    LocalDate,
    /// Local time.
    LocalTime,
    /// Erased type; the JSON value is passed through unchanged.
    Any,
    /// A mapping target.
    Map(MapType),
    /// A collection or array target.
    Collection(CollectionType),
    /// A user type.
    Object(ObjectType),
    /// A bare type variable declared on the enclosing handler class.
    Var(&'static str),
}

impl TypeSpec {
    /// A user type deserialized with serde.
    #[must_use]
    pub fn object<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self::Object(ObjectType {
            name: std::any::type_name::<T>(),
            map_like: false,
            materialize: materialize::<T>,
        })
    }

    /// A parameterized map type (e.g. `HashMap<String, User>`) deserialized with serde.
    #[must_use]
    pub fn map_of<M>() -> Self
    where
        M: DeserializeOwned + Send + Sync + 'static,
    {
        Self::Object(ObjectType {
            name: std::any::type_name::<M>(),
            map_like: true,
            materialize: materialize::<M>,
        })
    }

    /// A list of `T`, bound as `Vec<T>`.
    #[must_use]
    pub fn list<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self::typed_collection::<T, Vec<T>>(CollectionKind::List)
    }

    /// An array of `T`, bound as `Vec<T>`.
    #[must_use]
    pub fn array<T>() -> Self
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        Self::typed_collection::<T, Vec<T>>(CollectionKind::Array)
    }

    /// A set of `T`, bound as `HashSet<T>`.
    #[must_use]
    pub fn set<T>() -> Self
    where
        T: DeserializeOwned + Eq + Hash + Send + Sync + 'static,
    {
        Self::typed_collection::<T, HashSet<T>>(CollectionKind::Set)
    }

    /// The unparameterized list kind, bound as a raw JSON array.
    #[must_use]
    pub const fn raw_list() -> Self {
        Self::Collection(CollectionType {
            kind: CollectionKind::List,
            element: None,
        })
    }

    /// The unparameterized set kind, bound as distinct JSON values.
    #[must_use]
    pub const fn raw_set() -> Self {
        Self::Collection(CollectionType {
            kind: CollectionKind::Set,
            element: None,
        })
    }

    /// The unparameterized mapping kind.
    #[must_use]
    pub const fn raw_map() -> Self {
        Self::Map(MapType::Raw)
    }

    fn typed_collection<T, C>(kind: CollectionKind) -> Self
    where
        C: DeserializeOwned + Send + Sync + 'static,
    {
        Self::Collection(CollectionType {
            kind,
            element: Some(ElementType {
                name: std::any::type_name::<T>(),
                materialize: materialize::<C>,
            }),
        })
    }

    /// Returns `true` for unboxed primitives.
    #[must_use]
    pub const fn is_primitive(&self) -> bool {
        matches!(self, Self::Primitive(_))
    }

    /// Returns `true` if binding runs in collection context.
    #[must_use]
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::Collection(_))
    }

    /// Returns `true` for map, collection and array targets.
    #[must_use]
    pub const fn is_container(&self) -> bool {
        match self {
            Self::Map(_) | Self::Collection(_) => true,
            Self::Object(object) => object.map_like,
            _ => false,
        }
    }

    /// Returns the value bound when input is missing, null or empty.
    #[must_use]
    pub const fn default_value(&self) -> BoundValue {
        match self {
            Self::Primitive(p) => p.default_value(),
            _ => BoundValue::Null,
        }
    }
}

impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primitive(p) => f.write_str(p.name()),
            Self::Boxed(p) => f.write_str(p.boxed_name()),
            Self::String => f.write_str("String"),
            Self::BigInteger => f.write_str("BigInteger"),
            Self::BigDecimal => f.write_str("BigDecimal"),
            Self::Bytes => f.write_str("byte[]"),
            Self::Instant => f.write_str("Instant"),
            Self::LocalDateTime => f.write_str("LocalDateTime"),
            Self::LocalDate => f.write_str("LocalDate"),
            Self::LocalTime => f.write_str("LocalTime"),
            Self::Any => f.write_str("Object"),
            Self::Map(MapType::Raw) => f.write_str("Map"),
            Self::Map(MapType::JsonObject) => f.write_str("JSONObject"),
            Self::Map(MapType::Concrete { name, .. }) => f.write_str(&short_type_name(name)),
            Self::Collection(collection) => {
                let element = collection.element.map(|e| short_type_name(e.name));
                match (collection.kind, element) {
                    (CollectionKind::List, None) => f.write_str("List"),
                    (CollectionKind::Set, None) => f.write_str("Set"),
                    (CollectionKind::Array, None) => f.write_str("Object[]"),
                    (CollectionKind::List, Some(e)) => write!(f, "List<{e}>"),
                    (CollectionKind::Set, Some(e)) => write!(f, "Set<{e}>"),
                    (CollectionKind::Array, Some(e)) => write!(f, "{e}[]"),
                }
            }
            Self::Object(object) => f.write_str(&short_type_name(object.name)),
            Self::Var(name) => f.write_str(name),
        }
    }
}

fn materialize<T>(value: &Value) -> Result<AnyValue, serde_json::Error>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    T::deserialize(value).map(|v| Arc::new(v) as AnyValue)
}

fn construct_map<M>(entries: &Map<String, Value>) -> AnyValue
where
    M: Default + Extend<(String, Value)> + Send + Sync + 'static,
{
    let mut map = M::default();
    map.extend(entries.iter().map(|(k, v)| (k.clone(), v.clone())));
    Arc::new(map)
}

/// Strips module paths from a `std::any::type_name` string.
///
/// `alloc::vec::Vec<my_app::User>` becomes `Vec<User>`.
#[must_use]
pub fn short_type_name(full: &str) -> String {
    let mut out = String::with_capacity(full.len());
    let mut segment = String::new();
    for c in full.chars() {
        if c.is_alphanumeric() || c == '_' || c == ':' {
            segment.push(c);
        } else {
            out.push_str(segment.rsplit("::").next().unwrap_or_default());
            segment.clear();
            out.push(c);
        }
    }
    out.push_str(segment.rsplit("::").next().unwrap_or_default());
    out
}
