//! Values written into handler argument slots.

use crate::types::AnyValue;
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use num_bigint::BigInt;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A bound argument value.
///
/// Scalars carry their converted Rust value, raw maps and lists stay as
/// [`serde_json::Value`], and user types are type-erased behind
/// [`BoundValue::Object`].
///
/// # Example
///
/// ```
/// use bodybind_core::{BoundValue, FromBound};
///
/// let value = BoundValue::Int(42);
/// assert_eq!(i32::from_bound(&value), Some(42));
/// assert_eq!(i64::from_bound(&value), None);
/// assert!(BoundValue::Null.is_null());
/// ```
#[derive(Clone)]
pub enum BoundValue {
    /// No value.
    Null,
    /// 32-bit integer.
    Int(i32),
    /// 64-bit integer.
    Long(i64),
    /// 16-bit integer.
    Short(i16),
    /// 8-bit integer.
    Byte(i8),
    /// Character.
    Char(char),
    /// 32-bit float.
    Float(f32),
    /// 64-bit float.
    Double(f64),
    /// Boolean.
    Bool(bool),
    /// Arbitrary-precision integer.
    BigInteger(BigInt),
    /// Arbitrary-precision decimal.
    BigDecimal(BigDecimal),
    /// Byte sequence.
    Bytes(Vec<u8>),
    /// Text.
    String(String),
    /// Absolute instant.
    Instant(DateTime<Utc>),
    /// Local date-time.
    LocalDateTime(NaiveDateTime),
    /// Local date.
    LocalDate(NaiveDate),
    /// Local time.
    LocalTime(NaiveTime),
    /// A raw JSON object, array or pass-through value.
    Json(Value),
    /// Distinct JSON values of an unparameterized set.
    Set(Vec<Value>),
    /// A materialized user value.
    Object(AnyValue),
}

impl BoundValue {
    /// Wraps a concrete value as [`BoundValue::Object`].
    #[must_use]
    pub fn object<T: Any + Send + Sync>(value: T) -> Self {
        Self::Object(Arc::new(value))
    }

    /// Returns `true` if this is [`BoundValue::Null`].
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrows the materialized user value as `T`.
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => object.downcast_ref::<T>(),
            _ => None,
        }
    }

    /// Returns the variant name, used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Int(_) => "int",
            Self::Long(_) => "long",
            Self::Short(_) => "short",
            Self::Byte(_) => "byte",
            Self::Char(_) => "char",
            Self::Float(_) => "float",
            Self::Double(_) => "double",
            Self::Bool(_) => "boolean",
            Self::BigInteger(_) => "big_integer",
            Self::BigDecimal(_) => "big_decimal",
            Self::Bytes(_) => "bytes",
            Self::String(_) => "string",
            Self::Instant(_) => "instant",
            Self::LocalDateTime(_) => "local_date_time",
            Self::LocalDate(_) => "local_date",
            Self::LocalTime(_) => "local_time",
            Self::Json(_) => "json",
            Self::Set(_) => "set",
            Self::Object(_) => "object",
        }
    }
}

impl Default for BoundValue {
    fn default() -> Self {
        Self::Null
    }
}

impl fmt::Debug for BoundValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("Null"),
            Self::Int(v) => f.debug_tuple("Int").field(v).finish(),
            Self::Long(v) => f.debug_tuple("Long").field(v).finish(),
            Self::Short(v) => f.debug_tuple("Short").field(v).finish(),
            Self::Byte(v) => f.debug_tuple("Byte").field(v).finish(),
            Self::Char(v) => f.debug_tuple("Char").field(v).finish(),
            Self::Float(v) => f.debug_tuple("Float").field(v).finish(),
            Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Self::Bool(v) => f.debug_tuple("Bool").field(v).finish(),
            Self::BigInteger(v) => f.debug_tuple("BigInteger").field(v).finish(),
            Self::BigDecimal(v) => f.debug_tuple("BigDecimal").field(v).finish(),
            Self::Bytes(v) => f.debug_tuple("Bytes").field(v).finish(),
            Self::String(v) => f.debug_tuple("String").field(v).finish(),
            Self::Instant(v) => f.debug_tuple("Instant").field(v).finish(),
            Self::LocalDateTime(v) => f.debug_tuple("LocalDateTime").field(v).finish(),
            Self::LocalDate(v) => f.debug_tuple("LocalDate").field(v).finish(),
            Self::LocalTime(v) => f.debug_tuple("LocalTime").field(v).finish(),
            Self::Json(v) => f.debug_tuple("Json").field(v).finish(),
            Self::Set(v) => f.debug_tuple("Set").field(v).finish(),
            Self::Object(_) => f.write_str("Object(..)"),
        }
    }
}

// Materialized user values compare by identity.
impl PartialEq for BoundValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Short(a), Self::Short(b)) => a == b,
            (Self::Byte(a), Self::Byte(b)) => a == b,
            (Self::Char(a), Self::Char(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Double(a), Self::Double(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::BigInteger(a), Self::BigInteger(b)) => a == b,
            (Self::BigDecimal(a), Self::BigDecimal(b)) => a == b,
            (Self::Bytes(a), Self::Bytes(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Instant(a), Self::Instant(b)) => a == b,
            (Self::LocalDateTime(a), Self::LocalDateTime(b)) => a == b,
            (Self::LocalDate(a), Self::LocalDate(b)) => a == b,
            (Self::LocalTime(a), Self::LocalTime(b)) => a == b,
            (Self::Json(a), Self::Json(b)) => a == b,
            (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Types that can be read back out of a [`BoundValue`].
pub trait FromBound: Sized {
    /// Returns the value if `bound` holds this type.
    fn from_bound(bound: &BoundValue) -> Option<Self>;
}

macro_rules! impl_from_bound {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl FromBound for $ty {
                fn from_bound(bound: &BoundValue) -> Option<Self> {
                    match bound {
                        BoundValue::$variant(v) => Some(v.clone()),
                        _ => None,
                    }
                }
            }
        )*
    };
}

impl_from_bound!(
    i32 => Int,
    i64 => Long,
    i16 => Short,
    i8 => Byte,
    char => Char,
    f32 => Float,
    f64 => Double,
    bool => Bool,
    BigInt => BigInteger,
    BigDecimal => BigDecimal,
    Vec<u8> => Bytes,
    String => String,
    DateTime<Utc> => Instant,
    NaiveDateTime => LocalDateTime,
    NaiveDate => LocalDate,
    NaiveTime => LocalTime,
);

impl FromBound for Value {
    fn from_bound(bound: &BoundValue) -> Option<Self> {
        match bound {
            BoundValue::Json(v) => Some(v.clone()),
            BoundValue::Set(items) => Some(Value::Array(items.clone())),
            _ => None,
        }
    }
}

impl<T: FromBound> FromBound for Option<T> {
    fn from_bound(bound: &BoundValue) -> Option<Self> {
        match bound {
            BoundValue::Null => Some(None),
            other => T::from_bound(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_bound_scalars() {
        assert_eq!(i32::from_bound(&BoundValue::Int(7)), Some(7));
        assert_eq!(bool::from_bound(&BoundValue::Bool(true)), Some(true));
        assert_eq!(
            String::from_bound(&BoundValue::String("x".into())),
            Some("x".to_string())
        );
        assert_eq!(i32::from_bound(&BoundValue::Long(7)), None);
    }

    #[test]
    fn test_from_bound_option() {
        assert_eq!(Option::<i32>::from_bound(&BoundValue::Null), Some(None));
        assert_eq!(Option::<i32>::from_bound(&BoundValue::Int(3)), Some(Some(3)));
        assert_eq!(Option::<i32>::from_bound(&BoundValue::Bool(true)), None);
    }

    #[test]
    fn test_from_bound_json_and_set() {
        let set = BoundValue::Set(vec![json!(1), json!(2)]);
        assert_eq!(Value::from_bound(&set), Some(json!([1, 2])));
        assert_eq!(
            Value::from_bound(&BoundValue::Json(json!({"a": 1}))),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_object_downcast_and_identity() {
        let a = BoundValue::object(vec![1, 2, 3]);
        let b = a.clone();
        assert_eq!(a.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
        assert!(a.downcast_ref::<String>().is_none());
        assert_eq!(a, b);
        assert_ne!(a, BoundValue::object(vec![1, 2, 3]));
        assert_eq!(format!("{a:?}"), "Object(..)");
    }
}
