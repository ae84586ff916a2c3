//! Conversion of JSON leaves to declared parameter types.

use crate::{TemporalParser, ValueError};
use bigdecimal::BigDecimal;
use bodybind_core::{BoundValue, Primitive, TypeSpec};
use num_bigint::{BigInt, Sign};
use serde_json::{Number, Value};
use std::borrow::Cow;
use std::str::FromStr;

/// Returns `true` for values that bind as the target's default: a missing
/// value, JSON `null` or the empty string.
#[must_use]
pub fn is_absent(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

/// Returns the string form of a JSON value: strings as themselves, anything
/// else as compact JSON text.
#[must_use]
pub fn string_form(value: &Value) -> Cow<'_, str> {
    match value {
        Value::String(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Converts JSON values to scalar targets.
///
/// # Example
///
/// ```
/// use bodybind_core::{BoundValue, Primitive, TypeSpec};
/// use bodybind_extract::TypeConverter;
/// use serde_json::json;
///
/// let converter = TypeConverter::default();
///
/// let age = converter.convert(&json!("42"), &TypeSpec::Primitive(Primitive::Int)).unwrap();
/// assert_eq!(age, BoundValue::Int(42));
///
/// let flag = converter.convert(&json!("TRUE"), &TypeSpec::Boxed(Primitive::Boolean)).unwrap();
/// assert_eq!(flag, BoundValue::Bool(true));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeConverter {
    temporal: TemporalParser,
}

impl TypeConverter {
    /// Creates a converter using `temporal` for date and time targets.
    #[must_use]
    pub const fn new(temporal: TemporalParser) -> Self {
        Self { temporal }
    }

    /// Returns the temporal parser.
    #[must_use]
    pub const fn temporal(&self) -> &TemporalParser {
        &self.temporal
    }

    /// Converts a present value to `target`.
    ///
    /// Callers substitute [`TypeSpec::default_value`] for absent values
    /// before reaching the converter.
    pub fn convert(&self, value: &Value, target: &TypeSpec) -> Result<BoundValue, ValueError> {
        match target {
            TypeSpec::Primitive(p) | TypeSpec::Boxed(p) => self.primitive(*p, value, target),
            TypeSpec::String => Ok(BoundValue::String(string_form(value).into_owned())),
            TypeSpec::BigInteger => {
                let text = string_form(value);
                BigInt::from_str(&text)
                    .map(BoundValue::BigInteger)
                    .map_err(|e| unconvertible(&text, target, &e))
            }
            TypeSpec::BigDecimal => {
                let text = string_form(value);
                BigDecimal::from_str(&text)
                    .map(BoundValue::BigDecimal)
                    .map_err(|e| unconvertible(&text, target, &e))
            }
            TypeSpec::Bytes => Ok(BoundValue::Bytes(string_form(value).into_owned().into_bytes())),
            TypeSpec::Instant => self.temporal.instant(value).map(BoundValue::Instant),
            TypeSpec::LocalDateTime => self
                .temporal
                .local_date_time(value)
                .map(BoundValue::LocalDateTime),
            TypeSpec::LocalDate => self.temporal.local_date(value).map(BoundValue::LocalDate),
            TypeSpec::LocalTime => self.temporal.local_time(value).map(BoundValue::LocalTime),
            TypeSpec::Any | TypeSpec::Var(_) => Ok(BoundValue::Json(value.clone())),
            TypeSpec::Object(object) => Ok(BoundValue::Object((object.materialize)(value)?)),
            TypeSpec::Map(_) | TypeSpec::Collection(_) => Err(ValueError::conversion(format!(
                "{target} can not be parsed in json."
            ))),
        }
    }

    fn primitive(
        &self,
        primitive: Primitive,
        value: &Value,
        target: &TypeSpec,
    ) -> Result<BoundValue, ValueError> {
        if let Value::Number(number) = value {
            if let Some(bound) = from_number(primitive, number) {
                return Ok(bound);
            }
        }

        let text = string_form(value);
        match primitive {
            Primitive::Int => text
                .parse()
                .map(BoundValue::Int)
                .map_err(|e| unconvertible(&text, target, &e)),
            Primitive::Long => text
                .parse()
                .map(BoundValue::Long)
                .map_err(|e| unconvertible(&text, target, &e)),
            Primitive::Short => text
                .parse()
                .map(BoundValue::Short)
                .map_err(|e| unconvertible(&text, target, &e)),
            Primitive::Float => text
                .trim()
                .parse()
                .map(BoundValue::Float)
                .map_err(|e| unconvertible(&text, target, &e)),
            Primitive::Double => text
                .trim()
                .parse()
                .map(BoundValue::Double)
                .map_err(|e| unconvertible(&text, target, &e)),
            Primitive::Boolean => match value {
                Value::Bool(b) => Ok(BoundValue::Bool(*b)),
                _ => match text.to_lowercase().as_str() {
                    "1" | "true" => Ok(BoundValue::Bool(true)),
                    "0" | "false" => Ok(BoundValue::Bool(false)),
                    _ => Err(ValueError::conversion(format!(
                        "can not convert {text:?} to {target}"
                    ))),
                },
            },
            Primitive::Byte | Primitive::Char => Err(ValueError::conversion(format!(
                "unsupported conversion of {text:?} to {target}"
            ))),
        }
    }
}

enum NumberBits {
    Integer(i64),
    Float(f64),
}

fn number_bits(number: &Number) -> Option<NumberBits> {
    if let Some(i) = number.as_i64() {
        return Some(NumberBits::Integer(i));
    }
    if let Some(u) = number.as_u64() {
        return Some(NumberBits::Integer(u as i64));
    }
    let text = number.to_string();
    if !text.contains(['.', 'e', 'E']) {
        // Keep the low 64 bits of integers wider than u64.
        let big = BigInt::from_str(&text).ok()?;
        let (sign, digits) = big.to_u64_digits();
        let low = digits.first().copied().unwrap_or_default() as i64;
        return Some(NumberBits::Integer(if sign == Sign::Minus {
            low.wrapping_neg()
        } else {
            low
        }));
    }
    number.as_f64().map(NumberBits::Float)
}

fn from_number(primitive: Primitive, number: &Number) -> Option<BoundValue> {
    let bound = match primitive {
        Primitive::Int => match number_bits(number)? {
            NumberBits::Integer(i) => BoundValue::Int(i as i32),
            NumberBits::Float(f) => BoundValue::Int(f as i32),
        },
        Primitive::Long => match number_bits(number)? {
            NumberBits::Integer(i) => BoundValue::Long(i),
            NumberBits::Float(f) => BoundValue::Long(f as i64),
        },
        Primitive::Short => match number_bits(number)? {
            NumberBits::Integer(i) => BoundValue::Short(i as i16),
            NumberBits::Float(f) => BoundValue::Short((f as i32) as i16),
        },
        Primitive::Float => BoundValue::Float(number.as_f64()? as f32),
        Primitive::Double => BoundValue::Double(number.as_f64()?),
        Primitive::Boolean | Primitive::Byte | Primitive::Char => return None,
    };
    Some(bound)
}

fn unconvertible(text: &str, target: &TypeSpec, err: &dyn std::fmt::Display) -> ValueError {
    ValueError::conversion(format!("can not convert {text:?} to {target}: {err}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn convert(value: Value, target: TypeSpec) -> Result<BoundValue, ValueError> {
        TypeConverter::default().convert(&value, &target)
    }

    const INT: TypeSpec = TypeSpec::Primitive(Primitive::Int);

    #[test]
    fn test_is_absent() {
        assert!(is_absent(None));
        assert!(is_absent(Some(&Value::Null)));
        assert!(is_absent(Some(&json!(""))));
        assert!(!is_absent(Some(&json!(" "))));
        assert!(!is_absent(Some(&json!(0))));
        assert!(!is_absent(Some(&json!({}))));
    }

    #[test]
    fn test_integers_from_numbers_and_strings() {
        assert_eq!(convert(json!(7), INT).unwrap(), BoundValue::Int(7));
        assert!(convert(json!(" 12 "), INT).is_err());
        assert!(convert(json!("12\n"), TypeSpec::Boxed(Primitive::Long)).is_err());
        assert!(convert(json!(" 3"), TypeSpec::Primitive(Primitive::Short)).is_err());
        assert_eq!(convert(json!(3.99), INT).unwrap(), BoundValue::Int(3));
        assert_eq!(convert(json!(-3.99), INT).unwrap(), BoundValue::Int(-3));
        assert_eq!(
            convert(json!("9000000000"), TypeSpec::Boxed(Primitive::Long)).unwrap(),
            BoundValue::Long(9_000_000_000)
        );
        assert!(convert(json!("abc"), INT).is_err());
        assert!(convert(json!("1.5"), INT).is_err());
    }

    #[test]
    fn test_integer_narrowing_wraps() {
        assert_eq!(convert(json!(4_294_967_297_i64), INT).unwrap(), BoundValue::Int(1));
        assert_eq!(
            convert(json!(65_536 + 5), TypeSpec::Primitive(Primitive::Short)).unwrap(),
            BoundValue::Short(5)
        );
        let huge: Value = serde_json::from_str("18446744073709551621").unwrap();
        assert_eq!(
            convert(huge, TypeSpec::Primitive(Primitive::Long)).unwrap(),
            BoundValue::Long(5)
        );
    }

    #[test]
    fn test_floats() {
        assert_eq!(
            convert(json!(1.25), TypeSpec::Primitive(Primitive::Double)).unwrap(),
            BoundValue::Double(1.25)
        );
        assert_eq!(
            convert(json!("2.5"), TypeSpec::Boxed(Primitive::Float)).unwrap(),
            BoundValue::Float(2.5)
        );
        assert_eq!(
            convert(json!(3), TypeSpec::Primitive(Primitive::Float)).unwrap(),
            BoundValue::Float(3.0)
        );
        assert_eq!(
            convert(json!(" 0.5 "), TypeSpec::Primitive(Primitive::Double)).unwrap(),
            BoundValue::Double(0.5)
        );
    }

    #[test]
    fn test_boolean_coercion() {
        let target = TypeSpec::Primitive(Primitive::Boolean);
        assert_eq!(convert(json!(true), target.clone()).unwrap(), BoundValue::Bool(true));
        assert_eq!(convert(json!("TRUE"), target.clone()).unwrap(), BoundValue::Bool(true));
        assert_eq!(convert(json!("1"), target.clone()).unwrap(), BoundValue::Bool(true));
        assert_eq!(convert(json!(1), target.clone()).unwrap(), BoundValue::Bool(true));
        assert_eq!(convert(json!("False"), target.clone()).unwrap(), BoundValue::Bool(false));
        assert_eq!(convert(json!(0), target.clone()).unwrap(), BoundValue::Bool(false));
        assert!(convert(json!("yes"), target.clone()).is_err());
        assert!(convert(json!(" true "), target.clone()).is_err());
        assert!(convert(json!("\t0"), target.clone()).is_err());
        assert!(convert(json!(2), target).is_err());
    }

    #[test]
    fn test_big_numbers_keep_precision() {
        let big: Value = serde_json::from_str("123456789012345678901234567890").unwrap();
        let bound = convert(big, TypeSpec::BigInteger).unwrap();
        assert_eq!(
            bound,
            BoundValue::BigInteger(BigInt::from_str("123456789012345678901234567890").unwrap())
        );

        let dec: Value = serde_json::from_str("0.100000000000000000000001").unwrap();
        let bound = convert(dec, TypeSpec::BigDecimal).unwrap();
        assert_eq!(
            bound,
            BoundValue::BigDecimal(BigDecimal::from_str("0.100000000000000000000001").unwrap())
        );

        assert!(convert(json!("ten"), TypeSpec::BigInteger).is_err());
        assert!(convert(json!(" 42"), TypeSpec::BigInteger).is_err());
        assert!(convert(json!("1.5 "), TypeSpec::BigDecimal).is_err());
    }

    #[test]
    fn test_string_and_bytes_use_string_form() {
        assert_eq!(
            convert(json!("hi"), TypeSpec::String).unwrap(),
            BoundValue::String("hi".into())
        );
        assert_eq!(
            convert(json!(12), TypeSpec::String).unwrap(),
            BoundValue::String("12".into())
        );
        assert_eq!(
            convert(json!([1, 2]), TypeSpec::String).unwrap(),
            BoundValue::String("[1,2]".into())
        );
        assert_eq!(
            convert(json!("ab"), TypeSpec::Bytes).unwrap(),
            BoundValue::Bytes(b"ab".to_vec())
        );
    }

    #[test]
    fn test_passthrough_for_erased_types() {
        assert_eq!(
            convert(json!([1, "a"]), TypeSpec::Any).unwrap(),
            BoundValue::Json(json!([1, "a"]))
        );
        assert_eq!(
            convert(json!(5), TypeSpec::Var("T")).unwrap(),
            BoundValue::Json(json!(5))
        );
    }

    #[test]
    fn test_temporal_targets() {
        let bound = convert(json!("2024-01-02"), TypeSpec::LocalDate).unwrap();
        assert_eq!(
            bound,
            BoundValue::LocalDate(chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert!(matches!(
            convert(json!(0), TypeSpec::Instant).unwrap(),
            BoundValue::Instant(_)
        ));
    }

    #[test]
    fn test_unsupported_targets() {
        assert!(convert(json!(1), TypeSpec::Primitive(Primitive::Byte)).is_err());
        assert!(convert(json!("x"), TypeSpec::Boxed(Primitive::Char)).is_err());

        let err = convert(json!(1), TypeSpec::raw_map()).unwrap_err();
        assert_eq!(err.to_string(), "Map can not be parsed in json.");
        assert!(convert(json!("a"), TypeSpec::raw_list()).is_err());
    }

    #[derive(Debug, Deserialize, PartialEq)]
    #[serde(rename_all = "lowercase")]
    enum Level {
        Low,
        High,
    }

    #[test]
    fn test_user_types_from_leaves() {
        let bound = convert(json!("high"), TypeSpec::object::<Level>()).unwrap();
        assert_eq!(bound.downcast_ref::<Level>(), Some(&Level::High));

        let err = convert(json!("medium"), TypeSpec::object::<Level>()).unwrap_err();
        assert!(matches!(err, ValueError::Materialize(_)));
    }
}
