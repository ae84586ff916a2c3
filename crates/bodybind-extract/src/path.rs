//! Path expressions over JSON documents.
//!
//! A path is a dotted sequence of segments:
//!
//! | Segment | Meaning |
//! |---|---|
//! | `name` | field `name` of the current object |
//! | `name[i]` | the i-th element of the array at `name` (`name[]` is index 0) |
//! | `name[sub]` | last segment, collection context only: field `sub` of every object in the array at `name` |
//!
//! Segments are trimmed and blank segments are skipped. Bracket contents that
//! parse as an integer are indexes, anything else is a projection key.
//!
//! Evaluation only borrows the document. Values that have the wrong shape
//! for the next step (a string where an object is needed, an object where an
//! array is needed) are treated as absent and logged at debug level.

use crate::ValueError;
use serde_json::{Map, Value};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Bracket { key: &'a str, inner: &'a str },
}

impl<'a> Segment<'a> {
    fn parse(raw: &'a str) -> Self {
        match raw.find('[') {
            Some(open) if raw.ends_with(']') => Self::Bracket {
                key: raw[..open].trim(),
                inner: raw[open + 1..raw.len() - 1].trim(),
            },
            _ => Self::Key(raw),
        }
    }

    fn key(&self) -> &'a str {
        match self {
            Self::Key(key) | Self::Bracket { key, .. } => key,
        }
    }
}

/// A parsed path expression.
///
/// # Example
///
/// ```
/// use bodybind_extract::JsonPath;
/// use serde_json::json;
///
/// let doc = json!({"order": {"items": [{"sku": "a"}, {"sku": "b"}]}});
///
/// let first = JsonPath::parse("order.items[0].sku").scalar(&doc).unwrap();
/// assert_eq!(first, Some(&json!("a")));
///
/// let skus = JsonPath::parse("order.items[sku]").collection(&doc).unwrap().unwrap();
/// assert_eq!(skus.as_ref(), &[json!("a"), json!("b")]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonPath<'a> {
    raw: &'a str,
    segments: Vec<Segment<'a>>,
}

impl<'a> JsonPath<'a> {
    /// Parses a path expression. Parsing never fails; malformed indexes are
    /// reported during evaluation.
    #[must_use]
    pub fn parse(raw: &'a str) -> Self {
        let segments = raw
            .split('.')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(Segment::parse)
            .collect();
        Self { raw, segments }
    }

    /// Returns the original expression.
    #[must_use]
    pub const fn as_str(&self) -> &'a str {
        self.raw
    }

    /// Returns `true` if the path has no segments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Evaluates the path for a single-valued target.
    ///
    /// `root` must be an object. Returns `None` when any step is missing,
    /// null or empty. An empty path yields the root itself.
    pub fn scalar<'v>(&self, root: &'v Value) -> Result<Option<&'v Value>, ValueError> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Ok(Some(root));
        };
        let Some(object) = self.require_object_root(root)? else {
            return Ok(None);
        };
        let Some(object) = self.walk(object, parents)? else {
            return Ok(None);
        };

        match *last {
            Segment::Key(key) => Ok(object.get(key)),
            Segment::Bracket { key, inner } => {
                let index = self.parse_index(inner)?;
                Ok(self.array_at(object, key).and_then(|items| items.get(index)))
            }
        }
    }

    /// Evaluates the path for a collection or array target.
    ///
    /// Returns `None` when the selected array is missing, null or empty, or
    /// when the selected value is not an array. With an empty path the root
    /// itself must be the array.
    pub fn collection<'v>(&self, root: &'v Value) -> Result<Option<Cow<'v, [Value]>>, ValueError> {
        let Some((last, parents)) = self.segments.split_last() else {
            return Ok(match root {
                Value::Array(items) => non_empty(Cow::Borrowed(items.as_slice())),
                other => {
                    tracing::debug!(found = json_kind(other), "collection binding without path needs an array body, treating as absent");
                    None
                }
            });
        };

        if let Segment::Bracket { inner, .. } = last {
            if inner.is_empty() {
                return Err(ValueError::invalid_path(self.raw, "sub key can not be empty"));
            }
        }

        let Some(object) = self.require_object_root(root)? else {
            return Ok(None);
        };
        let Some(object) = self.walk(object, parents)? else {
            return Ok(None);
        };

        let selected = match *last {
            Segment::Key(key) => self.array_at(object, key).map(Cow::Borrowed),
            Segment::Bracket { key, inner } => match inner.parse::<i64>() {
                Ok(_) => {
                    let index = self.parse_index(inner)?;
                    self.array_at(object, key)
                        .and_then(|items| items.get(index))
                        .and_then(|element| self.expect_array(element, key))
                        .map(Cow::Borrowed)
                }
                Err(_) => self
                    .array_at(object, key)
                    .map(|items| Cow::Owned(self.project(items, inner))),
            },
        };

        Ok(selected.and_then(non_empty))
    }

    fn require_object_root<'v>(
        &self,
        root: &'v Value,
    ) -> Result<Option<&'v Map<String, Value>>, ValueError> {
        match root {
            Value::Object(object) => Ok(Some(object)),
            Value::Null => Ok(None),
            other => Err(ValueError::invalid_path(
                self.raw,
                format!("a path needs a JSON object body, found {}", json_kind(other)),
            )),
        }
    }

    fn walk<'v>(
        &self,
        mut object: &'v Map<String, Value>,
        parents: &[Segment<'_>],
    ) -> Result<Option<&'v Map<String, Value>>, ValueError> {
        for segment in parents {
            if object.is_empty() {
                return Ok(None);
            }
            let next = match *segment {
                Segment::Key(key) => object.get(key),
                Segment::Bracket { key, inner } => {
                    let index = self.parse_index(inner)?;
                    self.array_at(object, key).and_then(|items| items.get(index))
                }
            };
            match next {
                Some(Value::Object(child)) => object = child,
                None | Some(Value::Null) => return Ok(None),
                Some(other) => {
                    tracing::debug!(
                        path = self.raw,
                        segment = segment.key(),
                        found = json_kind(other),
                        "intermediate path segment is not an object, treating as absent"
                    );
                    return Ok(None);
                }
            }
        }
        Ok((!object.is_empty()).then_some(object))
    }

    fn array_at<'v>(&self, object: &'v Map<String, Value>, key: &str) -> Option<&'v [Value]> {
        match object.get(key)? {
            Value::Null => None,
            value => self.expect_array(value, key),
        }
    }

    fn expect_array<'v>(&self, value: &'v Value, key: &str) -> Option<&'v [Value]> {
        match value {
            Value::Array(items) => Some(items.as_slice()),
            Value::Null => None,
            other => {
                tracing::debug!(
                    path = self.raw,
                    segment = key,
                    found = json_kind(other),
                    "expected an array, treating as absent"
                );
                None
            }
        }
    }

    fn project(&self, items: &[Value], sub_key: &str) -> Vec<Value> {
        let mut projected = Vec::with_capacity(items.len());
        let mut skipped = 0usize;
        for item in items {
            match item {
                Value::Object(object) => match object.get(sub_key) {
                    None | Some(Value::Null) => {}
                    Some(value) => projected.push(value.clone()),
                },
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            tracing::debug!(path = self.raw, skipped, "skipped non-object elements during projection");
        }
        projected
    }

    fn parse_index(&self, inner: &str) -> Result<usize, ValueError> {
        if inner.is_empty() {
            return Ok(0);
        }
        let index: i64 = inner.parse().map_err(|_| {
            ValueError::invalid_path(self.raw, format!("index {inner:?} is not an integer"))
        })?;
        usize::try_from(index)
            .map_err(|_| ValueError::invalid_path(self.raw, format!("index {index} is negative")))
    }
}

fn non_empty(items: Cow<'_, [Value]>) -> Option<Cow<'_, [Value]>> {
    (!items.is_empty()).then_some(items)
}

/// Returns a short name for the JSON kind of `value`, used in diagnostics.
pub(crate) const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
