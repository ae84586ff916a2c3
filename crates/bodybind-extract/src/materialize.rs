//! Materialization of JSON objects and arrays into declared types.

use crate::{TypeConverter, ValueError};
use bodybind_core::{BoundValue, CollectionKind, CollectionType, MapType, TypeSpec};
use serde_json::Value;

/// Materializes a JSON object for a non-collection target.
///
/// - an empty object binds as the target's default;
/// - the raw map and JSON-object targets receive the object itself;
/// - concrete map types get a fresh instance holding every entry;
/// - user types go through their serde materializer;
/// - anything else falls back to the converter.
pub fn materialize_object(
    converter: &TypeConverter,
    value: &Value,
    declared: &TypeSpec,
) -> Result<BoundValue, ValueError> {
    let Value::Object(object) = value else {
        return converter.convert(value, declared);
    };
    if object.is_empty() {
        return Ok(declared.default_value());
    }

    match declared {
        TypeSpec::Map(MapType::Raw | MapType::JsonObject) | TypeSpec::Any | TypeSpec::Var(_) => {
            Ok(BoundValue::Json(value.clone()))
        }
        TypeSpec::Map(MapType::Concrete { construct, .. }) => Ok(BoundValue::Object(construct(object))),
        TypeSpec::Object(target) => Ok(BoundValue::Object((target.materialize)(value)?)),
        _ => converter.convert(value, declared),
    }
}

/// Materializes a non-empty JSON array for a collection target.
///
/// The unparameterized set removes duplicates by JSON equality, keeping the
/// first occurrence. Other unparameterized kinds bind the array as is.
pub fn materialize_collection(
    items: &[Value],
    collection: &CollectionType,
) -> Result<BoundValue, ValueError> {
    match (collection.element, collection.kind) {
        (None, CollectionKind::Set) => {
            let mut distinct: Vec<Value> = Vec::with_capacity(items.len());
            for item in items {
                if !distinct.contains(item) {
                    distinct.push(item.clone());
                }
            }
            Ok(BoundValue::Set(distinct))
        }
        (None, CollectionKind::List | CollectionKind::Array) => {
            Ok(BoundValue::Json(Value::Array(items.to_vec())))
        }
        (Some(element), _) => Ok(BoundValue::Object((element.materialize)(&Value::Array(
            items.to_vec(),
        ))?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bodybind_core::Primitive;
    use serde::Deserialize;
    use serde_json::json;
    use std::collections::{BTreeMap, HashMap, HashSet};

    #[derive(Debug, Deserialize, PartialEq)]
    struct User {
        name: String,
        age: u32,
    }

    fn object(value: Value, declared: &TypeSpec) -> Result<BoundValue, ValueError> {
        materialize_object(&TypeConverter::default(), &value, declared)
    }

    fn collection(value: Value, declared: &TypeSpec) -> Result<BoundValue, ValueError> {
        let TypeSpec::Collection(target) = declared else {
            panic!("not a collection type");
        };
        materialize_collection(value.as_array().unwrap(), target)
    }

    #[test]
    fn test_empty_object_binds_default() {
        assert_eq!(
            object(json!({}), &TypeSpec::Primitive(Primitive::Long)).unwrap(),
            BoundValue::Long(0)
        );
        assert_eq!(object(json!({}), &TypeSpec::object::<User>()).unwrap(), BoundValue::Null);
        assert_eq!(object(json!({}), &TypeSpec::raw_map()).unwrap(), BoundValue::Null);
    }

    #[test]
    fn test_raw_maps_receive_the_object() {
        let doc = json!({"a": 1, "b": [true]});
        assert_eq!(object(doc.clone(), &TypeSpec::raw_map()).unwrap(), BoundValue::Json(doc.clone()));
        assert_eq!(
            object(doc.clone(), &TypeSpec::Map(MapType::JsonObject)).unwrap(),
            BoundValue::Json(doc.clone())
        );
        assert_eq!(object(doc.clone(), &TypeSpec::Any).unwrap(), BoundValue::Json(doc));
    }

    #[test]
    fn test_concrete_map_copies_entries() {
        let declared = TypeSpec::Map(MapType::concrete::<BTreeMap<String, Value>>());
        let bound = object(json!({"z": 1, "y": "two"}), &declared).unwrap();
        let map = bound.downcast_ref::<BTreeMap<String, Value>>().unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map["y"], json!("two"));
    }

    #[test]
    fn test_user_type_and_parameterized_map() {
        let bound = object(json!({"name": "Ada", "age": 36}), &TypeSpec::object::<User>()).unwrap();
        assert_eq!(
            bound.downcast_ref::<User>(),
            Some(&User { name: "Ada".into(), age: 36 })
        );

        let declared = TypeSpec::map_of::<HashMap<String, User>>();
        let bound = object(json!({"u1": {"name": "Bo", "age": 2}}), &declared).unwrap();
        let users = bound.downcast_ref::<HashMap<String, User>>().unwrap();
        assert_eq!(users["u1"].name, "Bo");

        let err = object(json!({"name": "Ada", "age": -1}), &TypeSpec::object::<User>()).unwrap_err();
        assert!(matches!(err, ValueError::Materialize(_)));
    }

    #[test]
    fn test_object_into_scalar_targets() {
        assert_eq!(
            object(json!({"a": 1}), &TypeSpec::String).unwrap(),
            BoundValue::String(r#"{"a":1}"#.into())
        );
        assert!(object(json!({"a": 1}), &TypeSpec::Primitive(Primitive::Int)).is_err());
    }

    #[test]
    fn test_raw_set_deduplicates_in_order() {
        let bound = collection(json!([3, 1, 3, "1", 1]), &TypeSpec::raw_set()).unwrap();
        assert_eq!(bound, BoundValue::Set(vec![json!(3), json!(1), json!("1")]));
    }

    #[test]
    fn test_raw_list_keeps_array() {
        let bound = collection(json!([1, 1, {"a": 2}]), &TypeSpec::raw_list()).unwrap();
        assert_eq!(bound, BoundValue::Json(json!([1, 1, {"a": 2}])));
    }

    #[test]
    fn test_typed_collections() {
        let bound = collection(json!([1, 2, 2]), &TypeSpec::list::<i64>()).unwrap();
        assert_eq!(bound.downcast_ref::<Vec<i64>>(), Some(&vec![1, 2, 2]));

        let bound = collection(json!(["a", "b", "a"]), &TypeSpec::set::<String>()).unwrap();
        let set = bound.downcast_ref::<HashSet<String>>().unwrap();
        assert_eq!(set.len(), 2);

        let bound = collection(
            json!([{"name": "A", "age": 1}, {"name": "B", "age": 2}]),
            &TypeSpec::array::<User>(),
        )
        .unwrap();
        assert_eq!(bound.downcast_ref::<Vec<User>>().unwrap()[1].name, "B");

        assert!(collection(json!(["x"]), &TypeSpec::list::<i32>()).is_err());
    }
}
