//! End-to-end binding tests.
//!
//! Every test registers handler classes with an [`ActionRegistry`] that has
//! the JSON body binder installed, then dispatches raw bodies through
//! `ActionRegistry::handle`, exactly as a host framework would.

use bodybind_config::BinderConfig;
use bodybind_core::{
    ActionRegistry, BindError, BindJson, BoundValue, FailureKind, GenericSuperclass, HandlerClass,
    HandlerError, HandlerResult, Invocation, MethodDescriptor, ParamDescriptor, Primitive,
    TypeSpec,
};
use bodybind_extract::JsonBodyBinder;
use chrono::NaiveDate;
use proptest::prelude::*;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct User {
    name: String,
    age: i32,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
struct Item {
    x: i32,
}

/// Captured argument slots of the last invocation.
type Captured = Arc<Mutex<Option<Vec<BoundValue>>>>;

fn registry() -> ActionRegistry {
    ActionRegistry::new().with_builder(Arc::new(JsonBodyBinder::new()))
}

/// A method whose action records its arguments.
fn capturing(name: &str, params: Vec<ParamDescriptor>) -> (MethodDescriptor, Captured) {
    let captured: Captured = Arc::new(Mutex::new(None));
    let sink = captured.clone();
    let method = params
        .into_iter()
        .fold(MethodDescriptor::new(name), MethodDescriptor::param)
        .action(move |inv: &Invocation| -> HandlerResult {
            *sink.lock().unwrap() = Some(inv.args().to_vec());
            Ok(Value::Null)
        });
    (method, captured)
}

/// Registers one capturing method on a controller class and returns a
/// dispatcher for it.
fn single(params: Vec<ParamDescriptor>) -> (ActionRegistry, Captured) {
    let (method, captured) = capturing("handle", params);
    let mut registry = registry();
    registry
        .register(HandlerClass::new("TestController").extending_controller(), vec![method])
        .unwrap();
    (registry, captured)
}

fn dispatch(registry: &ActionRegistry, body: &str) -> HandlerResult {
    registry.handle("TestController.handle", body)
}

fn bind_one(declared: TypeSpec, binding: BindJson, body: &str) -> Result<BoundValue, HandlerError> {
    let (registry, captured) = single(vec![ParamDescriptor::new("p", declared).bind_json(binding)]);
    dispatch(&registry, body)?;
    let args = captured.lock().unwrap().take().expect("action ran");
    Ok(args[0].clone())
}

fn bad_request_kind(err: &HandlerError) -> Option<FailureKind> {
    match err {
        HandlerError::Bind(bind) => bind.failure_kind(),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Literal scenarios
// ---------------------------------------------------------------------------

#[test]
fn test_nested_object_to_user_type() {
    let bound = bind_one(
        TypeSpec::object::<User>(),
        BindJson::at("user"),
        r#"{"user":{"name":"Ada","age":37}}"#,
    )
    .unwrap();
    assert_eq!(
        bound.downcast_ref::<User>(),
        Some(&User { name: "Ada".into(), age: 37 })
    );
}

#[test]
fn test_array_to_typed_list() {
    let bound = bind_one(TypeSpec::list::<i32>(), BindJson::at("ids"), r#"{"ids":[1,2,3]}"#).unwrap();
    assert_eq!(bound.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
}

#[test]
fn test_deep_path_to_local_date_time() {
    let bound = bind_one(
        TypeSpec::LocalDateTime,
        BindJson::at("a.b.c"),
        r#"{"a":{"b":{"c":"2024-01-02T03:04:05"}}}"#,
    )
    .unwrap();
    let expected = NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(3, 4, 5)
        .unwrap();
    assert_eq!(bound, BoundValue::LocalDateTime(expected));
}

#[test]
fn test_blank_body_runs_handler_with_unset_slots() {
    let (registry, captured) = single(vec![
        ParamDescriptor::new("a", TypeSpec::Primitive(Primitive::Int)).bind_json(BindJson::at("a")),
        ParamDescriptor::new("b", TypeSpec::String).bind_json(BindJson::new()),
    ]);
    dispatch(&registry, "").unwrap();
    assert_eq!(
        captured.lock().unwrap().take(),
        Some(vec![BoundValue::Null, BoundValue::Null])
    );

    dispatch(&registry, "  \r\n ").unwrap();
    assert!(captured.lock().unwrap().is_some());
}

#[test]
fn test_malformed_body_rejected_before_handler() {
    let (registry, captured) = single(vec![
        ParamDescriptor::new("a", TypeSpec::Primitive(Primitive::Int)).bind_json(BindJson::at("a")),
    ]);
    let err = dispatch(&registry, "{").unwrap_err();
    assert_eq!(bad_request_kind(&err), Some(FailureKind::BadJson));
    assert_eq!(err.status_code(), http::StatusCode::BAD_REQUEST);
    assert!(captured.lock().unwrap().is_none());
}

#[test]
fn test_root_array_to_list_of_items() {
    let bound = bind_one(TypeSpec::list::<Item>(), BindJson::new(), r#"[{"x":1},{"x":2}]"#).unwrap();
    assert_eq!(
        bound.downcast_ref::<Vec<Item>>(),
        Some(&vec![Item { x: 1 }, Item { x: 2 }])
    );
}

// ---------------------------------------------------------------------------
// Path evaluation
// ---------------------------------------------------------------------------

#[test]
fn test_projection_skips_nulls() {
    let bound = bind_one(
        TypeSpec::list::<i32>(),
        BindJson::at("xs[a]"),
        r#"{"xs":[{"a":1},{"a":2},{"a":null},{"a":3}]}"#,
    )
    .unwrap();
    assert_eq!(bound.downcast_ref::<Vec<i32>>(), Some(&vec![1, 2, 3]));
}

#[test]
fn test_indexed_access() {
    let body = r#"{"xs":[10,20,30]}"#;
    let int = || TypeSpec::Boxed(Primitive::Int);
    assert_eq!(bind_one(int(), BindJson::at("xs[1]"), body).unwrap(), BoundValue::Int(20));
    assert_eq!(bind_one(int(), BindJson::at("xs[9]"), body).unwrap(), BoundValue::Null);
    assert_eq!(
        bind_one(TypeSpec::Primitive(Primitive::Int), BindJson::at("xs[9]"), body).unwrap(),
        BoundValue::Int(0)
    );
}

#[test]
fn test_blank_projection_key_is_invalid_path() {
    let err = bind_one(TypeSpec::raw_list(), BindJson::at("xs[ ]"), r#"{"xs":[{"a":1}]}"#).unwrap_err();
    assert_eq!(bad_request_kind(&err), Some(FailureKind::InvalidPath));
}

#[test]
fn test_non_array_in_collection_context_is_null() {
    let bound = bind_one(TypeSpec::list::<i32>(), BindJson::at("ids"), r#"{"ids":"1,2"}"#).unwrap();
    assert_eq!(bound, BoundValue::Null);

    let bound = bind_one(TypeSpec::list::<i32>(), BindJson::at("ids"), r#"{"ids":[]}"#).unwrap();
    assert_eq!(bound, BoundValue::Null);
}

#[test]
fn test_raw_set_deduplicates() {
    let bound = bind_one(TypeSpec::raw_set(), BindJson::at("tags"), r#"{"tags":["a","b","a",1,1]}"#).unwrap();
    assert_eq!(bound, BoundValue::Set(vec![json!("a"), json!("b"), json!(1)]));
}

#[test]
fn test_raw_map_receives_object() {
    let bound = bind_one(TypeSpec::raw_map(), BindJson::at("meta"), r#"{"meta":{"k":"v"}}"#).unwrap();
    assert_eq!(bound, BoundValue::Json(json!({"k": "v"})));

    let bound = bind_one(TypeSpec::raw_map(), BindJson::at("meta"), r#"{"meta":{}}"#).unwrap();
    assert_eq!(bound, BoundValue::Null);
}

// ---------------------------------------------------------------------------
// Conversion and defaults
// ---------------------------------------------------------------------------

#[test]
fn test_primitive_defaults() {
    let cases = [
        (Primitive::Int, BoundValue::Int(0)),
        (Primitive::Long, BoundValue::Long(0)),
        (Primitive::Short, BoundValue::Short(0)),
        (Primitive::Byte, BoundValue::Byte(0)),
        (Primitive::Char, BoundValue::Char('\0')),
        (Primitive::Float, BoundValue::Float(0.0)),
        (Primitive::Double, BoundValue::Double(0.0)),
        (Primitive::Boolean, BoundValue::Bool(false)),
    ];
    for body in [r#"{}"#, r#"{"v":null}"#, r#"{"v":""}"#, r#"{"w":1}"#] {
        for (primitive, expected) in &cases {
            let bound = bind_one(TypeSpec::Primitive(*primitive), BindJson::at("v"), body).unwrap();
            assert_eq!(&bound, expected, "{primitive:?} from {body}");

            let boxed = bind_one(TypeSpec::Boxed(*primitive), BindJson::at("v"), body).unwrap();
            assert_eq!(boxed, BoundValue::Null, "boxed {primitive:?} from {body}");
        }
    }
}

#[test]
fn test_skip_convert_error() {
    let long = || TypeSpec::Primitive(Primitive::Int);
    let body = r#"{"n":"abc"}"#;

    let bound = bind_one(long(), BindJson::at("n").skip_convert_error(), body).unwrap();
    assert_eq!(bound, BoundValue::Int(0));

    let err = bind_one(long(), BindJson::at("n"), body).unwrap_err();
    assert_eq!(bad_request_kind(&err), Some(FailureKind::Conversion));
    let HandlerError::Bind(BindError::BadRequest { message, parameter, .. }) = err else {
        panic!("expected a bad request");
    };
    assert_eq!(parameter.as_deref(), Some("p"));
    assert!(message.starts_with("Can not parse \"int\" in method TestController.handle(int p), Cause:"));
}

#[test]
fn test_skip_convert_error_on_invalid_path() {
    let bound = bind_one(
        TypeSpec::Boxed(Primitive::Int),
        BindJson::at("xs[first]").skip_convert_error(),
        r#"{"xs":[1]}"#,
    )
    .unwrap();
    assert_eq!(bound, BoundValue::Null);
}

#[test]
fn test_whole_body_as_string() {
    let bound = bind_one(TypeSpec::String, BindJson::new(), r#"{"a": [1, 2]}"#).unwrap();
    assert_eq!(bound, BoundValue::String(r#"{"a":[1,2]}"#.into()));
}

// ---------------------------------------------------------------------------
// Generic resolution
// ---------------------------------------------------------------------------

#[test]
fn test_type_variable_resolves_to_user() {
    let (method, captured) = capturing(
        "save",
        vec![ParamDescriptor::new("item", TypeSpec::Var("T")).bind_json(BindJson::at("item"))],
    );
    let class = HandlerClass::new("UserController")
        .extending_controller()
        .with_generic_superclass(
            GenericSuperclass::new("CrudController", ["T"]).with_args([TypeSpec::object::<User>()]),
        );

    let mut registry = registry();
    registry.register(class, vec![method]).unwrap();
    registry
        .handle("UserController.save", r#"{"item":{"name":"Lin","age":5}}"#)
        .unwrap();

    let args = captured.lock().unwrap().take().unwrap();
    assert_eq!(
        args[0].downcast_ref::<User>(),
        Some(&User { name: "Lin".into(), age: 5 })
    );
}

#[test]
fn test_unresolved_type_variable_binds_raw_json() {
    let bound = bind_one(TypeSpec::Var("T"), BindJson::at("v"), r#"{"v":{"deep":[1]}}"#).unwrap();
    assert_eq!(bound, BoundValue::Json(json!({"deep": [1]})));
}

// ---------------------------------------------------------------------------
// Registration
// ---------------------------------------------------------------------------

#[test]
fn test_container_binding_requires_controller_base() {
    let (method, _) = capturing(
        "bulk",
        vec![ParamDescriptor::new("ids", TypeSpec::list::<i64>()).bind_json(BindJson::at("ids"))],
    );
    let (ok, _) = capturing("ok", vec![]);

    let mut registry = registry();
    let err = registry
        .register(HandlerClass::new("PlainHandler"), vec![ok, method])
        .unwrap_err();

    assert!(matches!(err, BindError::Configuration { .. }));
    assert_eq!(err.method_signature(), Some("PlainHandler.bulk(List<i64> ids)"));
    assert!(registry.is_empty());
}

#[test]
fn test_methods_without_bindings_have_no_binder() {
    let (plain, _) = capturing("ping", vec![ParamDescriptor::new("x", TypeSpec::String)]);
    let (bound, _) = capturing(
        "save",
        vec![ParamDescriptor::new("x", TypeSpec::String).bind_json(BindJson::at("x"))],
    );
    let mut registry = registry();
    registry.register(HandlerClass::new("Api"), vec![plain, bound]).unwrap();

    assert!(registry.get("Api.ping").unwrap().chain().is_empty());
    assert!(registry
        .get("Api.save")
        .unwrap()
        .chain()
        .contains(JsonBodyBinder::NAME));

    // Bodies are ignored entirely for unbound methods.
    registry.handle("Api.ping", "{not json").unwrap();
}

#[test]
fn test_disabled_binder_leaves_slots_untouched() {
    let binder = JsonBodyBinder::from_config(&BinderConfig {
        enabled: false,
        ..Default::default()
    })
    .unwrap();
    let (method, captured) = capturing(
        "handle",
        vec![ParamDescriptor::new("a", TypeSpec::Primitive(Primitive::Int)).bind_json(BindJson::at("a"))],
    );
    let mut registry = ActionRegistry::new().with_builder(Arc::new(binder));
    registry.register(HandlerClass::new("TestController"), vec![method]).unwrap();

    dispatch(&registry, r#"{"a": 5}"#).unwrap();
    assert_eq!(captured.lock().unwrap().take(), Some(vec![BoundValue::Null]));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn test_binding_is_idempotent_and_pure() {
    let body = r#"{"user":{"name":"Ada","age":37},"ids":[3,1,3],"when":"2024-01-01"}"#;
    let (registry, captured) = single(vec![
        ParamDescriptor::new("user", TypeSpec::raw_map()).bind_json(BindJson::at("user")),
        ParamDescriptor::new("ids", TypeSpec::raw_set()).bind_json(BindJson::at("ids")),
        ParamDescriptor::new("when", TypeSpec::LocalDate).bind_json(BindJson::at("when")),
        ParamDescriptor::new("age", TypeSpec::Primitive(Primitive::Long)).bind_json(BindJson::at("user.age")),
    ]);

    let doc: Value = serde_json::from_str(body).unwrap();
    dispatch(&registry, body).unwrap();
    let first = captured.lock().unwrap().take().unwrap();
    dispatch(&registry, body).unwrap();
    let second = captured.lock().unwrap().take().unwrap();

    assert_eq!(first, second);
    assert_eq!(first[0], BoundValue::Json(doc["user"].clone()));
    assert_eq!(first[1], BoundValue::Set(vec![json!(3), json!(1)]));
    assert_eq!(first[3], BoundValue::Long(37));
}

proptest! {
    #[test]
    fn prop_integer_round_trip(n in any::<i64>()) {
        let body = format!(r#"{{"v": {n}}}"#);

        let long = bind_one(TypeSpec::Primitive(Primitive::Long), BindJson::at("v"), &body).unwrap();
        prop_assert_eq!(long, BoundValue::Long(n));

        let int = bind_one(TypeSpec::Boxed(Primitive::Int), BindJson::at("v"), &body).unwrap();
        prop_assert_eq!(int, BoundValue::Int(n as i32));

        let short = bind_one(TypeSpec::Primitive(Primitive::Short), BindJson::at("v"), &body).unwrap();
        prop_assert_eq!(short, BoundValue::Short(n as i16));
    }

    #[test]
    fn prop_integer_strings_round_trip(n in any::<i32>()) {
        let body = format!(r#"{{"v": "{n}"}}"#);
        let int = bind_one(TypeSpec::Primitive(Primitive::Int), BindJson::at("v"), &body).unwrap();
        prop_assert_eq!(int, BoundValue::Int(n));
    }

    #[test]
    fn prop_boolean_coercion(s in "[ \t]{0,2}[a-zA-Z0-9]{1,6}[ \t]{0,2}") {
        let body = json!({"v": s}).to_string();
        let expected = match s.to_lowercase().as_str() {
            "1" | "true" => Some(true),
            "0" | "false" => Some(false),
            _ => None,
        };

        let strict = bind_one(TypeSpec::Boxed(Primitive::Boolean), BindJson::at("v"), &body);
        match expected {
            Some(b) => {
                prop_assert_eq!(strict.unwrap(), BoundValue::Bool(b));
            }
            None => {
                prop_assert_eq!(bad_request_kind(&strict.unwrap_err()), Some(FailureKind::Conversion));
            }
        }

        let lenient = bind_one(
            TypeSpec::Primitive(Primitive::Boolean),
            BindJson::at("v").skip_convert_error(),
            &body,
        )
        .unwrap();
        prop_assert_eq!(lenient, BoundValue::Bool(expected.unwrap_or(false)));
    }

    #[test]
    fn prop_boolean_keywords_any_case(word in prop::sample::select(vec!["true", "false"]), mask in any::<u8>()) {
        let mixed: String = word
            .chars()
            .enumerate()
            .map(|(i, c)| if (mask >> (i % 8)) & 1 == 1 { c.to_ascii_uppercase() } else { c })
            .collect();
        let body = json!({"v": mixed}).to_string();
        let bound = bind_one(TypeSpec::Primitive(Primitive::Boolean), BindJson::at("v"), &body).unwrap();
        prop_assert_eq!(bound, BoundValue::Bool(word == "true"));
    }
}
