use http::Method;
use serde_json::{json, Value};
use waymark::registry::RouteRegistry;
use waymark::resolver::{resolve, ResolveError};
use waymark::resource::{BeanMeta, HandlerDesc, ParamMeta, ResourceDesc, TargetType};
use waymark::scope::RequestScope;
use waymark::RequestContext;

/// Registry with a single catch-all handler carrying the given bindings,
/// registered at `/api/item/{id}` so path bindings have a variable.
fn registry_with(params: Vec<ParamMeta>) -> RouteRegistry {
    let mut handler =
        HandlerDesc::new("probe", "/item/{id}", vec![], |_ctx, _args| Ok(json!(null)));
    for p in params {
        handler = handler.param(p);
    }
    RouteRegistry::build("/api", vec![ResourceDesc::new("test", "").handler(handler)])
        .expect("registry should build")
}

fn resolve_with(params: Vec<ParamMeta>, ctx: RequestContext) -> Result<Vec<Value>, ResolveError> {
    let registry = registry_with(params);
    let entry = registry.routes().next().expect("one route");
    let scope = RequestScope::new(ctx);
    resolve(&scope, entry).map(|args| args.into_vec())
}

#[test]
fn test_query_first_value() {
    let args = resolve_with(
        vec![ParamMeta::query("page", TargetType::Integer)],
        RequestContext::new(Method::GET, "/api/item/1?page=2&page=9"),
    )
    .unwrap();
    assert_eq!(args, vec![json!(2)]);
}

#[test]
fn test_path_variable() {
    let args = resolve_with(
        vec![ParamMeta::path("id", TargetType::Integer)],
        RequestContext::new(Method::GET, "/api/item/42"),
    )
    .unwrap();
    assert_eq!(args, vec![json!(42)]);
}

#[test]
fn test_several_path_bindings_share_one_extraction() {
    // both parameters read the same memoized variable map
    let args = resolve_with(
        vec![
            ParamMeta::path("id", TargetType::Integer),
            ParamMeta::path("id", TargetType::String),
        ],
        RequestContext::new(Method::GET, "/api/item/7"),
    )
    .unwrap();
    assert_eq!(args, vec![json!(7), json!("7")]);
}

#[test]
fn test_header_case_insensitive() {
    let args = resolve_with(
        vec![ParamMeta::header("X-Trace", TargetType::String)],
        RequestContext::new(Method::GET, "/api/item/1").with_header("x-trace", "abc"),
    )
    .unwrap();
    assert_eq!(args, vec![json!("abc")]);
}

#[test]
fn test_cookie_first_match() {
    let args = resolve_with(
        vec![ParamMeta::cookie("session", TargetType::String)],
        RequestContext::new(Method::GET, "/api/item/1")
            .with_cookie("session", "s1")
            .with_cookie("session", "s2"),
    )
    .unwrap();
    assert_eq!(args, vec![json!("s1")]);
}

#[test]
fn test_form_field_from_urlencoded_body() {
    let args = resolve_with(
        vec![ParamMeta::form("name", TargetType::String)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_body("name=smith&age=44"),
    )
    .unwrap();
    assert_eq!(args, vec![json!("smith")]);
}

#[test]
fn test_form_ignored_for_other_content_types() {
    let args = resolve_with(
        vec![ParamMeta::form("name", TargetType::String)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "text/plain")
            .with_body("name=smith"),
    )
    .unwrap();
    assert_eq!(args, vec![Value::Null]);
}

#[test]
fn test_absent_value_resolves_to_null_without_conversion() {
    // a numeric target must not attempt conversion on an absent value
    let args = resolve_with(
        vec![ParamMeta::query("path", TargetType::Integer)],
        RequestContext::new(Method::GET, "/api/item/1"),
    )
    .unwrap();
    assert_eq!(args, vec![Value::Null]);
}

#[test]
fn test_absent_array_resolves_to_empty() {
    let args = resolve_with(
        vec![ParamMeta::query(
            "tag",
            TargetType::Array(Box::new(TargetType::String)),
        )],
        RequestContext::new(Method::GET, "/api/item/1"),
    )
    .unwrap();
    assert_eq!(args, vec![json!([])]);
}

#[test]
fn test_default_substituted_and_converted() {
    let args = resolve_with(
        vec![ParamMeta::query("page", TargetType::Integer).with_default("1")],
        RequestContext::new(Method::GET, "/api/item/1"),
    )
    .unwrap();
    assert_eq!(args, vec![json!(1)]);
}

#[test]
fn test_present_value_beats_default() {
    let args = resolve_with(
        vec![ParamMeta::query("page", TargetType::Integer).with_default("1")],
        RequestContext::new(Method::GET, "/api/item/1?page=5"),
    )
    .unwrap();
    assert_eq!(args, vec![json!(5)]);
}

#[test]
fn test_array_collects_every_value() {
    let args = resolve_with(
        vec![ParamMeta::query(
            "tag",
            TargetType::Array(Box::new(TargetType::Integer)),
        )],
        RequestContext::new(Method::GET, "/api/item/1?tag=1&tag=2&tag=3"),
    )
    .unwrap();
    assert_eq!(args, vec![json!([1, 2, 3])]);
}

#[test]
fn test_conversion_failure_is_an_error() {
    let err = resolve_with(
        vec![ParamMeta::query("page", TargetType::Integer)],
        RequestContext::new(Method::GET, "/api/item/1?page=banana"),
    )
    .unwrap_err();
    match err {
        ResolveError::Conversion { name, value, .. } => {
            assert_eq!(name, "page");
            assert_eq!(value, "banana");
        }
        other => panic!("expected Conversion, got {other:?}"),
    }
}

#[test]
fn test_body_decoded_for_json_content_type() {
    let args = resolve_with(
        vec![ParamMeta::body(TargetType::Json)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"name":"smith"}"#),
    )
    .unwrap();
    assert_eq!(args, vec![json!({"name": "smith"})]);
}

#[test]
fn test_body_accepts_json_suffix_types_and_absent_content_type() {
    let args = resolve_with(
        vec![ParamMeta::body(TargetType::Json)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "application/hal+json")
            .with_body(r#"[1,2]"#),
    )
    .unwrap();
    assert_eq!(args, vec![json!([1, 2])]);

    let args = resolve_with(
        vec![ParamMeta::body(TargetType::Json)],
        RequestContext::new(Method::POST, "/api/item/1").with_body("true"),
    )
    .unwrap();
    assert_eq!(args, vec![json!(true)]);
}

#[test]
fn test_unsupported_media_type_for_body_binding() {
    let err = resolve_with(
        vec![ParamMeta::body(TargetType::Json)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "text/xml")
            .with_body("<user/>"),
    )
    .unwrap_err();
    match err {
        ResolveError::UnsupportedMediaType { media_type } => {
            assert_eq!(media_type, "text/xml");
        }
        other => panic!("expected UnsupportedMediaType, got {other:?}"),
    }
}

#[test]
fn test_unreadable_body_is_an_error() {
    let err = resolve_with(
        vec![ParamMeta::body(TargetType::Json)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "application/json")
            .with_body("{broken"),
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::BodyRead { .. }));
}

#[test]
fn test_body_value_coerced_to_target_shape() {
    // a JSON string body converts into a numeric target like raw text
    let args = resolve_with(
        vec![ParamMeta::body(TargetType::Integer)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "application/json")
            .with_body("\"42\""),
    )
    .unwrap();
    assert_eq!(args, vec![json!(42)]);

    let err = resolve_with(
        vec![ParamMeta::body(TargetType::Integer)],
        RequestContext::new(Method::POST, "/api/item/1")
            .with_header("Content-Type", "application/json")
            .with_body(r#"{"nope":1}"#),
    )
    .unwrap_err();
    assert!(matches!(err, ResolveError::Conversion { .. }));
}

#[test]
fn test_bean_aggregates_fields_from_mixed_sources() {
    let bean = BeanMeta::new("Profile")
        .field("id", ParamMeta::path("id", TargetType::Integer))
        .field("name", ParamMeta::form("name", TargetType::String))
        .field("trace", ParamMeta::header("x-trace", TargetType::String))
        .field("session", ParamMeta::cookie("session", TargetType::String));
    let args = resolve_with(
        vec![ParamMeta::bean(bean)],
        RequestContext::new(Method::POST, "/api/item/9")
            .with_header("Content-Type", "application/x-www-form-urlencoded")
            .with_header("X-Trace", "t1")
            .with_cookie("session", "s1")
            .with_body("name=smith"),
    )
    .unwrap();
    assert_eq!(
        args,
        vec![json!({ "id": 9, "name": "smith", "trace": "t1", "session": "s1" })]
    );
}

#[test]
fn test_bean_omits_null_fields() {
    let bean = BeanMeta::new("Profile")
        .field("name", ParamMeta::query("name", TargetType::String))
        .field("age", ParamMeta::query("age", TargetType::Integer));
    let args = resolve_with(
        vec![ParamMeta::bean(bean)],
        RequestContext::new(Method::GET, "/api/item/1?name=smith"),
    )
    .unwrap();
    assert_eq!(args, vec![json!({ "name": "smith" })]);
}

#[test]
fn test_bean_field_defaults_apply() {
    let bean = BeanMeta::new("Paging")
        .field("page", ParamMeta::query("page", TargetType::Integer).with_default("1"));
    let args = resolve_with(
        vec![ParamMeta::bean(bean)],
        RequestContext::new(Method::GET, "/api/item/1"),
    )
    .unwrap();
    assert_eq!(args, vec![json!({ "page": 1 })]);
}

#[test]
fn test_arguments_positionally_aligned() {
    let args = resolve_with(
        vec![
            ParamMeta::path("id", TargetType::Integer),
            ParamMeta::query("verbose", TargetType::Boolean).with_default("false"),
            ParamMeta::header("x-trace", TargetType::String),
        ],
        RequestContext::new(Method::GET, "/api/item/3?verbose=true").with_header("X-Trace", "t9"),
    )
    .unwrap();
    assert_eq!(args, vec![json!(3), json!(true), json!("t9")]);
}
