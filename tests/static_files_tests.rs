//! Static fallback through the dispatcher: requests outside the
//! application prefix served from a fixture directory.

use http::Method;
use serde_json::json;
use std::fs;
use waymark::registry::RouteRegistry;
use waymark::resource::{HandlerDesc, ResourceDesc};
use waymark::static_files::StaticFiles;
use waymark::{Dispatcher, RequestContext};

fn dispatcher_with(static_dir: &std::path::Path) -> Dispatcher {
    let res = ResourceDesc::new("demo", "").handler(HandlerDesc::new(
        "ping",
        "/ping",
        [Method::GET],
        |_ctx, _args| Ok(json!({ "pong": true })),
    ));
    Dispatcher::new(RouteRegistry::build("/api", vec![res]).unwrap())
        .with_fallback(StaticFiles::new(static_dir).forbid("/internal/"))
}

fn fixture_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), "<h1>home</h1>").unwrap();
    fs::write(dir.path().join("site.css"), "body{}").unwrap();
    fs::create_dir(dir.path().join("internal")).unwrap();
    fs::write(dir.path().join("internal/keys.txt"), "secret").unwrap();
    dir
}

#[test]
fn test_file_outside_prefix_is_served() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());
    let res = dispatcher.dispatch(RequestContext::new(Method::GET, "/site.css"));
    assert_eq!(res.status, 200);
    assert_eq!(res.header("Content-Type"), Some("text/css"));
    assert_eq!(res.body, b"body{}");
}

#[test]
fn test_root_serves_welcome_file() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());
    let res = dispatcher.dispatch(RequestContext::new(Method::GET, "/"));
    assert_eq!(res.status, 200);
    assert_eq!(res.header("Content-Type"), Some("text/html"));
    assert_eq!(res.body, b"<h1>home</h1>");
}

#[test]
fn test_routes_still_win_inside_prefix() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());
    let res = dispatcher.dispatch(RequestContext::new(Method::GET, "/api/ping"));
    assert_eq!(res.status, 200);
    assert_eq!(res.header("Content-Type"), Some("application/json"));
}

#[test]
fn test_missing_file_is_404() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());
    let res = dispatcher.dispatch(RequestContext::new(Method::GET, "/missing.png"));
    assert_eq!(res.status, 404);
}

#[test]
fn test_traversal_is_404() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());
    let res = dispatcher.dispatch(RequestContext::new(Method::GET, "/../Cargo.toml"));
    assert_eq!(res.status, 404);
    let res = dispatcher.dispatch(RequestContext::new(Method::GET, "/%2e%2e/Cargo.toml"));
    assert_eq!(res.status, 404);
}

#[test]
fn test_forbidden_prefix_is_404() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());
    let res = dispatcher.dispatch(RequestContext::new(Method::GET, "/internal/keys.txt"));
    assert_eq!(res.status, 404);
}

#[test]
fn test_post_never_hits_static_files() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());
    let res = dispatcher.dispatch(RequestContext::new(Method::POST, "/site.css"));
    assert_eq!(res.status, 404);
}

#[test]
fn test_conditional_get_round_trip() {
    let dir = fixture_dir();
    let dispatcher = dispatcher_with(dir.path());

    let first = dispatcher.dispatch(RequestContext::new(Method::GET, "/site.css"));
    let etag = first.header("ETag").unwrap().to_string();
    let stamp = first.header("Last-Modified").unwrap().to_string();

    let res = dispatcher.dispatch(
        RequestContext::new(Method::GET, "/site.css").with_header("If-None-Match", &etag),
    );
    assert_eq!(res.status, 304);
    assert!(res.body.is_empty());

    let res = dispatcher.dispatch(
        RequestContext::new(Method::GET, "/site.css").with_header("If-Modified-Since", &stamp),
    );
    assert_eq!(res.status, 304);

    // a stale validator gets the full body again
    let res = dispatcher.dispatch(
        RequestContext::new(Method::GET, "/site.css").with_header("If-None-Match", "W/\"0-0\""),
    );
    assert_eq!(res.status, 200);
    assert_eq!(res.body, b"body{}");
}
