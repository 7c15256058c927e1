//! # waymark
//!
//! **waymark** is a request-routing and parameter-binding engine for HTTP
//! services on the `may` coroutine runtime. Endpoints are declared as
//! descriptors: a URI template, an accepted-method set, and a typed
//! parameter list. Per request, waymark selects the best-matching
//! handler, binds its arguments from the request's many sources, invokes
//! it, and serializes the result.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//!
//! - **[`pattern`]** - URI template compilation and path matching
//!   (`{name}`, `{name:regex}`, `*`, `**`, `?`)
//! - **[`resource`]** - endpoint descriptors and parameter binding
//!   metadata, built once at startup
//! - **[`registry`]** - the write-once route table with duplicate
//!   detection
//! - **[`resolver`]** - multi-source argument resolution (path, query,
//!   header, cookie, form, body, aggregate) with defaults and type
//!   conversion
//! - **[`dispatcher`]** - per-request control flow: cached longest-match
//!   route selection and the single error boundary
//! - **[`static_files`]** - static file fallback with conditional GET
//! - **[`server`]** - HTTP transport adapter built on `may_minihttp`
//!
//! ## Route selection
//!
//! Among every registered pattern that matches a request path and accepts
//! its method, the pattern with the most literal characters wins, so
//! `/api/user/list` outranks `/api/user/{id}`. Ties fall to lexicographic
//! template order; insertion order never decides. Selections are memoized
//! in a concurrent cache keyed by `(method, path)`.
//!
//! ## Example
//!
//! ```
//! use http::Method;
//! use serde_json::json;
//! use waymark::resource::{HandlerDesc, ParamMeta, ResourceDesc, TargetType};
//! use waymark::{Dispatcher, RequestContext, RouteRegistry};
//!
//! let users = ResourceDesc::new("user", "/user").handler(
//!     HandlerDesc::new("get_user", "/{id}", [Method::GET], |_ctx, args| {
//!         Ok(json!({ "id": args[0] }))
//!     })
//!     .param(ParamMeta::path("id", TargetType::Integer)),
//! );
//!
//! let registry = RouteRegistry::build("/api", vec![users])?;
//! let dispatcher = Dispatcher::new(registry);
//!
//! let response = dispatcher.dispatch(RequestContext::new(Method::GET, "/api/user/42"));
//! assert_eq!(response.status, 200);
//! # Ok::<(), waymark::registry::RegistryError>(())
//! ```

pub mod dispatcher;
pub mod ids;
pub mod media_type;
pub mod pattern;
pub mod registry;
pub mod request;
pub mod resolver;
pub mod resource;
pub mod response;
pub mod runtime_config;
pub mod scope;
pub mod server;
pub mod static_files;

pub use dispatcher::Dispatcher;
pub use registry::{RegistryError, RouteRegistry};
pub use request::RequestContext;
pub use resource::{HandlerDesc, ParamMeta, ResourceDesc, TargetType};
pub use response::HttpResponse;
