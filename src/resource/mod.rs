//! # Resource Module
//!
//! Registration input for the route registry: resource descriptors, handler
//! descriptors, and the per-parameter binding metadata the resolver works
//! from. Everything here is built once at startup and read-only afterward.
//!
//! ## Example
//!
//! ```rust,ignore
//! use waymark::resource::{HandlerDesc, ParamMeta, ResourceDesc, TargetType};
//! use http::Method;
//! use serde_json::json;
//!
//! let users = ResourceDesc::new("user", "/user")
//!     .consumes("application/json")
//!     .handler(
//!         HandlerDesc::new("get_user", "/{id}", [Method::GET], |_ctx, args| {
//!             Ok(json!({ "id": args[0] }))
//!         })
//!         .param(ParamMeta::path("id", TargetType::Integer)),
//!     );
//! ```

mod types;

pub use types::{
    ArgVec, BeanMeta, HandlerDesc, HandlerFn, ParamMeta, ParamSource, ResourceDesc, TargetType,
    MAX_INLINE_ARGS,
};
