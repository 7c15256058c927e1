//! # Server Module
//!
//! Transport adapter for the `may_minihttp` coroutine server. Everything
//! HTTP-wire-specific lives here: parsing the raw request into a
//! [`RequestContext`], the generic method semantics (`OPTIONS`, `TRACE`,
//! `HEAD`), and writing the dispatcher's [`HttpResponse`] back out. The
//! routing core never sees the transport types.
//!
//! [`RequestContext`]: crate::request::RequestContext
//! [`HttpResponse`]: crate::response::HttpResponse

pub mod http_server;
pub mod request;
pub mod service;

pub use http_server::{HttpServer, ServerHandle};
pub use request::parse_request;
pub use service::AppService;
