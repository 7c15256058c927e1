//! # Dispatcher Module
//!
//! Per-request control flow: gate on the application prefix, find the
//! best route through a concurrent cache, resolve parameters, invoke the
//! handler adapter, and translate every outcome into an [`HttpResponse`].
//!
//! ## Route selection
//!
//! A cache keyed by `(method, path)` memoizes both matches and misses.
//! On a miss, every registered pattern is scanned; among the patterns
//! that match and accept the method, the one with the most literal
//! characters wins, with lexicographic template order as the
//! deterministic tie-break. The registry is immutable after startup, so
//! cache entries never go stale during normal operation and are dropped
//! wholesale at teardown.
//!
//! ## Failure isolation
//!
//! Resolution errors, handler errors, and handler panics are all caught
//! at the request boundary, exactly once, then logged and answered as
//! HTTP 500 with a JSON-encoded message. Nothing propagates to the
//! transport.
//!
//! [`HttpResponse`]: crate::response::HttpResponse

mod core;

pub use core::Dispatcher;
