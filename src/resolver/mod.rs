//! # Resolver Module
//!
//! Multi-source parameter resolution: for a matched route, read each
//! declared parameter from its binding source (path, query, header,
//! cookie, form, body, or aggregate), substitute defaults, convert to the
//! target type, and produce the positionally-aligned argument vector the
//! handler adapter is invoked with.
//!
//! ## Resolution rules
//!
//! - Named-value sources take the first value in document order; array
//!   targets collect every value the source yielded.
//! - An absent value falls back to the declared default; with no default
//!   it resolves to the target's empty representation (`null`, or `[]`
//!   for arrays). Conversion is never attempted on an absent value.
//! - Body bindings require an absent or JSON-compatible content type;
//!   anything else is a resolution error naming the media type.
//! - Aggregate bindings produce a JSON object from their field bindings,
//!   omitting null fields.
//!
//! Errors surface as [`ResolveError`] and are converted to HTTP 500 at
//! the dispatch boundary.

mod convert;
mod core;

pub use core::{resolve, ResolveError};
