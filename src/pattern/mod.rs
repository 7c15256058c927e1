//! # Pattern Module
//!
//! URI template compilation and path matching for waymark. Templates mix
//! literal text with named placeholders and glob wildcards:
//!
//! - `{name}` captures one or more characters excluding `/`
//! - `{name:regex}` captures whatever the custom regex accepts
//! - `*` matches any run of characters within a single segment
//! - `**` matches any run of characters across segments
//! - `?` matches exactly one character within a segment
//!
//! ## Architecture
//!
//! Compilation happens once, at registration time: a template is parsed
//! into an anchored regex together with its ordered variable names and a
//! literal-character count. Matching and extraction are pure reads against
//! the compiled form, so results can be cached freely.
//!
//! ## Example
//!
//! ```rust,ignore
//! use waymark::pattern::PathPattern;
//!
//! let pattern = PathPattern::compile("/user/{id}")?;
//! assert!(pattern.matches("/user/42"));
//! let vars = pattern.extract("/user/42").unwrap();
//! assert_eq!(vars[0].1, "42");
//! ```

mod core;

pub use core::{encode_literals, PathPattern, PathVars, PatternError, MAX_INLINE_VARS};
