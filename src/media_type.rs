//! Media type parsing for body-binding decisions.
//!
//! The resolver only needs two questions answered about a request's
//! `Content-Type`: is the body JSON-compatible, and is it an HTML form.
//! Parameters (charset, boundary) are parsed past but not retained.

use std::fmt;

/// A parsed `type/subtype` pair, lowercased, parameters stripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaType {
    type_: String,
    subtype: String,
}

impl MediaType {
    /// Parse a `Content-Type` header value.
    ///
    /// Returns `None` for values without a `type/subtype` shape; a
    /// malformed header is treated the same as an absent one.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let essence = value.split(';').next()?.trim();
        let (type_, subtype) = essence.split_once('/')?;
        let type_ = type_.trim().to_ascii_lowercase();
        let subtype = subtype.trim().to_ascii_lowercase();
        if type_.is_empty() || subtype.is_empty() {
            return None;
        }
        Some(Self { type_, subtype })
    }

    /// `application/json` or any `application/*+json` suffix type.
    #[must_use]
    pub fn is_json_compatible(&self) -> bool {
        self.type_ == "application" && (self.subtype == "json" || self.subtype.ends_with("+json"))
    }

    /// `application/x-www-form-urlencoded`.
    #[must_use]
    pub fn is_form_urlencoded(&self) -> bool {
        self.type_ == "application" && self.subtype == "x-www-form-urlencoded"
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)
    }
}
