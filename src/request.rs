//! Transport-independent view of one HTTP request.
//!
//! The server adapter builds a [`RequestContext`] from the wire; tests
//! build one directly with the `with_*` helpers. The dispatcher and the
//! parameter resolver only ever see this type, never the transport.

use crate::media_type::MediaType;
use http::Method;
use smallvec::SmallVec;

/// Maximum number of headers before heap allocation.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage; names are stored lowercased.
pub type HeaderVec = SmallVec<[(String, String); MAX_INLINE_HEADERS]>;

/// One incoming request: method, path, decoded query pairs, lowercased
/// headers, cookies, content type, and the raw body bytes.
///
/// Query pairs and cookies keep document order so "first value" semantics
/// stay deterministic. The path excludes the query string and is kept in
/// its on-wire (undecoded) form, matching how patterns are registered.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// HTTP method
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Decoded query pairs in document order
    pub query: Vec<(String, String)>,
    /// Headers with lowercased names, in arrival order
    pub headers: HeaderVec,
    /// Cookies in arrival order
    pub cookies: Vec<(String, String)>,
    /// Parsed `Content-Type`, if present and well-formed
    pub content_type: Option<MediaType>,
    /// Raw body bytes
    pub body: Vec<u8>,
}

impl RequestContext {
    /// Build a context from a method and a request target.
    ///
    /// The target may carry a query string (`/user/list?page=2`), which
    /// is split off and decoded into query pairs.
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, parse_query_pairs(query)),
            None => (target, Vec::new()),
        };
        Self {
            method,
            path: path.to_string(),
            query,
            headers: HeaderVec::new(),
            cookies: Vec::new(),
            content_type: None,
            body: Vec::new(),
        }
    }

    /// Add a header. The name is lowercased; `Content-Type` also updates
    /// [`RequestContext::content_type`] and `Cookie` is split into
    /// [`RequestContext::cookies`], mirroring what the server adapter does.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        let name = name.to_ascii_lowercase();
        if name == "content-type" {
            self.content_type = MediaType::parse(value);
        }
        if name == "cookie" {
            self.cookies.extend(parse_cookies(value));
        }
        self.headers.push((name, value.to_string()));
        self
    }

    /// Add a single cookie.
    #[must_use]
    pub fn with_cookie(mut self, name: &str, value: &str) -> Self {
        self.cookies.push((name.to_string(), value.to_string()));
        self
    }

    /// Set the raw body bytes.
    #[must_use]
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// First value of a header, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header in arrival order, case-insensitive.
    pub fn header_values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a str> {
        let name = name.to_ascii_lowercase();
        self.headers
            .iter()
            .filter(move |(k, _)| *k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Value of the first cookie with the given name.
    #[must_use]
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// First value of a query parameter, in document order.
    #[must_use]
    pub fn query_first(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// All values of a query parameter, in document order.
    pub fn query_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> {
        self.query
            .iter()
            .filter(move |(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// Decode an `application/x-www-form-urlencoded` string into ordered pairs.
///
/// Decoding is lenient: malformed escapes pass through as text, bare keys
/// get an empty value. Used for both query strings and form bodies.
#[must_use]
pub fn parse_query_pairs(query: &str) -> Vec<(String, String)> {
    url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Split a `Cookie` header value into ordered name/value pairs.
///
/// Lenient: a pair without `=` becomes a cookie with an empty value,
/// surrounding whitespace is trimmed, empty names are dropped.
#[must_use]
pub fn parse_cookies(value: &str) -> Vec<(String, String)> {
    value
        .split(';')
        .filter_map(|pair| {
            let mut parts = pair.trim().splitn(2, '=');
            let name = parts.next()?.trim();
            if name.is_empty() {
                return None;
            }
            let value = parts.next().unwrap_or("").trim();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}
