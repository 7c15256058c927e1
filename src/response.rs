//! Response model: what the dispatcher and the static fallback hand to
//! the transport adapter.
//!
//! Serialization happens here, at construction time, so a response is
//! always wire-ready bytes plus headers. Handler return values go
//! through [`HttpResponse::json`]; error bodies through
//! [`HttpResponse::error_json`], whose body is the JSON-encoded error
//! message string.

use serde_json::Value;

/// A wire-ready HTTP response: status, headers, body bytes.
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,
    /// Response headers in write order
    pub headers: Vec<(String, String)>,
    /// Body bytes
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Serialize a JSON value as the response body.
    ///
    /// A value that fails to serialize (not expressible for
    /// `serde_json::Value`, but the seam stays honest) degrades to a
    /// minimal well-formed 500 instead of a half-written connection.
    #[must_use]
    pub fn json(status: u16, value: &Value) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self {
                status,
                headers: vec![("Content-Type".to_string(), "application/json".to_string())],
                body,
            },
            Err(_) => Self::error_json(500, "response serialization failed"),
        }
    }

    /// An error response whose body is the JSON-encoded message string.
    #[must_use]
    pub fn error_json(status: u16, message: &str) -> Self {
        let body = serde_json::to_vec(&Value::String(message.to_string()))
            .unwrap_or_else(|_| b"\"error\"".to_vec());
        Self {
            status,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    /// The 404 answered when neither a route nor a static resource
    /// claims the request.
    #[must_use]
    pub fn not_found(method: &str, path: &str) -> Self {
        Self::json(
            404,
            &serde_json::json!({ "error": "Not Found", "method": method, "path": path }),
        )
    }

    /// A bodyless response carrying only a status.
    #[must_use]
    pub fn status_only(status: u16) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Append a header.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// First header value with the given name, case-insensitive.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Reason phrase for the status line.
pub fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        204 => "No Content",
        304 => "Not Modified",
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        412 => "Precondition Failed",
        415 => "Unsupported Media Type",
        500 => "Internal Server Error",
        _ => "OK",
    }
}
