//! Static file serving for requests no route claims.
//!
//! [`StaticFiles`] maps the request path onto a base directory and serves
//! the file with conditional-request support (`ETag` / `Last-Modified`).
//! Anything it cannot or will not serve is declined by returning `None`,
//! which lets the dispatcher fall through to its 404 response.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use http::Method;

use crate::request::RequestContext;
use crate::response::HttpResponse;

/// File served when the request path resolves to a directory.
const WELCOME_FILE: &str = "index.html";

/// Last-resort handler consulted after route selection fails.
///
/// Returning `None` declines the request and the dispatcher answers 404.
pub trait StaticFallback: Send + Sync {
    fn serve(&self, ctx: &RequestContext) -> Option<HttpResponse>;
}

/// Serves files from a base directory, GET and HEAD only.
pub struct StaticFiles {
    base_dir: PathBuf,
    forbidden: Vec<String>,
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into(), forbidden: Vec::new() }
    }

    /// Declines any request path starting with `prefix`, e.g. `/internal/`.
    pub fn forbid(mut self, prefix: impl Into<String>) -> Self {
        self.forbidden.push(prefix.into());
        self
    }

    /// Resolves a URL path to a file below `base_dir`. Parent and root
    /// components are rejected so the result can never escape the base.
    fn map_path(&self, url_path: &str) -> Option<PathBuf> {
        let mut pb = self.base_dir.clone();
        for comp in Path::new(url_path.trim_start_matches('/')).components() {
            match comp {
                Component::Normal(s) => pb.push(s),
                Component::CurDir => {}
                _ => return None,
            }
        }
        if pb.is_dir() {
            pb.push(WELCOME_FILE);
        }
        Some(pb)
    }

    fn content_type(path: &Path) -> &'static str {
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("").to_lowercase();
        match ext.as_str() {
            "html" | "htm" => "text/html",
            "css" => "text/css",
            "js" | "mjs" => "application/javascript",
            "json" => "application/json",
            "txt" => "text/plain",
            "xml" => "application/xml",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "woff2" => "font/woff2",
            "pdf" => "application/pdf",
            "wasm" => "application/wasm",
            _ => "application/octet-stream",
        }
    }
}

impl StaticFallback for StaticFiles {
    fn serve(&self, ctx: &RequestContext) -> Option<HttpResponse> {
        if ctx.method != Method::GET && ctx.method != Method::HEAD {
            return None;
        }
        let decoded = urlencoding::decode(&ctx.path).ok()?;
        if self.forbidden.iter().any(|p| decoded.starts_with(p.as_str())) {
            return None;
        }
        let path = self.map_path(&decoded)?;
        let meta = fs::metadata(&path).ok()?;
        if !meta.is_file() {
            return None;
        }
        let modified = meta.modified().ok();
        let etag = entity_tag(meta.len(), modified);

        if let Some(if_match) = ctx.header("if-match") {
            if !tag_listed(if_match, &etag) {
                return Some(HttpResponse::status_only(412));
            }
        } else if let Some(since) = ctx.header("if-unmodified-since") {
            if let (Some(header), Some(file)) = (parse_http_date(since), modified.map(unix_seconds)) {
                if file > header {
                    return Some(HttpResponse::status_only(412));
                }
            }
        }

        if let Some(if_none) = ctx.header("if-none-match") {
            if tag_listed(if_none, &etag) {
                return Some(not_modified(&etag, modified));
            }
        } else if let Some(since) = ctx.header("if-modified-since") {
            if let (Some(header), Some(file)) = (parse_http_date(since), modified.map(unix_seconds)) {
                // Header carries second precision only.
                if file <= header {
                    return Some(not_modified(&etag, modified));
                }
            }
        }

        let body = fs::read(&path).ok()?;
        let mut res = HttpResponse { status: 200, headers: Vec::new(), body }
            .with_header("Content-Type", Self::content_type(&path))
            .with_header("ETag", &etag)
            .with_header("Cache-Control", "no-cache,no-store,must-revalidate");
        if let Some(t) = modified {
            res = res.with_header("Last-Modified", &http_date(t));
        }
        Some(res)
    }
}

fn not_modified(etag: &str, modified: Option<SystemTime>) -> HttpResponse {
    let mut res = HttpResponse::status_only(304).with_header("ETag", etag);
    if let Some(t) = modified {
        res = res.with_header("Last-Modified", &http_date(t));
    }
    res
}

fn entity_tag(len: u64, modified: Option<SystemTime>) -> String {
    let mtime = modified.map(unix_seconds).unwrap_or(0);
    format!("W/\"{len}-{mtime}\"")
}

/// True when `header` (a comma separated tag list, possibly `*`) names `etag`.
fn tag_listed(header: &str, etag: &str) -> bool {
    header.split(',').map(str::trim).any(|t| t == etag || t == "*")
}

fn unix_seconds(t: SystemTime) -> i64 {
    match t.duration_since(SystemTime::UNIX_EPOCH) {
        Ok(d) => d.as_secs() as i64,
        Err(e) => -(e.duration().as_secs() as i64),
    }
}

fn http_date(t: SystemTime) -> String {
    DateTime::<Utc>::from(t).format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

fn parse_http_date(value: &str) -> Option<i64> {
    DateTime::parse_from_rfc2822(value).ok().map(|dt| dt.timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(method: Method, path: &str) -> RequestContext {
        RequestContext::new(method, path)
    }

    #[test]
    fn test_map_path_prevents_traversal() {
        let sf = StaticFiles::new("/srv/static");
        assert!(sf.map_path("../etc/passwd").is_none());
        assert!(sf.map_path("/a/../../b").is_none());
    }

    #[test]
    fn test_serves_plain_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "Hello\n").unwrap();
        let sf = StaticFiles::new(dir.path());
        let res = sf.serve(&ctx(Method::GET, "/hello.txt")).unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.header("Content-Type"), Some("text/plain"));
        assert_eq!(res.body, b"Hello\n");
    }

    #[test]
    fn test_welcome_file_for_directory_path() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<p>hi</p>").unwrap();
        let sf = StaticFiles::new(dir.path());
        let res = sf.serve(&ctx(Method::GET, "/")).unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.header("Content-Type"), Some("text/html"));
    }

    #[test]
    fn test_declines_other_methods_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("hello.txt"), "Hello\n").unwrap();
        let sf = StaticFiles::new(dir.path());
        assert!(sf.serve(&ctx(Method::POST, "/hello.txt")).is_none());
        assert!(sf.serve(&ctx(Method::GET, "/missing.txt")).is_none());
    }

    #[test]
    fn test_forbidden_prefix_declines() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("internal")).unwrap();
        fs::write(dir.path().join("internal/secret.txt"), "s").unwrap();
        let sf = StaticFiles::new(dir.path()).forbid("/internal/");
        assert!(sf.serve(&ctx(Method::GET, "/internal/secret.txt")).is_none());
    }

    #[test]
    fn test_percent_encoded_path_is_decoded() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("my file.txt"), "spaced").unwrap();
        let sf = StaticFiles::new(dir.path());
        let res = sf.serve(&ctx(Method::GET, "/my%20file.txt")).unwrap();
        assert_eq!(res.status, 200);
        assert_eq!(res.body, b"spaced");
    }

    #[test]
    fn test_if_none_match_returns_304() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();
        let sf = StaticFiles::new(dir.path());
        let first = sf.serve(&ctx(Method::GET, "/app.js")).unwrap();
        let etag = first.header("ETag").unwrap().to_string();
        let res = sf
            .serve(&ctx(Method::GET, "/app.js").with_header("if-none-match", &etag))
            .unwrap();
        assert_eq!(res.status, 304);
        assert!(res.body.is_empty());
        assert_eq!(res.header("ETag"), Some(etag.as_str()));
    }

    #[test]
    fn test_if_modified_since_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "console.log(1);").unwrap();
        let sf = StaticFiles::new(dir.path());
        let first = sf.serve(&ctx(Method::GET, "/app.js")).unwrap();
        let stamp = first.header("Last-Modified").unwrap().to_string();
        let res = sf
            .serve(&ctx(Method::GET, "/app.js").with_header("if-modified-since", &stamp))
            .unwrap();
        assert_eq!(res.status, 304);
    }

    #[test]
    fn test_content_type_table() {
        assert_eq!(StaticFiles::content_type(Path::new("a.css")), "text/css");
        assert_eq!(StaticFiles::content_type(Path::new("a.svg")), "image/svg+xml");
        assert_eq!(StaticFiles::content_type(Path::new("a.bin")), "application/octet-stream");
    }
}
