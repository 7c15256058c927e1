use super::request::parse_request;
use crate::dispatcher::Dispatcher;
use crate::response::{status_reason, HttpResponse};
use http::Method;
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;

/// The `may_minihttp` service wrapping a [`Dispatcher`].
///
/// Applies the transport-level method semantics the routing algorithm
/// never sees: `OPTIONS` answers with an `Allow` header computed from the
/// registry, `TRACE` is refused, and `HEAD` is served as `GET` with the
/// body dropped. Everything else goes straight to the dispatcher.
#[derive(Clone)]
pub struct AppService {
    dispatcher: Arc<Dispatcher>,
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }

    fn allow_header(&self, path: &str) -> String {
        let mut allowed: Vec<String> = self
            .dispatcher
            .allowed_methods(path)
            .iter()
            .map(|m| m.as_str().to_string())
            .collect();
        for always in ["HEAD", "OPTIONS"] {
            if !allowed.iter().any(|m| m == always) {
                allowed.push(always.to_string());
            }
        }
        allowed.sort();
        allowed.join(", ")
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let mut ctx = match parse_request(req) {
            Ok(ctx) => ctx,
            Err(e) => {
                write_response(res, HttpResponse::error_json(400, &e.to_string()));
                return Ok(());
            }
        };

        match ctx.method {
            Method::OPTIONS => {
                let allow = self.allow_header(&ctx.path);
                write_response(res, HttpResponse::status_only(200).with_header("Allow", &allow));
            }
            Method::TRACE => {
                write_response(res, HttpResponse::status_only(405));
            }
            Method::HEAD => {
                // HEAD is GET without the body
                ctx.method = Method::GET;
                let mut response = self.dispatcher.dispatch(ctx);
                response.body.clear();
                write_response(res, response);
            }
            _ => {
                let response = self.dispatcher.dispatch(ctx);
                write_response(res, response);
            }
        }
        Ok(())
    }
}

/// Write a wire-ready [`HttpResponse`] to the transport response.
///
/// may_minihttp wants 'static header lines; the fixed lines every
/// response carries are interned, only genuinely dynamic values
/// (`ETag`, `Allow`, `X-Request-Id`, ...) leak a boxed line.
fn write_response(res: &mut Response, response: HttpResponse) {
    res.status_code(response.status as usize, status_reason(response.status));
    for (name, value) in &response.headers {
        match interned_header_line(name, value) {
            Some(line) => {
                res.header(line);
            }
            None => {
                let line = format!("{name}: {value}").into_boxed_str();
                res.header(Box::leak(line));
            }
        }
    }
    res.body_vec(response.body);
}

/// The fixed header lines the dispatcher and static fallback emit.
fn interned_header_line(name: &str, value: &str) -> Option<&'static str> {
    if name.eq_ignore_ascii_case("content-type") {
        return match value {
            "application/json" => Some("Content-Type: application/json"),
            "text/html" => Some("Content-Type: text/html"),
            "text/css" => Some("Content-Type: text/css"),
            "text/plain" => Some("Content-Type: text/plain"),
            "application/javascript" => Some("Content-Type: application/javascript"),
            "application/octet-stream" => Some("Content-Type: application/octet-stream"),
            _ => None,
        };
    }
    if name.eq_ignore_ascii_case("cache-control") && value == "no-cache,no-store,must-revalidate" {
        return Some("Cache-Control: no-cache,no-store,must-revalidate");
    }
    None
}
