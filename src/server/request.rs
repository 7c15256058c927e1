use crate::media_type::MediaType;
use crate::request::{parse_cookies, parse_query_pairs, HeaderVec, RequestContext};
use http::Method;
use may_minihttp::Request;
use std::io::{self, Read};
use tracing::debug;

/// Parse a raw `may_minihttp` request into the transport-independent
/// [`RequestContext`] the dispatcher works with.
///
/// Header names are lowercased, the target is split into path and decoded
/// query pairs, `Cookie` headers are split into pairs, and the body is
/// read to completion (the core has no streaming semantics).
///
/// # Errors
///
/// Returns an error for an unrecognized HTTP method or a body that cannot
/// be read from the connection.
pub fn parse_request(req: Request) -> io::Result<RequestContext> {
    let method: Method = req.method().parse().map_err(|_| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unrecognized HTTP method '{}'", req.method()),
        )
    })?;

    let target = req.path().to_string();
    let (path, query) = match target.split_once('?') {
        Some((path, query)) => (path.to_string(), parse_query_pairs(query)),
        None => (target, Vec::new()),
    };

    let mut headers = HeaderVec::new();
    for h in req.headers().iter() {
        headers.push((
            h.name.to_ascii_lowercase(),
            String::from_utf8_lossy(h.value).to_string(),
        ));
    }

    let content_type = headers
        .iter()
        .find(|(name, _)| name == "content-type")
        .and_then(|(_, value)| MediaType::parse(value));
    let cookies = headers
        .iter()
        .filter(|(name, _)| name == "cookie")
        .flat_map(|(_, value)| parse_cookies(value))
        .collect();

    let mut body = Vec::new();
    req.body().read_to_end(&mut body)?;

    debug!(
        method = %method,
        path = %path,
        header_count = headers.len(),
        body_bytes = body.len(),
        "Request parsed"
    );

    Ok(RequestContext {
        method,
        path,
        query,
        headers,
        cookies,
        content_type,
        body,
    })
}
