//! Per-request scope: the context value the dispatcher threads through
//! parameter resolution and handler invocation.
//!
//! A [`RequestScope`] owns its [`RequestContext`] and memoizes the
//! request-derived state several bindings may need: template variables
//! extracted from the matched pattern, decoded form fields, and the
//! parsed JSON body. Each is computed at most once per request. The
//! scope lives on the dispatching worker's stack, so release on every
//! exit path is guaranteed by `Drop`; there is no ambient registry to
//! clear.

use crate::media_type::MediaType;
use crate::pattern::{PathPattern, PathVars};
use crate::request::{parse_query_pairs, RequestContext};
use once_cell::unsync::OnceCell;
use serde_json::Value;

/// Owned per-request state with lazily memoized derivations.
///
/// Not `Sync` by design: one request is handled by one worker.
#[derive(Debug)]
pub struct RequestScope {
    ctx: RequestContext,
    path_vars: OnceCell<PathVars>,
    form_fields: OnceCell<Vec<(String, String)>>,
    json_body: OnceCell<Result<Value, String>>,
}

impl RequestScope {
    /// Wrap a request context for the duration of one dispatch.
    #[must_use]
    pub fn new(ctx: RequestContext) -> Self {
        Self {
            ctx,
            path_vars: OnceCell::new(),
            form_fields: OnceCell::new(),
            json_body: OnceCell::new(),
        }
    }

    /// The wrapped request.
    #[inline]
    #[must_use]
    pub fn ctx(&self) -> &RequestContext {
        &self.ctx
    }

    /// Template variables of the matched pattern, extracted on first use.
    ///
    /// The pattern has already matched this request's path, so extraction
    /// cannot fail; a defensive empty set covers the impossible case.
    pub fn path_vars(&self, pattern: &PathPattern) -> &PathVars {
        self.path_vars
            .get_or_init(|| pattern.extract(&self.ctx.path).unwrap_or_default())
    }

    /// Decoded form fields, in document order.
    ///
    /// Only a body declared as `application/x-www-form-urlencoded` is
    /// decoded; any other content type yields no fields, so form-bound
    /// parameters simply resolve as absent.
    pub fn form_fields(&self) -> &[(String, String)] {
        self.form_fields.get_or_init(|| {
            let is_form = self
                .ctx
                .content_type
                .as_ref()
                .is_some_and(MediaType::is_form_urlencoded);
            if !is_form || self.ctx.body.is_empty() {
                return Vec::new();
            }
            parse_query_pairs(&String::from_utf8_lossy(&self.ctx.body))
        })
    }

    /// The body parsed as JSON, at most once per request.
    ///
    /// The parse error text is memoized too, so repeated body bindings
    /// report the same failure without re-parsing.
    pub fn json_body(&self) -> Result<&Value, String> {
        self.json_body
            .get_or_init(|| {
                serde_json::from_slice(&self.ctx.body).map_err(|e| e.to_string())
            })
            .as_ref()
            .map_err(Clone::clone)
    }
}
