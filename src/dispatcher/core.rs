//! Dispatcher core - the per-request hot path.

use crate::ids::RequestId;
use crate::registry::{RouteEntry, RouteId, RouteRegistry};
use crate::request::RequestContext;
use crate::resolver;
use crate::response::HttpResponse;
use crate::scope::RequestScope;
use crate::static_files::StaticFallback;
use arc_swap::ArcSwap;
use dashmap::DashMap;
use http::Method;
use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, info, warn};

type RouteKey = (Method, String);

/// Registry snapshot plus its dependent cache.
///
/// The two live in one cell so teardown replaces both in a single swap;
/// in-flight requests keep whatever snapshot they already loaded. The
/// cache stores arena indices, never references, and a stale index is
/// answered by `RouteRegistry::get` returning `None`.
struct RouteState {
    registry: Arc<RouteRegistry>,
    cache: DashMap<RouteKey, Option<RouteId>>,
}

impl RouteState {
    fn new(registry: RouteRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            cache: DashMap::new(),
        }
    }
}

/// Request dispatcher: owns the routing state and the static fallback.
///
/// Shared across workers behind an `Arc`; all methods take `&self`.
pub struct Dispatcher {
    state: ArcSwap<RouteState>,
    fallback: Option<Arc<dyn StaticFallback>>,
}

impl Dispatcher {
    /// Wrap a built registry.
    #[must_use]
    pub fn new(registry: RouteRegistry) -> Self {
        Self {
            state: ArcSwap::from_pointee(RouteState::new(registry)),
            fallback: None,
        }
    }

    /// Attach the static-resource collaborator consulted for paths
    /// outside the prefix and for unmatched requests.
    #[must_use]
    pub fn with_fallback(mut self, fallback: impl StaticFallback + 'static) -> Self {
        self.fallback = Some(Arc::new(fallback));
        self
    }

    /// Handle one request end to end.
    ///
    /// Control flow: prefix gate → cached route lookup → parameter
    /// resolution → handler invocation → serialization. Any failure past
    /// the lookup is caught here and answered as a 500 whose body is the
    /// JSON-encoded error message; unmatched requests go to the static
    /// fallback and then to 404.
    #[must_use]
    pub fn dispatch(&self, ctx: RequestContext) -> HttpResponse {
        let request_id = RequestId::from_header_or_new(ctx.header(RequestId::HEADER));
        let state = self.state.load_full();
        let scope = RequestScope::new(ctx);
        self.respond(&state, &scope, &request_id)
            .with_header("X-Request-Id", &request_id.to_string())
    }

    fn respond(&self, state: &RouteState, scope: &RequestScope, request_id: &RequestId) -> HttpResponse {
        let prefix = state.registry.prefix();
        if !scope.ctx().path.starts_with(prefix) {
            debug!(
                request_id = %request_id,
                path = %scope.ctx().path,
                prefix = %prefix,
                "Path outside application prefix"
            );
            return self.serve_fallback(scope);
        }

        let route_id = self.lookup(state, scope.ctx(), request_id);
        let entry = match route_id.and_then(|id| state.registry.get(id)) {
            Some(entry) => Arc::clone(entry),
            None => return self.serve_fallback(scope),
        };

        match run_handler(scope, &entry) {
            Ok(value) => {
                debug!(
                    request_id = %request_id,
                    handler = %entry.handler_name,
                    "Handler completed"
                );
                HttpResponse::json(200, &value)
            }
            Err(message) => {
                warn!(
                    request_id = %request_id,
                    method = %scope.ctx().method,
                    path = %scope.ctx().path,
                    handler = %entry.handler_name,
                    error = %message,
                    "Request failed"
                );
                HttpResponse::error_json(500, &message)
            }
        }
    }

    /// Methods accepted for a path across all matching routes; the
    /// transport adapter answers `OPTIONS` with this.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        self.state.load().registry.allowed_methods(path)
    }

    /// Number of routes in the current registry snapshot.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.state.load().registry.len()
    }

    /// Number of memoized lookups, both matches and misses.
    #[must_use]
    pub fn cache_len(&self) -> usize {
        self.state.load().cache.len()
    }

    /// The cache entry for `(method, path)`: `None` when the key has
    /// never been looked up, `Some(None)` for a memoized miss.
    #[must_use]
    pub fn cached(&self, method: &Method, path: &str) -> Option<Option<RouteId>> {
        self.state
            .load()
            .cache
            .get(&(method.clone(), path.to_string()))
            .map(|entry| *entry.value())
    }

    /// Drop the registry and its cache in one swap.
    ///
    /// Requests already holding the old snapshot finish against it;
    /// every later dispatch sees an empty table and falls through to the
    /// static collaborator or 404.
    pub fn teardown(&self) {
        self.state.store(Arc::new(RouteState::new(RouteRegistry::empty())));
        info!("Routing state torn down");
    }

    fn lookup(
        &self,
        state: &RouteState,
        ctx: &RequestContext,
        request_id: &RequestId,
    ) -> Option<RouteId> {
        let key = (ctx.method.clone(), ctx.path.clone());
        if let Some(cached) = state.cache.get(&key) {
            let hit = *cached.value();
            drop(cached);
            debug!(
                request_id = %request_id,
                method = %ctx.method,
                path = %ctx.path,
                cache = "hit",
                matched = hit.is_some(),
                "Route lookup"
            );
            return hit;
        }

        let selected = select_route(&state.registry, &ctx.method, &ctx.path);
        debug!(
            request_id = %request_id,
            method = %ctx.method,
            path = %ctx.path,
            cache = "miss",
            matched = selected.is_some(),
            "Route lookup"
        );
        // first writer wins; a racing recompute produced the same value
        state.cache.entry(key).or_insert(selected);
        selected
    }

    fn serve_fallback(&self, scope: &RequestScope) -> HttpResponse {
        let ctx = scope.ctx();
        if let Some(fallback) = &self.fallback {
            if let Some(response) = fallback.serve(ctx) {
                return response;
            }
        }
        HttpResponse::not_found(ctx.method.as_str(), &ctx.path)
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.load();
        f.debug_struct("Dispatcher")
            .field("routes", &state.registry.len())
            .field("cached", &state.cache.len())
            .field("fallback", &self.fallback.is_some())
            .finish()
    }
}

/// Scan the registry for the best route: every pattern that matches the
/// path and accepts the method competes, the most literal characters win,
/// lexicographic template order breaks ties.
fn select_route(registry: &RouteRegistry, method: &Method, path: &str) -> Option<RouteId> {
    let mut best: Option<&Arc<RouteEntry>> = None;
    for entry in registry.routes() {
        if !entry.accepts(method) || !entry.pattern.matches(path) {
            continue;
        }
        best = match best {
            None => Some(entry),
            Some(current) if ranks_higher(entry, current) => Some(entry),
            keep => keep,
        };
    }
    best.map(|entry| entry.id)
}

fn ranks_higher(candidate: &RouteEntry, current: &RouteEntry) -> bool {
    let (a, b) = (
        candidate.pattern.literal_len(),
        current.pattern.literal_len(),
    );
    a > b || (a == b && candidate.pattern.template() < current.pattern.template())
}

/// Resolve arguments and invoke the adapter, converting resolution
/// errors, handler errors, and panics into one message for the 500
/// boundary.
fn run_handler(scope: &RequestScope, entry: &RouteEntry) -> Result<Value, String> {
    let args = resolver::resolve(scope, entry).map_err(|e| e.to_string())?;
    match catch_unwind(AssertUnwindSafe(|| (entry.handler)(scope.ctx(), args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => Err(error.to_string()),
        Err(panic) => Err(panic_message(panic)),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "handler panicked".to_string()
    }
}
