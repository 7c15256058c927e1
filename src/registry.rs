//! Route registry: the write-once table of registered endpoints.
//!
//! Built from resource descriptors at startup, immutable afterward.
//! Entries live in an append-only arena indexed by [`RouteId`]; the
//! dispatcher's cache stores these indices, never references, so tearing
//! the table down is one swap with no back-pointers to chase.

use crate::pattern::{encode_literals, PathPattern, PatternError};
use crate::resource::{HandlerFn, ParamMeta, ParamSource, ResourceDesc, TargetType};
use http::Method;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Index of a route in the registry arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RouteId(pub(crate) usize);

impl RouteId {
    /// Position in the arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One registered endpoint: compiled pattern, method set, bindings, and
/// the invocation adapter. Read-only once built.
pub struct RouteEntry {
    /// Arena index
    pub id: RouteId,
    /// Owning resource name
    pub resource: String,
    /// Handler name
    pub handler_name: String,
    /// Compiled full pattern (prefix + base path + relative path)
    pub pattern: PathPattern,
    /// Accepted methods; empty accepts every method
    pub methods: Vec<Method>,
    /// Parameter bindings in positional order
    pub params: Vec<ParamMeta>,
    /// Invocation adapter
    pub handler: HandlerFn,
}

impl RouteEntry {
    /// Whether this entry accepts the given method. An empty method set
    /// accepts everything.
    #[inline]
    #[must_use]
    pub fn accepts(&self, method: &Method) -> bool {
        self.methods.is_empty() || self.methods.contains(method)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("id", &self.id)
            .field("resource", &self.resource)
            .field("handler_name", &self.handler_name)
            .field("pattern", &self.pattern.template())
            .field("methods", &self.methods)
            .finish()
    }
}

/// Error raised while building the registry. All variants are fatal to
/// startup; the process should report them and exit.
#[derive(Debug)]
pub enum RegistryError {
    /// A pattern was registered twice with overlapping method sets.
    DuplicateRoute {
        /// The normalized full pattern
        pattern: String,
        /// Handler attempting to register
        handler: String,
        /// Handler already holding the pattern
        existing: String,
    },
    /// A URI template failed to compile.
    Pattern {
        /// Owning resource
        resource: String,
        /// Handler whose template failed
        handler: String,
        /// The compilation failure
        source: PatternError,
    },
    /// Parameter metadata that cannot be resolved at request time.
    InvalidBinding {
        /// Owning resource
        resource: String,
        /// Handler with the bad binding
        handler: String,
        /// What is wrong
        message: String,
    },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistryError::DuplicateRoute {
                pattern,
                handler,
                existing,
            } => write!(
                f,
                "duplicate route '{}': '{}' collides with already registered '{}'",
                pattern, handler, existing
            ),
            RegistryError::Pattern {
                resource,
                handler,
                source,
            } => write!(f, "invalid template for {}::{}: {}", resource, handler, source),
            RegistryError::InvalidBinding {
                resource,
                handler,
                message,
            } => write!(f, "invalid binding for {}::{}: {}", resource, handler, message),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Pattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// The immutable route table.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    prefix: String,
    entries: Vec<Arc<RouteEntry>>,
}

impl RouteRegistry {
    /// Build the registry from resource descriptors.
    ///
    /// For every handler the full pattern is assembled from the
    /// application prefix, the resource base path, and the handler's
    /// relative path; literal characters are percent-encoded once, then
    /// the template is compiled. Duplicate patterns with intersecting
    /// method sets (an empty set intersects everything) abort the build.
    ///
    /// # Errors
    ///
    /// Returns the first [`RegistryError`] encountered; the registry is
    /// all-or-nothing.
    pub fn build(prefix: &str, resources: Vec<ResourceDesc>) -> Result<Self, RegistryError> {
        let prefix = normalize_part(prefix);
        let mut entries: Vec<Arc<RouteEntry>> = Vec::new();

        for resource in resources {
            let base = normalize_part(&resource.base_path);
            for handler in resource.handlers {
                validate_params(&resource.name, &handler.name, &handler.params)?;

                let full = join_full_path(&prefix, &base, &handler.path);
                let encoded = encode_literals(&full);
                let pattern =
                    PathPattern::compile(&encoded).map_err(|source| RegistryError::Pattern {
                        resource: resource.name.clone(),
                        handler: handler.name.clone(),
                        source,
                    })?;

                if let Some(existing) = entries.iter().find(|e| {
                    e.pattern.template() == pattern.template()
                        && methods_intersect(&e.methods, &handler.methods)
                }) {
                    return Err(RegistryError::DuplicateRoute {
                        pattern: encoded,
                        handler: format!("{}::{}", resource.name, handler.name),
                        existing: format!("{}::{}", existing.resource, existing.handler_name),
                    });
                }

                info!(
                    resource = %resource.name,
                    handler = %handler.name,
                    pattern = %encoded,
                    methods = ?handler.methods,
                    "Route registered"
                );

                entries.push(Arc::new(RouteEntry {
                    id: RouteId(entries.len()),
                    resource: resource.name.clone(),
                    handler_name: handler.name,
                    pattern,
                    methods: handler.methods,
                    params: handler.params,
                    handler: handler.handler,
                }));
            }
        }

        info!(routes_count = entries.len(), prefix = %prefix, "Route table built");
        Ok(Self { prefix, entries })
    }

    /// An empty registry; what the dispatcher swaps in at teardown.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The normalized application path prefix (may be empty).
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Lazy, restartable iteration over all entries in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Arc<RouteEntry>> + '_ {
        self.entries.iter()
    }

    /// Look up an entry by arena index.
    #[inline]
    #[must_use]
    pub fn get(&self, id: RouteId) -> Option<&Arc<RouteEntry>> {
        self.entries.get(id.0)
    }

    /// Number of registered routes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no routes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Methods accepted for a concrete path, across every matching
    /// pattern. An entry with an empty method set contributes the common
    /// verbs. Used by the transport adapter to answer `OPTIONS`.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<Method> {
        const COMMON: [Method; 5] = [
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
        ];
        let mut allowed: Vec<Method> = Vec::new();
        for entry in &self.entries {
            if !entry.pattern.matches(path) {
                continue;
            }
            if entry.methods.is_empty() {
                for m in COMMON {
                    if !allowed.contains(&m) {
                        allowed.push(m);
                    }
                }
            } else {
                for m in &entry.methods {
                    if !allowed.contains(m) {
                        allowed.push(m.clone());
                    }
                }
            }
        }
        allowed.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        allowed
    }
}

/// Normalize one path part: ensure a single leading `/`, drop the
/// trailing `/`, collapse `""` and `"/"` to the empty string.
fn normalize_part(part: &str) -> String {
    let trimmed = part.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

/// Assemble the full pattern from prefix, base path, and relative path.
/// An entirely empty result becomes `/`.
fn join_full_path(prefix: &str, base: &str, relative: &str) -> String {
    let rel = normalize_part(relative);
    let mut full = String::with_capacity(prefix.len() + base.len() + rel.len() + 1);
    full.push_str(prefix);
    full.push_str(base);
    full.push_str(&rel);
    if full.is_empty() {
        full.push('/');
    }
    full
}

fn methods_intersect(a: &[Method], b: &[Method]) -> bool {
    if a.is_empty() || b.is_empty() {
        return true;
    }
    a.iter().any(|m| b.contains(m))
}

fn validate_params(
    resource: &str,
    handler: &str,
    params: &[ParamMeta],
) -> Result<(), RegistryError> {
    let invalid = |message: String| RegistryError::InvalidBinding {
        resource: resource.to_string(),
        handler: handler.to_string(),
        message,
    };

    for param in params {
        if let TargetType::Array(elem) = &param.target {
            if matches!(**elem, TargetType::Array(_)) {
                return Err(invalid(format!(
                    "parameter '{}' nests array targets",
                    param.name
                )));
            }
        }
        if let ParamSource::Bean(bean) = &param.source {
            for (field, field_param) in &bean.fields {
                match field_param.source {
                    ParamSource::Path
                    | ParamSource::Query
                    | ParamSource::Header
                    | ParamSource::Cookie
                    | ParamSource::Form => {}
                    ParamSource::Body => {
                        return Err(invalid(format!(
                            "aggregate '{}' field '{}' binds the request body",
                            bean.name, field
                        )));
                    }
                    ParamSource::Bean(_) => {
                        return Err(invalid(format!(
                            "aggregate '{}' field '{}' nests another aggregate",
                            bean.name, field
                        )));
                    }
                }
                if let TargetType::Array(elem) = &field_param.target {
                    if matches!(**elem, TargetType::Array(_)) {
                        return Err(invalid(format!(
                            "aggregate '{}' field '{}' nests array targets",
                            bean.name, field
                        )));
                    }
                }
            }
        }
    }
    Ok(())
}
