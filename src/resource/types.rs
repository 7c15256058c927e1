//! Descriptor types shared across the registry, resolver, and dispatcher.

use crate::request::RequestContext;
use http::Method;
use serde_json::Value;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

/// Maximum handler arity before the argument vector heap-allocates.
pub const MAX_INLINE_ARGS: usize = 4;

/// The resolved argument vector handed to a handler invocation:
/// converted values, positionally aligned with the declared parameters.
/// Transient, built and dropped per request.
pub type ArgVec = SmallVec<[Value; MAX_INLINE_ARGS]>;

/// Invocation adapter owned by each registered route.
///
/// Adapters receive the request context and the resolved arguments and
/// return the value to serialize, or an error the dispatcher turns into
/// a 500 response. Captured state shared across requests must be
/// synchronized by the adapter itself.
pub type HandlerFn = Arc<dyn Fn(&RequestContext, ArgVec) -> anyhow::Result<Value> + Send + Sync>;

/// Target type a raw parameter value is converted into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetType {
    /// Pass the raw text through as a JSON string
    String,
    /// Parse as `i64`
    Integer,
    /// Parse as `f64`
    Number,
    /// Parse as `true`/`false`
    Boolean,
    /// Arbitrary JSON value (bodies, JSON-in-string parameters)
    Json,
    /// Ordered collection of converted elements; sources that can yield
    /// several raw values (query, form, header) fill it, the rest
    /// produce at most one element
    Array(Box<TargetType>),
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetType::String => write!(f, "string"),
            TargetType::Integer => write!(f, "integer"),
            TargetType::Number => write!(f, "number"),
            TargetType::Boolean => write!(f, "boolean"),
            TargetType::Json => write!(f, "json"),
            TargetType::Array(elem) => write!(f, "array<{}>", elem),
        }
    }
}

/// Where a parameter's raw value is read from.
#[derive(Debug, Clone)]
pub enum ParamSource {
    /// URI-template variable of the matched pattern
    Path,
    /// Query string
    Query,
    /// Request header (case-insensitive)
    Header,
    /// First cookie with the matching name
    Cookie,
    /// Decoded `application/x-www-form-urlencoded` body field
    Form,
    /// The whole request body through the JSON value mapper
    Body,
    /// Aggregate object whose fields carry their own bindings
    Bean(Arc<BeanMeta>),
}

/// Binding metadata for one handler parameter or one aggregate field.
///
/// Built once through the constructors below; the resolver reads it on
/// every request but never mutates it.
#[derive(Debug, Clone)]
pub struct ParamMeta {
    /// Source key (query/form/header/cookie name or template variable);
    /// empty for body and aggregate bindings
    pub name: String,
    /// Where the raw value comes from
    pub source: ParamSource,
    /// Conversion target
    pub target: TargetType,
    /// Substituted when the source yields nothing
    pub default_value: Option<String>,
}

impl ParamMeta {
    fn new(name: &str, source: ParamSource, target: TargetType) -> Self {
        Self {
            name: name.to_string(),
            source,
            target,
            default_value: None,
        }
    }

    /// Bind to a URI-template variable.
    #[must_use]
    pub fn path(name: &str, target: TargetType) -> Self {
        Self::new(name, ParamSource::Path, target)
    }

    /// Bind to a query parameter.
    #[must_use]
    pub fn query(name: &str, target: TargetType) -> Self {
        Self::new(name, ParamSource::Query, target)
    }

    /// Bind to a request header.
    #[must_use]
    pub fn header(name: &str, target: TargetType) -> Self {
        Self::new(name, ParamSource::Header, target)
    }

    /// Bind to a cookie.
    #[must_use]
    pub fn cookie(name: &str, target: TargetType) -> Self {
        Self::new(name, ParamSource::Cookie, target)
    }

    /// Bind to a decoded form field.
    #[must_use]
    pub fn form(name: &str, target: TargetType) -> Self {
        Self::new(name, ParamSource::Form, target)
    }

    /// Bind the whole request body (JSON-compatible content types only).
    #[must_use]
    pub fn body(target: TargetType) -> Self {
        Self::new("", ParamSource::Body, target)
    }

    /// Bind an aggregate object.
    #[must_use]
    pub fn bean(bean: BeanMeta) -> Self {
        Self::new("", ParamSource::Bean(Arc::new(bean)), TargetType::Json)
    }

    /// Declare a default, substituted when the source yields nothing.
    #[must_use]
    pub fn with_default(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }
}

/// Aggregate ("bean") metadata: a named object whose fields are each
/// bound from a named-value source. One level only; aggregate fields may
/// not themselves be aggregates or bodies (rejected at registration).
#[derive(Debug, Clone)]
pub struct BeanMeta {
    /// Type name, used in diagnostics
    pub name: String,
    /// Field name → binding, in declaration order
    pub fields: Vec<(String, ParamMeta)>,
}

impl BeanMeta {
    /// Start an aggregate descriptor.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            fields: Vec::new(),
        }
    }

    /// Add a field. `field` is the key in the produced JSON object; the
    /// binding's own name addresses the request source.
    #[must_use]
    pub fn field(mut self, field: &str, param: ParamMeta) -> Self {
        self.fields.push((field.to_string(), param));
        self
    }
}

/// One routable endpoint: relative path, accepted methods, parameter
/// bindings, and the invocation adapter.
#[derive(Clone)]
pub struct HandlerDesc {
    /// Handler name, used in logs and diagnostics
    pub name: String,
    /// Path relative to the owning resource's base path
    pub path: String,
    /// Accepted methods; empty accepts every method
    pub methods: Vec<Method>,
    /// Parameter bindings in positional order
    pub params: Vec<ParamMeta>,
    /// Invocation adapter
    pub handler: HandlerFn,
}

impl HandlerDesc {
    /// Describe an endpoint. An empty `methods` iterator means the
    /// handler accepts every HTTP method.
    #[must_use]
    pub fn new<F>(
        name: &str,
        path: &str,
        methods: impl IntoIterator<Item = Method>,
        handler: F,
    ) -> Self
    where
        F: Fn(&RequestContext, ArgVec) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        Self {
            name: name.to_string(),
            path: path.to_string(),
            methods: methods.into_iter().collect(),
            params: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Append a parameter binding. Order defines the argument position.
    #[must_use]
    pub fn param(mut self, param: ParamMeta) -> Self {
        self.params.push(param);
        self
    }
}

impl fmt::Debug for HandlerDesc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDesc")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("methods", &self.methods)
            .field("params", &self.params.len())
            .finish()
    }
}

/// A group of handlers under one base path.
///
/// Accepted media types are carried for diagnostics only; the engine
/// does not negotiate content.
#[derive(Debug, Clone)]
pub struct ResourceDesc {
    /// Resource name, used in logs and diagnostics
    pub name: String,
    /// Path prefix shared by the resource's handlers
    pub base_path: String,
    /// Accepted media types (informational)
    pub consumes: Vec<String>,
    /// Handlers in registration order
    pub handlers: Vec<HandlerDesc>,
}

impl ResourceDesc {
    /// Start a resource descriptor.
    #[must_use]
    pub fn new(name: &str, base_path: &str) -> Self {
        Self {
            name: name.to_string(),
            base_path: base_path.to_string(),
            consumes: Vec::new(),
            handlers: Vec::new(),
        }
    }

    /// Record an accepted media type.
    #[must_use]
    pub fn consumes(mut self, media_type: &str) -> Self {
        self.consumes.push(media_type.to_string());
        self
    }

    /// Add a handler.
    #[must_use]
    pub fn handler(mut self, handler: HandlerDesc) -> Self {
        self.handlers.push(handler);
        self
    }
}
