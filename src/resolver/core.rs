//! Resolution pipeline: source extraction, defaults, and the aggregate
//! walk. Type conversion lives in `convert`.

use super::convert;
use crate::registry::RouteEntry;
use crate::resource::{ArgVec, BeanMeta, ParamMeta, ParamSource};
use crate::scope::RequestScope;
use serde_json::{Map, Value};
use std::fmt;

/// Error raised while resolving a handler's arguments.
///
/// Every variant is recoverable: the dispatcher catches it at the
/// request boundary and answers 500. None of these abort the worker.
#[derive(Debug, Clone)]
pub enum ResolveError {
    /// A body binding met a content type the value mapper cannot decode.
    UnsupportedMediaType {
        /// The offending `type/subtype`
        media_type: String,
    },
    /// The body could not be parsed by the value mapper.
    BodyRead {
        /// Parser complaint
        message: String,
    },
    /// A raw value did not convert to the declared target type.
    Conversion {
        /// Parameter or field name ("body" for body bindings)
        name: String,
        /// Target type description
        target: String,
        /// The raw value that failed
        value: String,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolveError::UnsupportedMediaType { media_type } => {
                write!(f, "unsupported media type '{}' for body parameter", media_type)
            }
            ResolveError::BodyRead { message } => {
                write!(f, "could not read request body as JSON: {}", message)
            }
            ResolveError::Conversion {
                name,
                target,
                value,
            } => write!(
                f,
                "cannot convert '{}' to {} for parameter '{}'",
                value, target, name
            ),
        }
    }
}

impl std::error::Error for ResolveError {}

/// Build the argument vector for a matched route.
///
/// Parameters are resolved in positional order; the first failure wins.
///
/// # Errors
///
/// Returns a [`ResolveError`] on conversion failure, an unreadable body,
/// or an unsupported media type on a body binding.
pub fn resolve(scope: &RequestScope, entry: &RouteEntry) -> Result<ArgVec, ResolveError> {
    let mut args = ArgVec::new();
    for param in &entry.params {
        args.push(resolve_param(scope, entry, param)?);
    }
    Ok(args)
}

fn resolve_param(
    scope: &RequestScope,
    entry: &RouteEntry,
    param: &ParamMeta,
) -> Result<Value, ResolveError> {
    match &param.source {
        ParamSource::Bean(bean) => resolve_bean(scope, entry, bean),
        ParamSource::Body => resolve_body(scope, param),
        ParamSource::Path => {
            let raw = scope
                .path_vars(&entry.pattern)
                .iter()
                .find(|(name, _)| name.as_ref() == param.name)
                .map(|(_, value)| value.clone());
            convert::convert(raw.into_iter().collect(), param)
        }
        ParamSource::Query => {
            let raw = scope
                .ctx()
                .query_all(&param.name)
                .map(str::to_string)
                .collect();
            convert::convert(raw, param)
        }
        ParamSource::Header => {
            let raw = scope
                .ctx()
                .header_values(&param.name)
                .map(str::to_string)
                .collect();
            convert::convert(raw, param)
        }
        ParamSource::Cookie => {
            let raw = scope.ctx().cookie(&param.name).map(str::to_string);
            convert::convert(raw.into_iter().collect(), param)
        }
        ParamSource::Form => {
            let raw = scope
                .form_fields()
                .iter()
                .filter(|(name, _)| *name == param.name)
                .map(|(_, value)| value.clone())
                .collect();
            convert::convert(raw, param)
        }
    }
}

/// Decode the whole body through the value mapper.
///
/// An absent content type is treated as JSON-compatible; an explicit
/// non-JSON type is refused before the body is touched.
fn resolve_body(scope: &RequestScope, param: &ParamMeta) -> Result<Value, ResolveError> {
    if let Some(media_type) = &scope.ctx().content_type {
        if !media_type.is_json_compatible() {
            return Err(ResolveError::UnsupportedMediaType {
                media_type: media_type.to_string(),
            });
        }
    }
    let value = scope
        .json_body()
        .map_err(|message| ResolveError::BodyRead { message })?;
    convert::coerce_body(value.clone(), &param.target)
}

/// Resolve an aggregate: each field through its own binding, null fields
/// omitted from the produced object.
fn resolve_bean(
    scope: &RequestScope,
    entry: &RouteEntry,
    bean: &BeanMeta,
) -> Result<Value, ResolveError> {
    let mut object = Map::new();
    for (field, param) in &bean.fields {
        let value = resolve_param(scope, entry, param)?;
        if !value.is_null() {
            object.insert(field.clone(), value);
        }
    }
    Ok(Value::Object(object))
}
