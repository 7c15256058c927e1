//! Raw-value to target-type conversion.
//!
//! Raw strings come from the named-value sources; body bindings arrive
//! as already-decoded JSON and are only coerced where the shape does not
//! fit. Failures are reported, never papered over with a string.

use super::core::ResolveError;
use crate::resource::{ParamMeta, TargetType};
use serde_json::Value;

/// Convert raw string values into the parameter's target.
///
/// An empty `raw` means the source yielded nothing: the declared default
/// is substituted when present, otherwise scalars resolve to `null` and
/// arrays to `[]` without any conversion attempt.
pub(super) fn convert(raw: Vec<String>, param: &ParamMeta) -> Result<Value, ResolveError> {
    match &param.target {
        TargetType::Array(elem) => {
            let raw = if raw.is_empty() {
                match &param.default_value {
                    Some(default) => vec![default.clone()],
                    None => return Ok(Value::Array(Vec::new())),
                }
            } else {
                raw
            };
            let mut items = Vec::with_capacity(raw.len());
            for value in &raw {
                items.push(convert_scalar(value, elem, &param.name)?);
            }
            Ok(Value::Array(items))
        }
        target => {
            let first = raw
                .into_iter()
                .next()
                .or_else(|| param.default_value.clone());
            match first {
                None => Ok(Value::Null),
                Some(value) => convert_scalar(&value, target, &param.name),
            }
        }
    }
}

fn convert_scalar(raw: &str, target: &TargetType, name: &str) -> Result<Value, ResolveError> {
    let fail = || ResolveError::Conversion {
        name: name.to_string(),
        target: target.to_string(),
        value: raw.to_string(),
    };
    match target {
        TargetType::String => Ok(Value::String(raw.to_string())),
        TargetType::Integer => raw.trim().parse::<i64>().map(Value::from).map_err(|_| fail()),
        TargetType::Number => {
            let parsed: f64 = raw.trim().parse().map_err(|_| fail())?;
            serde_json::Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(fail)
        }
        TargetType::Boolean => raw.trim().parse::<bool>().map(Value::from).map_err(|_| fail()),
        TargetType::Json => serde_json::from_str(raw).map_err(|_| fail()),
        // nested array targets are rejected at registration
        TargetType::Array(_) => Err(fail()),
    }
}

/// Coerce a decoded body value to the target type.
///
/// A value whose shape already fits passes through untouched; a JSON
/// string is converted like raw text; everything else is a conversion
/// error naming the body.
pub(super) fn coerce_body(value: Value, target: &TargetType) -> Result<Value, ResolveError> {
    fn fail(value: &Value, target: &TargetType) -> ResolveError {
        ResolveError::Conversion {
            name: "body".to_string(),
            target: target.to_string(),
            value: value.to_string(),
        }
    }

    match target {
        TargetType::Json => Ok(value),
        TargetType::String => match value {
            Value::String(_) | Value::Null => Ok(value),
            other => Err(fail(&other, target)),
        },
        TargetType::Integer => match value {
            Value::Number(ref n) if n.is_i64() || n.is_u64() => Ok(value),
            Value::String(s) => convert_scalar(&s, target, "body"),
            Value::Null => Ok(Value::Null),
            other => Err(fail(&other, target)),
        },
        TargetType::Number => match value {
            Value::Number(_) => Ok(value),
            Value::String(s) => convert_scalar(&s, target, "body"),
            Value::Null => Ok(Value::Null),
            other => Err(fail(&other, target)),
        },
        TargetType::Boolean => match value {
            Value::Bool(_) | Value::Null => Ok(value),
            Value::String(s) => convert_scalar(&s, target, "body"),
            other => Err(fail(&other, target)),
        },
        TargetType::Array(elem) => match value {
            Value::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(coerce_body(item, elem)?);
                }
                Ok(Value::Array(out))
            }
            Value::Null => Ok(Value::Array(Vec::new())),
            other => Err(fail(&other, target)),
        },
    }
}
