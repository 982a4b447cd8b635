//! JSON conversions for the host boundary.
//!
//! Evaluation contexts are usually assembled by an embedding engine that
//! holds JSON. Type mapping:
//! - JSON object ↔ FEEL context (insertion order preserved)
//! - JSON array ↔ FEEL list
//! - JSON number → FEEL number (integer when lossless)
//! - JSON string / boolean / null ↔ FEEL string / boolean / null
//! - FEEL temporal values → JSON strings in their canonical form

use crate::error::EvalError;
use crate::value::Value;
use indexmap::IndexMap;

/// Convert a JSON document into a FEEL value.
pub fn value_from_json(json: &serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(*b),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(i) => Value::int(i),
            None => Value::float(n.as_f64().unwrap_or(f64::NAN)),
        },
        serde_json::Value::String(s) => Value::Str(s.clone()),
        serde_json::Value::Array(items) => {
            Value::List(items.iter().map(value_from_json).collect())
        }
        serde_json::Value::Object(members) => {
            let mut context = IndexMap::new();
            for (key, value) in members {
                context.insert(key.clone(), value_from_json(value));
            }
            Value::Context(context)
        }
    }
}

/// Convert a FEEL value into JSON. Ranges and function handles have no JSON
/// form; temporal values render as their canonical strings.
pub fn value_to_json(value: &Value) -> Result<serde_json::Value, EvalError> {
    match value {
        Value::Null => Ok(serde_json::Value::Null),
        Value::Bool(b) => Ok(serde_json::Value::Bool(*b)),
        Value::Number(crate::value::Number::Int(i)) => Ok(serde_json::Value::from(*i)),
        Value::Number(crate::value::Number::Float(f)) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| {
                EvalError::evaluation(format!("cannot convert number {} to JSON", f))
            }),
        Value::Str(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
            Ok(serde_json::Value::String(value.to_string()))
        }
        Value::List(items) => {
            let converted: Result<Vec<_>, _> = items.iter().map(value_to_json).collect();
            Ok(serde_json::Value::Array(converted?))
        }
        Value::Context(members) => {
            let mut object = serde_json::Map::new();
            for (key, member) in members {
                object.insert(key.clone(), value_to_json(member)?);
            }
            Ok(serde_json::Value::Object(object))
        }
        other => Err(EvalError::evaluation(format!(
            "cannot convert {} to JSON",
            other.type_name()
        ))),
    }
}

/// Build an evaluation context from a JSON object.
pub fn context_from_json(
    json: &serde_json::Value,
) -> Result<IndexMap<String, Value>, EvalError> {
    match value_from_json(json) {
        Value::Context(members) => Ok(members),
        other => Err(EvalError::validation(format!(
            "context must be a JSON object, got {}",
            other.type_name()
        ))),
    }
}
