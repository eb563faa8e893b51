//! Call-time validation and best-effort coercion of filter values

use crate::types::StoreType;
use serde_json::{Number, Value};

/// Tag describing the runtime type of a JSON value, as reported in TypeMismatch
pub fn value_tag(value: &Value) -> &'static str {
    match value {
        Value::Null => "NULL",
        Value::Bool(_) => "BOOLEAN",
        Value::Number(n) if n.is_u64() && !n.is_i64() => "INTEGER_OUT_OF_RANGE",
        Value::Number(n) if n.is_i64() => "INTEGER",
        Value::Number(_) => "FLOAT",
        Value::String(_) => "STRING",
        Value::Array(_) => "LIST",
        Value::Object(_) => "MAP",
    }
}

/// Store-style equality: numbers compare by value regardless of representation
pub fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(a), Some(b)) => a == b,
            _ => a.as_f64() == b.as_f64(),
        },
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| values_equal(x, y))
        }
        _ => left == right,
    }
}

/// Whether `value` already has the runtime type of `tag`
pub fn matches_tag(value: &Value, tag: &StoreType) -> bool {
    match tag {
        StoreType::String => value.is_string(),
        StoreType::Integer => value.is_i64(),
        StoreType::Float => value.is_f64(),
        StoreType::Boolean => value.is_boolean(),
        _ => true,
    }
}

/// Convert `value` to `tag`, or `None` when no sensible conversion exists.
/// Lossy conversions (float to integer truncation) are accepted.
pub fn convert(value: &Value, tag: &StoreType) -> Option<Value> {
    match tag {
        StoreType::Integer => to_integer(value).map(Value::from),
        StoreType::Float => to_float(value).and_then(|f| Number::from_f64(f).map(Value::Number)),
        StoreType::String => Some(Value::String(to_text(value))),
        StoreType::Boolean => to_boolean(value).map(Value::Bool),
        _ => Some(value.clone()),
    }
}

/// Validate `value` against a union of tags.
///
/// Null values and unions containing an opaque tag pass through unchanged. A
/// value matching any tag is returned as is; otherwise each tag is tried in
/// order and the first successful conversion wins. `Err` carries the actual
/// runtime tag of the rejected value.
pub fn coerce_value(value: &Value, types: &[StoreType]) -> Result<Value, &'static str> {
    if value.is_null() || types.is_empty() || types.iter().any(|t| !t.is_scalar()) {
        return Ok(value.clone());
    }

    if types.iter().any(|t| matches_tag(value, t)) {
        return Ok(value.clone());
    }

    types
        .iter()
        .find_map(|t| convert(value, t))
        .ok_or_else(|| value_tag(value))
}

fn to_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && *f >= i64::MIN as f64 && *f < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        Value::Bool(b) => Some(i64::from(*b)),
        _ => None,
    }
}

fn to_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

fn to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn to_boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
