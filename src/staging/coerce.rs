//! Lenient field coercion for explicit schemas
//!
//! Each function maps a raw JSON value onto the declared column type,
//! yielding `None` when the value cannot represent that type. The
//! `deserialize_*` wrappers plug the same rules into serde via
//! `#[serde(deserialize_with = ...)]`.

use crate::types::JsonValue;
use serde::{Deserialize, Deserializer};

/// Text column: strings as-is, numbers and booleans as their JSON text
pub fn to_utf8(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        JsonValue::Bool(b) => Some(b.to_string()),
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// 32-bit integer column: integral JSON numbers within range
pub fn to_i32(value: &JsonValue) -> Option<i32> {
    to_i64(value).and_then(|v| i32::try_from(v).ok())
}

/// 64-bit integer column: integral JSON numbers within range
///
/// Floats without a fractional part (`1541121934796.0`) count as integral.
pub fn to_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(whole_f64_to_i64)),
        _ => None,
    }
}

fn whole_f64_to_i64(v: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, so the upper bound is exclusive
    (v.fract() == 0.0 && v >= i64::MIN as f64 && v < i64::MAX as f64).then(|| v as i64)
}

/// Double column: any JSON number
pub fn to_f64(value: &JsonValue) -> Option<f64> {
    value.as_f64()
}

pub fn deserialize_utf8<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(|v| to_utf8(&v))
}

pub fn deserialize_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(|v| to_i32(&v))
}

pub fn deserialize_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(|v| to_i64(&v))
}

pub fn deserialize_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    JsonValue::deserialize(deserializer).map(|v| to_f64(&v))
}
