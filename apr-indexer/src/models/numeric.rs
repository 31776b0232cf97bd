//! Lenient decoding for upstream scalars

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Parse a decimal string as `f64`; anything unparsable or non-finite is zero.
pub fn parse_decimal(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .unwrap_or(0.0)
}

/// Parse an integer string as `i32`; anything unparsable is zero.
pub fn parse_integer(raw: &str) -> i32 {
    raw.trim().parse().unwrap_or(0)
}

pub fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(raw)) => parse_decimal(&raw),
        Some(Value::Number(number)) => number.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        _ => 0.0,
    })
}

pub fn lenient_i32<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(raw)) => parse_integer(&raw),
        Some(Value::Number(number)) => number
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .unwrap_or(0),
        _ => 0,
    })
}

/// Null strings decode as empty
pub fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
