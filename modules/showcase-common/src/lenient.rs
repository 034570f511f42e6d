//! Forgiving field readers for snapshot and model JSON.
//!
//! Snapshots are written by hand and by older crawlers, and model output is
//! only loosely shaped, so a single odd field must not fail the whole file.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// `null` reads as the type's default.
pub fn null_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

/// Relevance scores as ints, floats or numeric strings, rounded and clamped
/// to 0-10. Anything else is 0.
pub fn score<'de, D: Deserializer<'de>>(d: D) -> Result<u8, D::Error> {
    let raw = number(Value::deserialize(d)?);
    Ok(raw.round().clamp(0.0, 10.0) as u8)
}

/// Engagement counts as ints, floats or numeric strings ("1,204" included).
/// Negative or unreadable values are 0.
pub fn count<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let raw = number(Value::deserialize(d)?);
    if raw.is_finite() && raw > 0.0 {
        Ok(raw.round() as u64)
    } else {
        Ok(0)
    }
}

fn number(value: Value) -> f64 {
    let raw = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        _ => 0.0,
    };
    if raw.is_nan() {
        0.0
    } else {
        raw
    }
}
