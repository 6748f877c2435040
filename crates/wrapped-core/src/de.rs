//! Lenient serde adapters for dashboard payload fields.
//!
//! The analytics API omits fields it has no data for, sends `null` for
//! others, and encodes the day timestamp as a numeric string. Every numeric
//! field on the input schema goes through one of these functions so that
//! defaults are applied once, at the deserialization boundary.

use serde::de::{Deserialize, DeserializeOwned, Deserializer, Error};
use serde_json::Value;

/// Interpret a JSON value as an `f64`.
///
/// * `null` / absent → `0.0`
/// * number → its value
/// * numeric string (surrounding whitespace allowed) → parsed value
/// * empty string → `0.0`
/// * anything else → `None`
fn numeric(value: &Value) -> Option<f64> {
    match value {
        Value::Null => Some(0.0),
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse::<f64>().ok()
            }
        }
        Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Deserialize a non-negative counter. Negative and fractional inputs are
/// clamped / rounded.
pub fn count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Value::Number(n) = &value {
        if let Some(v) = n.as_u64() {
            return Ok(v);
        }
    }
    match numeric(&value) {
        Some(v) if v.is_finite() && v > 0.0 => Ok(v.round() as u64),
        Some(_) => Ok(0),
        None => Err(D::Error::custom(format!("expected a count, got {value}"))),
    }
}

/// Deserialize an epoch-milliseconds timestamp sent either as a JSON number
/// or as a numeric string.
pub fn epoch_millis<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if let Value::Number(n) = &value {
        if let Some(v) = n.as_i64() {
            return Ok(v);
        }
    }
    if let Value::String(s) = &value {
        if let Ok(v) = s.trim().parse::<i64>() {
            return Ok(v);
        }
    }
    match numeric(&value) {
        Some(v) if v.is_finite() => Ok(v.trunc() as i64),
        _ => Err(D::Error::custom(format!(
            "expected an epoch timestamp, got {value}"
        ))),
    }
}

/// Deserialize a floating point quantity (token thousands, cents).
pub fn amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match numeric(&value) {
        Some(v) if v.is_finite() => Ok(v),
        Some(_) => Ok(0.0),
        None => Err(D::Error::custom(format!("expected a number, got {value}"))),
    }
}

/// Deserialize any `Default` type, mapping an explicit `null` to the default.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "count")]
        count: u64,
        #[serde(default, deserialize_with = "epoch_millis")]
        date: i64,
        #[serde(default, deserialize_with = "amount")]
        cents: f64,
        #[serde(default, deserialize_with = "null_as_default")]
        names: Vec<String>,
    }

    fn probe(json: &str) -> Probe {
        serde_json::from_str(json).expect("probe should deserialize")
    }

    #[test]
    fn test_missing_fields_default_to_zero() {
        let p = probe("{}");
        assert_eq!(p.count, 0);
        assert_eq!(p.date, 0);
        assert_eq!(p.cents, 0.0);
        assert!(p.names.is_empty());
    }

    #[test]
    fn test_null_fields_default_to_zero() {
        let p = probe(r#"{"count": null, "date": null, "cents": null, "names": null}"#);
        assert_eq!(p.count, 0);
        assert_eq!(p.date, 0);
        assert_eq!(p.cents, 0.0);
        assert!(p.names.is_empty());
    }

    #[test]
    fn test_date_as_numeric_string() {
        let p = probe(r#"{"date": "1748736000000"}"#);
        assert_eq!(p.date, 1_748_736_000_000);
    }

    #[test]
    fn test_date_as_number() {
        let p = probe(r#"{"date": 1748736000000}"#);
        assert_eq!(p.date, 1_748_736_000_000);
    }

    #[test]
    fn test_negative_count_clamps_to_zero() {
        let p = probe(r#"{"count": -4}"#);
        assert_eq!(p.count, 0);
    }

    #[test]
    fn test_count_from_string_and_float() {
        assert_eq!(probe(r#"{"count": "12"}"#).count, 12);
        assert_eq!(probe(r#"{"count": 2.6}"#).count, 3);
    }

    #[test]
    fn test_fractional_cents_preserved() {
        let p = probe(r#"{"cents": 12.75}"#);
        assert!((p.cents - 12.75).abs() < 1e-9);
    }

    #[test]
    fn test_non_numeric_string_is_an_error() {
        let result = serde_json::from_str::<Probe>(r#"{"count": "lots"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_object_in_date_is_an_error() {
        let result = serde_json::from_str::<Probe>(r#"{"date": {"ms": 1}}"#);
        assert!(result.is_err());
    }
}
