//! Lenient field deserializers.
//!
//! Stored blocks come from several editors over time; numbers and booleans
//! show up both natively and as strings.

use serde::de::{Deserializer, Error};
use serde::Deserialize;
use serde_json::Value;

pub(crate) fn flex_bool<'de, D: Deserializer<'de>>(de: D) -> Result<bool, D::Error> {
    match Value::deserialize(de)? {
        Value::Bool(b) => Ok(b),
        Value::Null => Ok(false),
        Value::Number(n) => Ok(n.as_f64().is_some_and(|v| v != 0.0)),
        Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Ok(true),
            "false" | "0" | "off" | "no" | "" => Ok(false),
            other => Err(D::Error::custom(format!("expected a boolean, got '{other}'"))),
        },
        other => Err(D::Error::custom(format!("expected a boolean, got {other}"))),
    }
}

fn number<E: Error>(value: Value) -> Result<f64, E> {
    match value {
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| E::custom("number out of range")),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .map_err(|_| E::custom(format!("expected a number, got '{s}'"))),
        other => Err(E::custom(format!("expected a number, got {other}"))),
    }
}

pub(crate) fn flex_f64<'de, D: Deserializer<'de>>(de: D) -> Result<f64, D::Error> {
    let v = number::<D::Error>(Value::deserialize(de)?)?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(D::Error::custom("number is not finite"))
    }
}

pub(crate) fn flex_u32<'de, D: Deserializer<'de>>(de: D) -> Result<u32, D::Error> {
    let v = flex_f64(de)?;
    if v < 0.0 || v > f64::from(u32::MAX) {
        return Err(D::Error::custom(format!("{v} is out of range")));
    }
    Ok(v.round() as u32)
}

pub(crate) fn flex_u64<'de, D: Deserializer<'de>>(de: D) -> Result<u64, D::Error> {
    let v = flex_f64(de)?;
    if v < 0.0 {
        return Err(D::Error::custom(format!("{v} is negative")));
    }
    Ok(v.round() as u64)
}

/// Accept strings, and numbers or booleans rendered as strings.
pub(crate) fn flex_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    match Value::deserialize(de)? {
        Value::String(s) => Ok(s),
        Value::Null => Ok(String::new()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(D::Error::custom(format!("expected a string, got {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Probe {
        #[serde(deserialize_with = "flex_bool")]
        flag: bool,
        #[serde(deserialize_with = "flex_u32")]
        count: u32,
        #[serde(deserialize_with = "flex_string")]
        label: String,
    }

    #[test]
    fn test_accepts_stringly_values() {
        let probe: Probe =
            serde_json::from_value(json!({"flag": "true", "count": "3", "label": 12})).unwrap();
        assert_eq!(
            probe,
            Probe {
                flag: true,
                count: 3,
                label: "12".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(serde_json::from_value::<Probe>(json!({"flag": "maybe", "count": 1, "label": ""}))
            .is_err());
        assert!(serde_json::from_value::<Probe>(json!({"flag": true, "count": -1, "label": ""}))
            .is_err());
    }
}
