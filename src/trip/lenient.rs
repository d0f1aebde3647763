//! Forgiving field deserializers
//!
//! Every function here accepts any JSON value and coerces it into the target
//! type, falling back to a default for anything unusable. Used through
//! `#[serde(deserialize_with = "...")]` on the trip model.

use crate::coord::Coordinates;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Scalar-to-string coercion; `None` for null, arrays and objects
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Numeric coercion; `None` when the value is not a finite number
fn finite_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) if s.trim().is_empty() => 0.0,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

pub fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value).unwrap_or_default())
}

pub fn optional_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value))
}

/// Trip title: null or unusable falls back to the default title
pub fn title<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value).unwrap_or_else(|| super::DEFAULT_TRIP_TITLE.to_string()))
}

/// Day id: kept when present, otherwise a fresh one is generated
pub fn day_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(scalar_to_string(&value)
        .filter(|id| !id.is_empty())
        .unwrap_or_else(super::new_day_id))
}

pub fn strings<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Array(items) => items
            .iter()
            .map(|item| scalar_to_string(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

pub fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(finite_number(&value).unwrap_or(0.0))
}

/// Exactly two numbers, each coerced independently; anything else is `(0, 0)`
pub fn coordinates<'de, D: Deserializer<'de>>(d: D) -> Result<Coordinates, D::Error> {
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Array(pair) if pair.len() == 2 => Coordinates::new(
            finite_number(&pair[0]).unwrap_or(0.0),
            finite_number(&pair[1]).unwrap_or(0.0),
        ),
        _ => Coordinates::zero(),
    })
}

/// A nested object; anything that is not an object yields the default
pub fn object<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(d)?;
    Ok(match value {
        Value::Object(_) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    })
}

/// A list of objects; non-object entries are read as `{}`
pub fn objects<'de, D, T>(d: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(d)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .map(|item| match item {
            Value::Object(_) => item,
            _ => Value::Object(Map::new()),
        })
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
