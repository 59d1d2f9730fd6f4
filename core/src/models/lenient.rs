//! Forgiving field decoders.
//!
//! The platform is loose about JSON types: counts arrive as `3.0`, years as
//! `"2015"`, ids occasionally as numbers. A mismatched optional field decodes
//! to `None` instead of failing the whole entity.

use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::{Number, Value};

/// Optional number from an integer, float or numeric string.
pub(crate) fn number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => parse(&number_text(&n)),
        Value::String(s) => parse(s.trim()),
        _ => None,
    })
}

/// Required id from a string or a number.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(serde::de::Error::custom(format!("expected an id, found {other}"))),
    }
}

/// Whole floats are written without a fraction so integer targets accept them.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

fn parse<T: FromStr>(text: &str) -> Option<T> {
    text.parse().ok().or_else(|| {
        let f: f64 = text.parse().ok()?;
        if f.fract() == 0.0 {
            format!("{f:.0}").parse().ok()
        } else {
            None
        }
    })
}
