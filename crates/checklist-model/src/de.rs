//! Lenient deserializers for backend payloads
//!
//! The checklist backend serializes database rows directly, so flags arrive
//! as `true`, `1` or `"1"`, numbers as strings, and nested JSON columns as
//! encoded strings.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Number {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaybeEncoded<T> {
    Object(T),
    Encoded(String),
}

/// Boolean from `true`/`false`, `0`/`1`, or their string forms; `null` is `false`
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Flag>::deserialize(deserializer)? {
        None => false,
        Some(Flag::Bool(b)) => b,
        Some(Flag::Int(n)) => n != 0,
        Some(Flag::Float(n)) => n != 0.0,
        Some(Flag::Text(s)) => matches!(s.trim(), "1" | "true" | "TRUE" | "True"),
    })
}

/// Optional non-negative integer from a number or numeric string
///
/// Negative, fractional or unparseable values are treated as absent.
pub(crate) fn opt_number<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<u64>,
{
    let value = match Option::<Number>::deserialize(deserializer)? {
        None => None,
        Some(Number::Unsigned(n)) => Some(n),
        Some(Number::Signed(n)) => u64::try_from(n).ok(),
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        Some(Number::Float(n)) => (n >= 0.0 && n.fract() == 0.0).then_some(n as u64),
        Some(Number::Text(s)) => s.trim().parse().ok(),
    };
    Ok(value.and_then(|v| T::try_from(v).ok()))
}

/// `null` or a missing value becomes `T::default()`
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Nested JSON stored either as an object or as an encoded string
///
/// A string that does not decode is treated as absent.
pub(crate) fn maybe_encoded<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(match Option::<MaybeEncoded<T>>::deserialize(deserializer)? {
        None => None,
        Some(MaybeEncoded::Object(value)) => Some(value),
        Some(MaybeEncoded::Encoded(text)) => serde_json::from_str(&text).ok(),
    })
}

/// Parse a backend timestamp
///
/// Accepts RFC 3339 (`2024-05-01T10:00:00.000Z`) and the SQL form
/// `2024-05-01 10:00:00`, which is taken as UTC.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(text)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|naive| naive.and_utc())
        })
}
