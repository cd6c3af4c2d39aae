//! Helpers shared by the envelope and leaf decoders.

use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Deserializer, de::DeserializeOwned},
    serde_json::value::RawValue,
};

use crate::error::{DecodeError, Result};

/// Convert wire epoch milliseconds to a UTC time, truncating to whole seconds.
pub(crate) fn epoch_millis(field: &'static str, millis: i64) -> Result<DateTime<Utc>> {
    DateTime::from_timestamp(millis / 1000, 0).ok_or(DecodeError::Timestamp { field, millis })
}

/// Decode a raw payload fragment, attributing failures to `layer`.
///
/// An absent fragment is decoded as empty input and therefore fails. A JSON
/// `null` fragment decodes to `T::default()`.
pub(crate) fn decode_fragment<T: DeserializeOwned + Default>(
    layer: &'static str,
    raw: Option<&RawValue>,
) -> Result<T> {
    serde_json::from_str::<Option<T>>(raw.map_or("", RawValue::get))
        .map(Option::unwrap_or_default)
        .map_err(|source| DecodeError::payload(layer, source))
}

/// Keep a present payload verbatim, `null` included. Pair with
/// `#[serde(default)]` so only a missing key becomes `None`.
pub(crate) fn raw_payload<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<Box<RawValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    Box::<RawValue>::deserialize(deserializer).map(Some)
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
