//! Ordered form fields submitted to the gateway's send endpoint.

use serde::{Serialize, Serializer};

pub const FIELD_CHANNEL: &str = "channel";
pub const FIELD_DESTINATION: &str = "destination";
pub const FIELD_SOURCE: &str = "source";
pub const FIELD_SOURCE_NAME: &str = "src.name";
pub const FIELD_DISABLE_PREVIEW: &str = "disablePreview";
/// Carries the JSON-encoded message body.
pub const FIELD_MESSAGE: &str = "message";

/// Key/value pairs in the order the gateway expects them.
///
/// Serializes as a sequence of `[key, value]` pairs so the order survives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireForm {
    fields: Vec<(String, String)>,
}

impl WireForm {
    pub(crate) fn push(&mut self, key: &str, value: impl Into<String>) {
        self.fields.push((key.to_string(), value.into()));
    }

    /// First value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The `message` field parsed back into JSON.
    #[must_use]
    pub fn message_json(&self) -> Option<serde_json::Value> {
        self.get(FIELD_MESSAGE)
            .and_then(|raw| serde_json::from_str(raw).ok())
    }

    /// `application/x-www-form-urlencoded` body.
    #[must_use]
    pub fn to_urlencoded(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl Serialize for WireForm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
