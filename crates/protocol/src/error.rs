/// Crate-wide result type for inbound decoding.
pub type Result<T> = std::result::Result<T, DecodeError>;

/// Structural failure while decoding an inbound webhook.
///
/// Every variant names the layer that failed so callers can tell a broken
/// envelope apart from a broken leaf payload.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The outer `{app, timestamp, type, payload}` object is malformed.
    #[error("failed to parse webhook envelope: {source}")]
    Envelope {
        #[source]
        source: serde_json::Error,
    },

    /// A tagged payload did not match the shape its tag selects.
    #[error("failed to parse {layer} payload: {source}")]
    Payload {
        layer: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// An epoch-millisecond field is outside the representable range.
    #[error("{field} {millis}ms is out of range")]
    Timestamp { field: &'static str, millis: i64 },
}

impl DecodeError {
    #[must_use]
    pub fn payload(layer: &'static str, source: serde_json::Error) -> Self {
        Self::Payload { layer, source }
    }

    /// The layer that failed, `"envelope"` for the outer object.
    #[must_use]
    pub fn layer(&self) -> &'static str {
        match self {
            Self::Envelope { .. } => "envelope",
            Self::Payload { layer, .. } => layer,
            Self::Timestamp { field, .. } => field,
        }
    }
}

/// Delivery failure reported by a `failed` message-event.
///
/// Returned as a value by [`crate::inbound::MessageEvent::extract_error`];
/// decoding the event itself succeeded.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("message-event failed:[{code}] {reason}")]
    Failed { code: i64, reason: String },

    #[error(transparent)]
    Malformed(#[from] DecodeError),
}
