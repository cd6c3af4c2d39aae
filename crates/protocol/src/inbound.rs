//! Outer webhook envelope: `{app, timestamp, type, payload}`.

use {
    chrono::{DateTime, Utc},
    serde::Deserialize,
    serde_json::value::RawValue,
    tracing::debug,
};

use crate::{
    error::{DecodeError, DeliveryError, Result},
    message::InboundMessage,
    wire::{decode_fragment, epoch_millis, nullable, raw_payload},
};

/// A decoded inbound webhook.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    /// Name of the gateway application that received the event.
    pub app: String,
    /// Event time, truncated to whole seconds.
    pub timestamp: DateTime<Utc>,
    /// Discriminator as sent on the wire (`type`).
    pub kind: String,
    pub payload: EventPayload,
}

/// Event payload, one variant per envelope tag.
#[derive(Debug, Clone)]
pub enum EventPayload {
    UserEvent(UserEvent),
    SystemEvent(SystemEvent),
    AccountEvent(AccountEvent),
    MessageEvent(MessageEvent),
    Message(InboundMessage),
    /// Unknown tag; the raw payload is kept as sent.
    Uncategorized(Option<Box<RawValue>>),
}

impl EventPayload {
    /// Wire tag of a recognized payload, `None` when uncategorized.
    #[must_use]
    pub fn kind_name(&self) -> Option<&'static str> {
        match self {
            Self::UserEvent(_) => Some("user-event"),
            Self::SystemEvent(_) => Some("system-event"),
            Self::AccountEvent(_) => Some("account-event"),
            Self::MessageEvent(_) => Some("message-event"),
            Self::Message(_) => Some("message"),
            Self::Uncategorized(_) => None,
        }
    }
}

/// Opt-in / opt-out and similar user lifecycle events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserEvent {
    #[serde(default, deserialize_with = "nullable")]
    pub phone: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub subtype: String,
}

/// Template lifecycle notification.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SystemEvent {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub status: String,
    #[serde(rename = "elementName", default, deserialize_with = "nullable")]
    pub template_name: String,
    #[serde(rename = "languageCode", default, deserialize_with = "nullable")]
    pub language_code: String,
    #[serde(rename = "rejectedReason", default, deserialize_with = "nullable")]
    pub rejected_reason: String,
}

/// Account notification with a loosely typed body.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AccountEvent {
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub subtype: String,
    #[serde(default, deserialize_with = "nullable")]
    pub payload: serde_json::Map<String, serde_json::Value>,
}

/// Delivery status of a previously sent message.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageEvent {
    #[serde(default, deserialize_with = "nullable")]
    pub id: String,
    #[serde(rename = "gsId", default, deserialize_with = "nullable")]
    pub gateway_id: String,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    pub subtype: String,
    #[serde(default, deserialize_with = "nullable")]
    pub destination: String,
    /// Subtype-specific body, left undecoded. `None` only when the key is
    /// missing.
    #[serde(rename = "payload", default, deserialize_with = "raw_payload")]
    pub raw_payload: Option<Box<RawValue>>,
}

/// Known message-event subtypes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    Enqueued,
    Failed,
    Sent,
    Delivered,
    Read,
    Deleted,
    Other(String),
}

#[derive(Default, Deserialize)]
struct FailureWire {
    code: i64,
    reason: String,
}

impl MessageEvent {
    #[must_use]
    pub fn status(&self) -> DeliveryStatus {
        match self.subtype.as_str() {
            "enqueued" => DeliveryStatus::Enqueued,
            "failed" => DeliveryStatus::Failed,
            "sent" => DeliveryStatus::Sent,
            "delivered" => DeliveryStatus::Delivered,
            "read" => DeliveryStatus::Read,
            "deleted" => DeliveryStatus::Deleted,
            other => DeliveryStatus::Other(other.to_string()),
        }
    }

    /// The delivery failure carried by a `failed` event.
    ///
    /// Other subtypes never yield an error, whatever their payload holds.
    #[must_use]
    pub fn extract_error(&self) -> Option<DeliveryError> {
        if self.subtype != "failed" {
            return None;
        }
        match decode_fragment::<FailureWire>("message-event", self.raw_payload.as_deref()) {
            Ok(failure) => Some(DeliveryError::Failed {
                code: failure.code,
                reason: failure.reason,
            }),
            Err(e) => Some(DeliveryError::Malformed(e)),
        }
    }
}

#[derive(Deserialize)]
struct EnvelopeWire {
    #[serde(default, deserialize_with = "nullable")]
    app: String,
    #[serde(default, deserialize_with = "nullable")]
    timestamp: i64,
    #[serde(rename = "type", default, deserialize_with = "nullable")]
    kind: String,
    #[serde(default, deserialize_with = "raw_payload")]
    payload: Option<Box<RawValue>>,
}

impl InboundEvent {
    /// Decode a webhook body.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let wire: EnvelopeWire =
            serde_json::from_slice(bytes).map_err(|source| DecodeError::Envelope { source })?;
        Self::from_wire(wire)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Self::from_slice(json.as_bytes())
    }

    fn from_wire(wire: EnvelopeWire) -> Result<Self> {
        let timestamp = epoch_millis("timestamp", wire.timestamp)?;
        let fragment = wire.payload.as_deref();
        let payload = match wire.kind.as_str() {
            "user-event" => EventPayload::UserEvent(decode_fragment("user-event", fragment)?),
            "system-event" => EventPayload::SystemEvent(decode_fragment("system-event", fragment)?),
            "account-event" => {
                EventPayload::AccountEvent(decode_fragment("account-event", fragment)?)
            },
            "message-event" => {
                EventPayload::MessageEvent(decode_fragment("message-event", fragment)?)
            },
            "message" => EventPayload::Message(InboundMessage::from_fragment(fragment)?),
            other => {
                debug!(app = %wire.app, kind = other, "uncategorized webhook event");
                EventPayload::Uncategorized(wire.payload)
            },
        };

        Ok(Self {
            app: wire.app,
            timestamp,
            kind: wire.kind,
            payload,
        })
    }
}
