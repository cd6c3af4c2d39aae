//! Inbound webhook decoding for the WhatsApp business gateway.
//!
//! Webhooks arrive as `{app, timestamp, type, payload}`. The envelope `type`
//! selects the payload decoder; a `message` payload is itself an envelope
//! whose `type` selects the content decoder. Unknown tags at either level
//! decode to an `Uncategorized` variant holding the raw payload.

pub mod error;
pub mod inbound;
pub mod message;
mod wire;

pub use {
    error::{DecodeError, DeliveryError, Result},
    inbound::{
        AccountEvent, DeliveryStatus, EventPayload, InboundEvent, MessageEvent, SystemEvent,
        UserEvent,
    },
    message::{
        ButtonReply, Contact, InboundMedia, InboundMessage, ListReply, Location, MediaKind,
        MessageContent, MessageContext, Sender,
    },
};

/// Decode a raw webhook body.
pub fn decode(bytes: &[u8]) -> Result<InboundEvent> {
    InboundEvent::from_slice(bytes)
}
