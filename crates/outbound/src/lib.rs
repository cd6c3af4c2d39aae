//! Outbound encoder: turns typed send commands into the ordered form fields
//! the gateway's send endpoint accepts.
//!
//! Every encoder validates the shared addressing fields, then the variant's
//! own fields, and returns a [`WireForm`] whose `message` field carries the
//! variant's JSON body.

pub mod error;
pub mod form;
pub mod list;
mod media;
pub mod message;
pub mod quick_reply;
pub mod validate;

pub use {
    error::{Error, OutboundError, Result},
    form::WireForm,
    list::{ListItem, ListItemOption, ListMessage},
    message::OutboundMessage,
    quick_reply::{
        QuickReplyDocument, QuickReplyImage, QuickReplyOption, QuickReplyText, QuickReplyVideo,
    },
    validate::{Rule, ValidationError},
};
