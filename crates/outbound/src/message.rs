//! Shared sender fields and the per-variant encoders.

use {serde::Serialize, tracing::debug};

use crate::{
    error::Result,
    form::{
        FIELD_CHANNEL, FIELD_DESTINATION, FIELD_DISABLE_PREVIEW, FIELD_MESSAGE, FIELD_SOURCE,
        FIELD_SOURCE_NAME, WireForm,
    },
    list::ListMessage,
    quick_reply::{QuickReplyDocument, QuickReplyImage, QuickReplyText, QuickReplyVideo},
    validate::{self, Check},
};

/// Addressing shared by every outbound message.
///
/// Each encoder validates these fields first (unless `do_not_validate` is
/// set), then the variant's own fields, and only then builds the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutboundMessage {
    /// Gateway channel, usually `whatsapp`.
    pub channel: String,
    /// Recipient phone number in E.164 form.
    pub destination: String,
    /// Registered business number.
    pub source: String,
    /// Registered app name, sent as `src.name`.
    pub source_name: String,
    /// Sent as `disablePreview=true` whatever the value.
    pub disable_preview: bool,
    /// Skip all field validation for this message.
    pub do_not_validate: bool,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum Body<'a> {
    Text {
        text: &'a str,
    },
    Image {
        #[serde(rename = "originalUrl")]
        original_url: &'a str,
        #[serde(rename = "previewUrl")]
        preview_url: &'a str,
    },
    Audio {
        url: &'a str,
    },
    Video {
        url: &'a str,
        caption: &'a str,
    },
    File {
        url: &'a str,
        filename: &'a str,
    },
}

impl OutboundMessage {
    /// Check the shared addressing fields.
    pub fn validate(&self) -> Check {
        if self.do_not_validate {
            return Ok(());
        }
        validate::required("channel", &self.channel)?;
        validate::e164("destination", &self.destination)?;
        validate::required("source", &self.source)?;
        validate::required("source_name", &self.source_name)
    }

    pub fn text(&self, text: &str) -> Result<WireForm> {
        self.validate()?;
        if !self.do_not_validate {
            validate::required("text", text)?;
        }
        self.encode("text", &Body::Text { text })
    }

    pub fn image(&self, original_url: &str, preview_url: &str) -> Result<WireForm> {
        self.validate()?;
        if !self.do_not_validate {
            validate::url("original_url", original_url)?;
            validate::url("preview_url", preview_url)?;
        }
        self.encode("image", &Body::Image {
            original_url,
            preview_url,
        })
    }

    pub fn audio(&self, url: &str) -> Result<WireForm> {
        self.validate()?;
        self.encode("audio", &Body::Audio { url })
    }

    pub fn video(&self, url: &str, caption: &str) -> Result<WireForm> {
        self.validate()?;
        self.encode("video", &Body::Video { url, caption })
    }

    pub fn file(&self, url: &str, filename: &str) -> Result<WireForm> {
        self.validate()?;
        self.encode("file", &Body::File { url, filename })
    }

    pub fn list_message(&self, list: &ListMessage) -> Result<WireForm> {
        self.validate()?;
        if !self.do_not_validate {
            list.validate()?;
        }
        self.encode("list", list)
    }

    pub fn quick_reply_text(&self, reply: &QuickReplyText) -> Result<WireForm> {
        self.validate()?;
        self.encode("quick_reply_text", reply)
    }

    pub fn quick_reply_image(&self, reply: &QuickReplyImage) -> Result<WireForm> {
        self.validate()?;
        self.encode("quick_reply_image", reply)
    }

    pub fn quick_reply_video(&self, reply: &QuickReplyVideo) -> Result<WireForm> {
        self.validate()?;
        self.encode("quick_reply_video", reply)
    }

    pub fn quick_reply_document(&self, reply: &QuickReplyDocument) -> Result<WireForm> {
        self.validate()?;
        self.encode("quick_reply_document", reply)
    }

    fn encode(&self, variant: &'static str, body: &impl Serialize) -> Result<WireForm> {
        let message = serde_json::to_string(body)?;

        let mut form = WireForm::default();
        form.push(FIELD_CHANNEL, self.channel.as_str());
        form.push(FIELD_DESTINATION, self.destination.as_str());
        form.push(FIELD_SOURCE, self.source.as_str());
        form.push(FIELD_SOURCE_NAME, self.source_name.as_str());
        form.push(FIELD_DISABLE_PREVIEW, "true");
        form.push(FIELD_MESSAGE, message);

        debug!(
            variant,
            destination = %self.destination,
            validated = !self.do_not_validate,
            "encoded outbound message"
        );
        Ok(form)
    }
}
