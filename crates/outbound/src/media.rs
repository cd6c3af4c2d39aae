//! Encoders that upload local media first and send the resulting URL.

use {
    tracing::debug,
    waba_media::{MediaResolver, MediaUpload},
};

use crate::{error::Result, form::WireForm, message::OutboundMessage};

impl OutboundMessage {
    /// Upload both renditions and encode an image message.
    ///
    /// Shared fields are checked before anything is uploaded. Each upload is
    /// consumed by the call, so its reader is released once whether the
    /// store succeeds or fails.
    pub async fn image_from_bytes(
        &self,
        resolver: &MediaResolver,
        original: MediaUpload,
        preview: MediaUpload,
    ) -> Result<WireForm> {
        self.validate()?;
        let original_url = resolver.upload(original).await?;
        let preview_url = resolver.upload(preview).await?;
        debug!(%original_url, %preview_url, "uploaded image renditions");
        self.image(&original_url, &preview_url)
    }

    pub async fn audio_from_bytes(
        &self,
        resolver: &MediaResolver,
        media: MediaUpload,
    ) -> Result<WireForm> {
        self.validate()?;
        let url = resolver.upload(media).await?;
        self.audio(&url)
    }

    pub async fn video_from_bytes(
        &self,
        resolver: &MediaResolver,
        media: MediaUpload,
        caption: &str,
    ) -> Result<WireForm> {
        self.validate()?;
        let url = resolver.upload(media).await?;
        self.video(&url, caption)
    }
}
