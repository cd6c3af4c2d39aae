//! Config schema: media storage and sender defaults.

use std::{path::PathBuf, sync::Arc};

use {
    anyhow::Context,
    serde::{Deserialize, Serialize},
    waba_media::{FsObjectStore, MediaConfig, MediaResolver},
    waba_outbound::OutboundMessage,
};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WabaConfig {
    pub media: MediaConfig,
    pub storage: StorageConfig,
    pub sender: SenderConfig,
}

/// Where the filesystem object store keeps media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub root_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: PathBuf::from("media"),
        }
    }
}

/// Addressing used for every outbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SenderConfig {
    pub channel: String,
    /// Registered business number.
    pub source: String,
    /// Registered app name.
    pub source_name: String,
    /// Set to `false` to send without field validation.
    pub validate: bool,
}

impl Default for SenderConfig {
    fn default() -> Self {
        Self {
            channel: "whatsapp".into(),
            source: String::new(),
            source_name: String::new(),
            validate: true,
        }
    }
}

impl SenderConfig {
    /// Outbound message addressed to `destination`.
    #[must_use]
    pub fn message_to(&self, destination: impl Into<String>) -> OutboundMessage {
        OutboundMessage {
            channel: self.channel.clone(),
            destination: destination.into(),
            source: self.source.clone(),
            source_name: self.source_name.clone(),
            disable_preview: true,
            do_not_validate: !self.validate,
        }
    }
}

impl WabaConfig {
    /// Resolver backed by a filesystem store under `storage.root_dir`.
    pub fn media_resolver(&self) -> anyhow::Result<MediaResolver> {
        let root = &self.storage.root_dir;
        std::fs::create_dir_all(root)
            .with_context(|| format!("failed to create media root {}", root.display()))?;
        let store = FsObjectStore::new(root)
            .with_context(|| format!("invalid media root {}", root.display()))?;
        Ok(MediaResolver::new(Arc::new(store), self.media.clone()))
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = WabaConfig::default();
        assert_eq!(cfg.sender.channel, "whatsapp");
        assert!(cfg.sender.validate);
        assert_eq!(cfg.media.timeout_secs, waba_media::DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.storage.root_dir, PathBuf::from("media"));
    }

    #[test]
    fn sender_builds_message() {
        let sender = SenderConfig {
            source: "+15555555555".into(),
            source_name: "Our Company".into(),
            validate: false,
            ..Default::default()
        };
        let msg = sender.message_to("+14155552671");
        assert_eq!(msg.channel, "whatsapp");
        assert_eq!(msg.destination, "+14155552671");
        assert_eq!(msg.source_name, "Our Company");
        assert!(msg.do_not_validate);
    }

    #[test]
    fn validated_sender_encodes() {
        let sender = SenderConfig {
            source: "+15555555555".into(),
            source_name: "Our Company".into(),
            ..Default::default()
        };
        let form = sender.message_to("+14155552671").text("hi").unwrap();
        assert_eq!(form.get("src.name"), Some("Our Company"));
        assert!(sender.message_to("nobody").text("hi").is_err());
    }

    #[test]
    fn resolver_creates_root() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = WabaConfig {
            storage: StorageConfig {
                root_dir: dir.path().join("nested/media"),
            },
            ..Default::default()
        };
        let resolver = cfg.media_resolver().unwrap();
        assert!(dir.path().join("nested/media").is_dir());
        assert_eq!(resolver.config(), &cfg.media);
    }
}
