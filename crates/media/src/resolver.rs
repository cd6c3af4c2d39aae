//! Turns locally held bytes into durable URLs, and fetches them back.

use std::{future::Future, sync::Arc, time::Duration};

use {
    serde::{Deserialize, Serialize},
    tokio::io::AsyncRead,
    tracing::{debug, info, warn},
};

use crate::{
    error::{Error, Result},
    mime,
    store::{BackendError, MediaReader, ObjectStore, join_key, object_name},
};

/// Default per-call timeout for store and fetch.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Resolver settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Key prefix for every stored object.
    pub path_prefix: String,

    /// Public host that serves stored objects. When unset, URLs are the
    /// backend's own media links.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_host: Option<String>,

    /// Per-call timeout, counted from the start of each operation.
    pub timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            path_prefix: String::new(),
            url_host: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl MediaConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// A byte stream waiting to be uploaded, with its content type.
pub struct MediaUpload {
    pub reader: MediaReader,
    pub content_type: String,
}

impl MediaUpload {
    pub fn new(
        reader: impl AsyncRead + Send + Unpin + 'static,
        content_type: impl Into<String>,
    ) -> Self {
        Self {
            reader: Box::new(reader),
            content_type: content_type.into(),
        }
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>, content_type: impl Into<String>) -> Self {
        Self::new(std::io::Cursor::new(bytes.into()), content_type)
    }
}

impl std::fmt::Debug for MediaUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaUpload")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Media fetched back from the store.
pub struct FetchedMedia {
    pub reader: MediaReader,
    pub content_type: String,
}

impl std::fmt::Debug for FetchedMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedMedia")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Media reference resolver. Cheap to clone; clones share the store handle.
#[derive(Clone)]
pub struct MediaResolver {
    store: Arc<dyn ObjectStore>,
    config: MediaConfig,
}

impl std::fmt::Debug for MediaResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaResolver")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl MediaResolver {
    pub fn new(store: Arc<dyn ObjectStore>, config: MediaConfig) -> Self {
        Self { store, config }
    }

    #[must_use]
    pub fn config(&self) -> &MediaConfig {
        &self.config
    }

    /// Store `reader` and return the URL it can be fetched from.
    ///
    /// The reader is consumed: it is dropped once the upload finishes, fails
    /// or times out.
    pub async fn store(&self, reader: MediaReader, content_type: &str) -> Result<String> {
        if content_type.is_empty() {
            return Err(Error::invalid_input("content type not specified"));
        }

        let name = object_name(mime::extension_for(content_type));
        let key = join_key(&self.config.path_prefix, &name);

        let object = self
            .with_timeout("store", async {
                let mut reader = reader;
                self.store
                    .put(&key, content_type, &mut reader)
                    .await
                    .map_err(|e| backend_error("failed to store media", &key, e))
            })
            .await?;

        info!(key = %object.key, content_type, "stored media object");

        Ok(match self.config.url_host.as_deref() {
            Some(host) if !host.is_empty() => {
                format!("{}/{}", host.trim_end_matches('/'), object.key)
            },
            _ => object.media_link,
        })
    }

    /// Store `reader`, deriving the content type from a file extension.
    pub async fn store_with_extension(
        &self,
        reader: MediaReader,
        extension: &str,
    ) -> Result<String> {
        if extension.trim_start_matches('.').is_empty() {
            return Err(Error::invalid_input("extension not specified"));
        }
        let content_type = mime::content_type_for(extension)
            .ok_or_else(|| Error::invalid_input("content type not found"))?;
        self.store(reader, &content_type).await
    }

    pub async fn upload(&self, upload: MediaUpload) -> Result<String> {
        self.store(upload.reader, &upload.content_type).await
    }

    /// Open a stored object by the reference returned from [`Self::store`]
    /// (relative to the path prefix).
    pub async fn fetch(&self, reference: &str) -> Result<FetchedMedia> {
        let key = join_key(&self.config.path_prefix, reference);
        let stored = self
            .with_timeout("fetch", async {
                self.store
                    .open(&key)
                    .await
                    .map_err(|e| backend_error("failed to open media", reference, e))
            })
            .await?;

        debug!(key = %key, content_type = %stored.content_type, "fetched media object");
        Ok(FetchedMedia {
            reader: stored.reader,
            content_type: stored.content_type,
        })
    }

    async fn with_timeout<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let after = self.config.timeout();
        match tokio::time::timeout(after, fut).await {
            Ok(result) => result,
            Err(_) => {
                warn!(operation, timeout_secs = after.as_secs(), "media operation timed out");
                Err(Error::Timeout { operation, after })
            },
        }
    }
}

fn backend_error(context: &str, reference: &str, err: BackendError) -> Error {
    match err {
        BackendError::NotFound { .. } => Error::NotFound {
            reference: reference.to_string(),
        },
        BackendError::InvalidKey { key } => {
            Error::invalid_input(format!("invalid media reference: {key}"))
        },
        other => {
            warn!(reference, error = %other, "{context}");
            Error::external(context, other)
        },
    }
}
