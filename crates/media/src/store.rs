//! Object-store seam behind the media resolver, plus a filesystem backend.

use std::{
    path::{Component, Path, PathBuf},
    time::SystemTime,
};

use {
    async_trait::async_trait,
    rand::{Rng, distr::Alphanumeric},
    tokio::io::{AsyncRead, AsyncWriteExt},
    tracing::debug,
};

/// Single-use byte stream handed to or returned from a store.
pub type MediaReader = Box<dyn AsyncRead + Send + Unpin>;

/// Length of the random part of generated object names.
pub const RANDOM_NAME_LEN: usize = 10;

/// Failure reported by a backing store.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("object does not exist: {key}")]
    NotFound { key: String },

    #[error("invalid object key: {key}")]
    InvalidKey { key: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// An object committed to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    /// Backend-native link to the object.
    pub media_link: String,
}

/// An object opened for reading.
pub struct StoredReader {
    pub reader: MediaReader,
    pub content_type: String,
}

impl std::fmt::Debug for StoredReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredReader")
            .field("content_type", &self.content_type)
            .finish_non_exhaustive()
    }
}

/// Durable object storage. Writes must become visible atomically: an object
/// is either absent or complete.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<StoredObject, BackendError>;

    async fn open(&self, key: &str) -> Result<StoredReader, BackendError>;
}

/// Object name `<random>-<epoch secs><.ext>`.
pub(crate) fn object_name(extension: Option<&str>) -> String {
    let token: String = rand::rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_NAME_LEN)
        .map(char::from)
        .collect();
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    match extension {
        Some(ext) => format!("{token}-{now}.{ext}"),
        None => format!("{token}-{now}"),
    }
}

/// Join a key prefix and a name with a single `/`.
pub(crate) fn join_key(prefix: &str, name: &str) -> String {
    let prefix = prefix.trim_matches('/');
    let name = name.trim_start_matches('/');
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}

// ── Filesystem backend ──────────────────────────────────────────────────────

/// Stores objects as files under a root directory.
///
/// Data is written to a hidden `.partial` file and renamed into place once
/// complete, so readers never observe a half-written object. The content
/// type lives in a hidden side file next to the object.
#[derive(Debug, Clone)]
pub struct FsObjectStore {
    root: PathBuf,
}

impl FsObjectStore {
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self {
            root: std::path::absolute(root)?,
        })
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, key: &str) -> Result<PathBuf, BackendError> {
        let relative = Path::new(key);
        let valid = !key.is_empty()
            && relative
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(BackendError::InvalidKey {
                key: key.to_string(),
            });
        }
        Ok(self.root.join(relative))
    }
}

fn side_path(path: &Path, suffix: &str) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{suffix}"))
}

/// Removes the files of an uncommitted write when dropped.
#[derive(Default)]
struct Uncommitted {
    paths: Vec<PathBuf>,
}

impl Uncommitted {
    fn track(&mut self, path: &Path) {
        self.paths.push(path.to_path_buf());
    }

    fn commit(mut self) {
        self.paths.clear();
    }
}

impl Drop for Uncommitted {
    fn drop(&mut self) {
        // Drop cannot await, and the guard also fires when the put future is
        // cancelled; unlinking a local file is short enough to do inline.
        for path in self.paths.drain(..) {
            debug!(path = %path.display(), "discarding uncommitted media file");
            let _ = std::fs::remove_file(path);
        }
    }
}

#[async_trait]
impl ObjectStore for FsObjectStore {
    async fn put(
        &self,
        key: &str,
        content_type: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<StoredObject, BackendError> {
        let path = self.object_path(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let partial_path = side_path(&path, "partial");
        let type_path = side_path(&path, "content-type");
        let mut pending = Uncommitted::default();
        pending.track(&partial_path);

        let mut file = tokio::fs::File::create(&partial_path).await?;
        tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        pending.track(&type_path);
        tokio::fs::write(&type_path, content_type).await?;
        tokio::fs::rename(&partial_path, &path).await?;
        pending.commit();

        let media_link = url::Url::from_file_path(&path)
            .map(String::from)
            .unwrap_or_else(|()| path.display().to_string());
        Ok(StoredObject {
            key: key.to_string(),
            media_link,
        })
    }

    async fn open(&self, key: &str) -> Result<StoredReader, BackendError> {
        let path = self.object_path(key)?;
        let file = match tokio::fs::File::open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BackendError::NotFound {
                    key: key.to_string(),
                });
            },
            Err(e) => return Err(e.into()),
        };

        let content_type = match tokio::fs::read_to_string(side_path(&path, "content-type")).await
        {
            Ok(ct) => ct,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => mime_guess::from_path(&path)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
            Err(e) => return Err(e.into()),
        };

        Ok(StoredReader {
            reader: Box::new(file),
            content_type,
        })
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {
        super::*,
        std::{
            io,
            pin::Pin,
            task::{Context, Poll},
        },
        tokio::io::{AsyncReadExt, ReadBuf},
    };

    #[test]
    fn object_name_shape() {
        let name = object_name(Some("jpg"));
        let (token, rest) = name.split_once('-').unwrap();
        assert_eq!(token.len(), RANDOM_NAME_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
        let secs = rest.strip_suffix(".jpg").unwrap();
        assert!(secs.parse::<u64>().unwrap() > 1_600_000_000);
    }

    #[test]
    fn object_name_without_extension() {
        let name = object_name(None);
        assert!(!name.contains('.'));
        assert_ne!(object_name(None)[..RANDOM_NAME_LEN], name[..RANDOM_NAME_LEN]);
    }

    #[test]
    fn join_key_normalizes_slashes() {
        assert_eq!(join_key("", "a.jpg"), "a.jpg");
        assert_eq!(join_key("media/", "a.jpg"), "media/a.jpg");
        assert_eq!(join_key("/media/out/", "/a.jpg"), "media/out/a.jpg");
    }

    #[tokio::test]
    async fn put_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();

        let mut data: &[u8] = b"hello media";
        let object = store.put("out/a.txt", "text/plain", &mut data).await.unwrap();
        assert_eq!(object.key, "out/a.txt");
        assert!(object.media_link.starts_with("file://"));

        let mut stored = store.open("out/a.txt").await.unwrap();
        assert_eq!(stored.content_type, "text/plain");
        let mut body = String::new();
        stored.reader.read_to_string(&mut body).await.unwrap();
        assert_eq!(body, "hello media");
    }

    #[tokio::test]
    async fn open_missing_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();
        let err = store.open("nope.jpg").await.unwrap_err();
        assert!(matches!(err, BackendError::NotFound { ref key } if key == "nope.jpg"));
    }

    #[tokio::test]
    async fn rejects_escaping_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();
        for key in ["../secret", "/etc/passwd", "", "a/../../b"] {
            let err = store.open(key).await.unwrap_err();
            assert!(matches!(err, BackendError::InvalidKey { .. }), "{key}");
        }
    }

    struct BrokenReader {
        sent: bool,
    }

    impl AsyncRead for BrokenReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            let this = self.get_mut();
            if this.sent {
                return Poll::Ready(Err(io::Error::other("connection reset")));
            }
            this.sent = true;
            buf.put_slice(b"half");
            Poll::Ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn failed_write_leaves_nothing_visible() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();

        let mut reader = BrokenReader { sent: false };
        let err = store.put("a.bin", "application/octet-stream", &mut reader).await;
        assert!(matches!(err, Err(BackendError::Io(_))));

        assert!(matches!(
            store.open("a.bin").await,
            Err(BackendError::NotFound { .. })
        ));
        assert!(!dir.path().join(".a.bin.partial").exists());
    }

    #[tokio::test]
    async fn failed_rename_removes_side_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();
        // A non-empty directory in the object's place makes the rename fail.
        std::fs::create_dir_all(dir.path().join("a.bin/occupied")).unwrap();

        let mut data: &[u8] = b"payload";
        let err = store.put("a.bin", "application/octet-stream", &mut data).await;
        assert!(matches!(err, Err(BackendError::Io(_))));
        assert!(!dir.path().join(".a.bin.partial").exists());
        assert!(!dir.path().join(".a.bin.content-type").exists());
    }

    #[tokio::test]
    async fn content_type_falls_back_to_extension() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("legacy.png"), b"png").unwrap();
        let store = FsObjectStore::new(dir.path()).unwrap();
        let stored = store.open("legacy.png").await.unwrap();
        assert_eq!(stored.content_type, "image/png");
    }
}
