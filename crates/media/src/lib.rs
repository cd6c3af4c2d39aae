//! Media reference resolver: stores locally held bytes in an object store and
//! hands back a URL the gateway can fetch, and serves stored objects back.

pub mod error;
pub mod mime;
pub mod resolver;
pub mod store;

pub use {
    error::{Error, Result, StoreError},
    resolver::{DEFAULT_TIMEOUT_SECS, FetchedMedia, MediaConfig, MediaResolver, MediaUpload},
    store::{BackendError, FsObjectStore, MediaReader, ObjectStore, StoredObject, StoredReader},
};
