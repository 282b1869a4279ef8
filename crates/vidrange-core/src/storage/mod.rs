//! Object storage capability.
//!
//! The handler only needs `get(key)`: the object's size, its HTTP metadata,
//! and a lazy, single-pass body stream. Two backends are provided: a
//! directory on local disk and an in-memory map.

mod fs;
mod memory;

pub use fs::{metadata_path, FsStore, DEFAULT_CHUNK_SIZE, METADATA_SUFFIX};
pub use memory::MemoryStore;

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;

use axum::http::header::{
    CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_ENCODING, CONTENT_LANGUAGE, CONTENT_TYPE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use bytes::Bytes;
use futures::Stream;
use serde::{Deserialize, Serialize};

/// Lazy, finite, non-restartable body of a stored object.
pub type ByteStream = Pin<Box<dyn Stream<Item = io::Result<Bytes>> + Send + 'static>>;

/// Failure talking to the storage backend (a miss is `Ok(None)`, not an error).
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O error for {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid object key: {0:?}")]
    InvalidKey(String),
    #[error("invalid metadata for {key}: {message}")]
    Metadata { key: String, message: String },
}

/// HTTP metadata stored alongside an object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub content_language: Option<String>,
    #[serde(default)]
    pub content_disposition: Option<String>,
    #[serde(default)]
    pub content_encoding: Option<String>,
    #[serde(default)]
    pub cache_control: Option<String>,
}

impl ObjectMetadata {
    /// Writes every present field into `headers`, replacing existing values.
    /// Values that are not valid header text are skipped.
    pub fn write_http_metadata(&self, headers: &mut HeaderMap) {
        let fields: [(HeaderName, &Option<String>); 5] = [
            (CONTENT_TYPE, &self.content_type),
            (CONTENT_LANGUAGE, &self.content_language),
            (CONTENT_DISPOSITION, &self.content_disposition),
            (CONTENT_ENCODING, &self.content_encoding),
            (CACHE_CONTROL, &self.cache_control),
        ];
        for (name, value) in fields {
            let Some(value) = value else { continue };
            match HeaderValue::from_str(value) {
                Ok(v) => {
                    headers.insert(name, v);
                }
                Err(_) => tracing::warn!(header = %name, "skipping invalid metadata value"),
            }
        }
    }
}

/// An object returned by a store. `body` is `None` when the object exists
/// but has nothing readable.
pub struct StoredObject {
    pub key: String,
    pub size: u64,
    pub metadata: ObjectMetadata,
    pub body: Option<ByteStream>,
}

impl fmt::Debug for StoredObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoredObject")
            .field("key", &self.key)
            .field("size", &self.size)
            .field("metadata", &self.metadata)
            .field("has_body", &self.body.is_some())
            .finish()
    }
}

/// Read access to stored objects.
pub trait ObjectStore: Send + Sync + 'static {
    /// Looks up `key`. Returns `Ok(None)` on a miss. The body is not read.
    fn get(
        &self,
        key: &str,
    ) -> impl Future<Output = Result<Option<StoredObject>, StorageError>> + Send;
}

/// Rejects keys that are empty, absolute, or step outside the store root.
pub(crate) fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_written_into_headers() {
        let meta = ObjectMetadata {
            content_type: Some("application/octet-stream".into()),
            content_language: Some("en".into()),
            cache_control: Some("no-cache".into()),
            ..Default::default()
        };
        let mut headers = HeaderMap::new();
        meta.write_http_metadata(&mut headers);
        assert_eq!(headers[CONTENT_TYPE], "application/octet-stream");
        assert_eq!(headers[CONTENT_LANGUAGE], "en");
        assert_eq!(headers[CACHE_CONTROL], "no-cache");
        assert!(headers.get(CONTENT_ENCODING).is_none());
    }

    #[test]
    fn invalid_metadata_value_is_skipped() {
        let meta = ObjectMetadata {
            content_disposition: Some("inline\nbad".into()),
            ..Default::default()
        };
        let mut headers = HeaderMap::new();
        meta.write_http_metadata(&mut headers);
        assert!(headers.is_empty());
    }

    #[test]
    fn key_validation() {
        assert!(validate_key("kobe.mp4").is_ok());
        assert!(validate_key("videos/kobe.mp4").is_ok());
        assert!(validate_key("").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("../secret").is_err());
        assert!(validate_key("a//b").is_err());
        assert!(validate_key("a\\b").is_err());
    }
}
