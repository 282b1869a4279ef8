//! Directory-backed object store.
//!
//! Keys map to files under a root directory. Optional HTTP metadata lives in
//! a sidecar `<file>.meta.toml` next to the object.

use std::io;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio_util::io::ReaderStream;

use super::{validate_key, ObjectMetadata, ObjectStore, StorageError, StoredObject};

/// Default read size for body chunks.
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Suffix of the optional metadata sidecar file.
pub const METADATA_SUFFIX: &str = ".meta.toml";

/// Serves objects from files under `root`.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
    chunk_size: usize,
}

impl FsStore {
    /// Creates a store rooted at `root`. `chunk_size` of 0 uses [`DEFAULT_CHUNK_SIZE`].
    pub fn new(root: impl Into<PathBuf>, chunk_size: usize) -> Self {
        let chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        Self {
            root: root.into(),
            chunk_size,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

/// Sidecar path: appends `.meta.toml` to the object path.
pub fn metadata_path(object_path: &Path) -> PathBuf {
    let mut o = object_path.as_os_str().to_owned();
    o.push(METADATA_SUFFIX);
    PathBuf::from(o)
}

fn io_error(key: &str, source: io::Error) -> StorageError {
    StorageError::Io {
        key: key.to_string(),
        source,
    }
}

async fn read_sidecar(key: &str, object_path: &Path) -> Result<ObjectMetadata, StorageError> {
    let path = metadata_path(object_path);
    let data = match tokio::fs::read_to_string(&path).await {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ObjectMetadata::default()),
        Err(e) => return Err(io_error(key, e)),
    };
    toml::from_str(&data).map_err(|e| StorageError::Metadata {
        key: key.to_string(),
        message: e.to_string(),
    })
}

/// Media type from the file extension, for the common video containers.
fn guess_content_type(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "ogv" => "video/ogg",
        "ts" => "video/mp2t",
        _ => return None,
    };
    Some(mime)
}

impl ObjectStore for FsStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        validate_key(key)?;
        let path = self.root.join(key);

        let file = match tokio::fs::File::open(&path).await {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_error(key, e)),
        };
        let file_meta = file.metadata().await.map_err(|e| io_error(key, e))?;

        let mut metadata = read_sidecar(key, &path).await?;
        if metadata.content_type.is_none() {
            metadata.content_type = guess_content_type(&path).map(str::to_string);
        }

        if !file_meta.is_file() {
            tracing::debug!(key, path = %path.display(), "object path is not a regular file");
            return Ok(Some(StoredObject {
                key: key.to_string(),
                size: 0,
                metadata,
                body: None,
            }));
        }

        let body = ReaderStream::with_capacity(file, self.chunk_size).boxed();
        Ok(Some(StoredObject {
            key: key.to_string(),
            size: file_meta.len(),
            metadata,
            body: Some(body),
        }))
    }
}
