//! In-memory object store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use bytes::Bytes;
use futures::{stream, StreamExt};

use super::{validate_key, ObjectMetadata, ObjectStore, StorageError, StoredObject};

struct MemoryObject {
    data: Bytes,
    metadata: ObjectMetadata,
    readable: bool,
}

/// Objects held in memory, served in fixed-size chunks.
///
/// Counts body chunks handed out across all requests, so callers can verify
/// that a request did not read the body.
#[derive(Clone)]
pub struct MemoryStore {
    objects: Arc<RwLock<HashMap<String, MemoryObject>>>,
    chunk_size: usize,
    chunks_pulled: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Creates an empty store. `chunk_size` of 0 is treated as 1.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            objects: Arc::default(),
            chunk_size: chunk_size.max(1),
            chunks_pulled: Arc::default(),
        }
    }

    /// Stores `data` under `key`, replacing any previous object.
    pub fn insert(&self, key: &str, data: impl Into<Bytes>, metadata: ObjectMetadata) {
        self.put(key, data.into(), metadata, true);
    }

    /// Stores an object that exists but yields no readable body.
    pub fn insert_unreadable(&self, key: &str, size: u64) {
        let data = Bytes::from(vec![0u8; size as usize]);
        self.put(key, data, ObjectMetadata::default(), false);
    }

    fn put(&self, key: &str, data: Bytes, metadata: ObjectMetadata, readable: bool) {
        let mut objects = self.objects.write().unwrap_or_else(|e| e.into_inner());
        objects.insert(
            key.to_string(),
            MemoryObject {
                data,
                metadata,
                readable,
            },
        );
    }

    /// Total body chunks yielded to readers so far.
    pub fn chunks_pulled(&self) -> u64 {
        self.chunks_pulled.load(Ordering::Relaxed)
    }
}

impl ObjectStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<StoredObject>, StorageError> {
        validate_key(key)?;
        let objects = self.objects.read().unwrap_or_else(|e| e.into_inner());
        let Some(obj) = objects.get(key) else {
            return Ok(None);
        };

        let body = obj.readable.then(|| {
            let data = obj.data.clone();
            let chunk_size = self.chunk_size;
            let offsets = (0..data.len()).step_by(chunk_size);
            let counter = Arc::clone(&self.chunks_pulled);
            stream::iter(offsets)
                .map(move |off| {
                    counter.fetch_add(1, Ordering::Relaxed);
                    Ok::<_, std::io::Error>(data.slice(off..(off + chunk_size).min(data.len())))
                })
                .boxed()
        });

        Ok(Some(StoredObject {
            key: key.to_string(),
            size: obj.data.len() as u64,
            metadata: obj.metadata.clone(),
            body,
        }))
    }
}
