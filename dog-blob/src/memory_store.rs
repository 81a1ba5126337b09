use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::{
    BlobError, BlobResult, BlobStore, ByteRange, GetResult, ObjectHead, ResolvedRange,
    StoreCapabilities,
};

const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

#[derive(Debug, Clone)]
struct StoredObject {
    data: Bytes,
    content_type: Option<String>,
    filename: Option<String>,
}

/// In-memory store for testing and development
///
/// Objects are served in `chunk_size` pieces so streaming code paths behave
/// the same way they would against a real backend. Every stream returned by
/// `get` holds a read handle until it is finished or dropped; `open_handles`
/// exposes the count.
pub struct MemoryStore {
    objects: RwLock<HashMap<String, StoredObject>>,
    open_handles: Arc<AtomicUsize>,
    chunk_size: usize,
    supports_range: bool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            objects: RwLock::new(HashMap::new()),
            open_handles: Arc::new(AtomicUsize::new(0)),
            chunk_size: DEFAULT_CHUNK_SIZE,
            supports_range: true,
        }
    }

    /// Serve every read as the full object, like a backend without ranged GETs
    pub fn without_range_support(mut self) -> Self {
        self.supports_range = false;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    /// Store `data` under a freshly generated id and return the id
    pub fn upload(
        &self,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.insert(id.clone(), data, content_type, filename);
        id
    }

    /// Store `data` under a caller-chosen id, replacing any previous object
    pub fn insert(
        &self,
        id: impl Into<String>,
        data: impl Into<Bytes>,
        content_type: Option<&str>,
        filename: Option<&str>,
    ) {
        let object = StoredObject {
            data: data.into(),
            content_type: content_type.map(str::to_string),
            filename: filename.map(str::to_string),
        };
        self.objects.write().insert(id.into(), object);
    }

    pub fn remove(&self, id: &str) -> bool {
        self.objects.write().remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.objects.read().contains_key(id)
    }

    /// Number of streams handed out by `get` that are still alive
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    fn lookup(&self, id: &str) -> BlobResult<StoredObject> {
        self.objects
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| BlobError::not_found(id))
    }
}

/// Decrements the open-handle count when the owning stream goes away
struct ReadHandle(Arc<AtomicUsize>);

impl ReadHandle {
    fn open(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for ReadHandle {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn head(&self, id: &str) -> BlobResult<ObjectHead> {
        let object = self.lookup(id)?;
        Ok(ObjectHead {
            size_bytes: object.data.len() as u64,
            content_type: object.content_type,
            filename: object.filename,
        })
    }

    async fn get(&self, id: &str, range: Option<ByteRange>) -> BlobResult<GetResult> {
        let object = self.lookup(id)?;
        let total_size = object.data.len() as u64;

        let (body, resolved_range) = match range.filter(|_| self.supports_range) {
            Some(range) => {
                if !range.is_valid(total_size) {
                    return Err(BlobError::invalid(format!(
                        "Range {}-{} not satisfiable for {} bytes",
                        range.start, range.end, total_size
                    )));
                }
                let body = object.data.slice(range.start as usize..=range.end as usize);
                let resolved = ResolvedRange {
                    start: range.start,
                    end: range.end,
                    total_size,
                };
                (body, Some(resolved))
            }
            None => (object.data, None),
        };

        let handle = ReadHandle::open(&self.open_handles);
        let chunk_size = self.chunk_size;
        let stream = async_stream::stream! {
            let _handle = handle;
            let mut offset = 0;
            while offset < body.len() {
                let end = (offset + chunk_size).min(body.len());
                yield Ok::<Bytes, std::io::Error>(body.slice(offset..end));
                offset = end;
            }
        };

        Ok(GetResult {
            stream: Box::pin(stream),
            size_bytes: total_size,
            content_type: object.content_type,
            resolved_range,
        })
    }

    fn url(&self, id: &str) -> Option<String> {
        Some(format!("memory://{}", id))
    }

    fn capabilities(&self) -> StoreCapabilities {
        let caps = StoreCapabilities::basic();
        if self.supports_range {
            caps.with_range()
        } else {
            caps
        }
    }
}
