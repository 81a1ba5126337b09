use async_trait::async_trait;
use crate::{BlobResult, ByteRange, ByteStream};

/// Read-side blob storage operations - must be implemented by all storage backends
///
/// Writing is the uploader's business; a download only needs to look an
/// object up, stream it (optionally a byte range of it) and, for stores that
/// are reachable directly, hand out a native URL.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Get blob metadata without content
    async fn head(&self, id: &str) -> BlobResult<ObjectHead>;

    /// Get a blob as a stream, optionally with range support.
    ///
    /// Stores that don't advertise `supports_range` may ignore `range` and
    /// return the whole object with `resolved_range: None`.
    async fn get(&self, id: &str, range: Option<ByteRange>) -> BlobResult<GetResult>;

    /// Direct URL of the object in the backend's own scheme, if it has one
    fn url(&self, _id: &str) -> Option<String> {
        None
    }

    /// Get store capabilities
    fn capabilities(&self) -> StoreCapabilities;
}

/// Result of a get operation
pub struct GetResult {
    pub stream: ByteStream,
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub resolved_range: Option<ResolvedRange>,
}

impl std::fmt::Debug for GetResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetResult")
            .field("size_bytes", &self.size_bytes)
            .field("content_type", &self.content_type)
            .field("resolved_range", &self.resolved_range)
            .finish_non_exhaustive()
    }
}

/// Metadata about a blob
#[derive(Debug, Clone, Default)]
pub struct ObjectHead {
    pub size_bytes: u64,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

/// Resolved range information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedRange {
    pub start: u64,
    pub end: u64,
    pub total_size: u64,
}

/// Store capabilities
#[derive(Debug, Clone, Default)]
pub struct StoreCapabilities {
    pub supports_range: bool,
}

impl StoreCapabilities {
    pub fn basic() -> Self {
        Self {
            supports_range: false,
        }
    }

    pub fn with_range(mut self) -> Self {
        self.supports_range = true;
        self
    }
}
