//! # dog-blob: storage-side building blocks for serving uploaded files
//!
//! `dog-blob` holds everything a download path needs from storage, with no
//! HTTP coupling:
//!
//! - **Pluggable stores**: the [`BlobStore`] trait (head, streaming get with
//!   optional byte ranges, native URLs)
//! - **Storage registry**: [`StorageRegistry`] maps storage keys to stores and
//!   is re-checked on every lookup
//! - **Uploaded-file descriptors**: [`UploadedFile`] carries id, storage key
//!   and metadata
//! - **Range resolution**: [`range::resolve`] turns a `Range` header into a
//!   single concrete interval
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dog_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = Arc::new(MemoryStore::new());
//! let id = store.upload("content", Some("text/plain"), Some("content.txt"));
//!
//! let storages = StorageRegistry::new();
//! storages.register("store", store);
//!
//! let backend = storages.resolve("store")?;
//! let head = backend.head(&id).await?;
//! let spec = dog_blob::range::resolve(Some("bytes=2-4"), head.size_bytes);
//! assert_eq!(spec, Ok(RangeSpec::Partial { start: 2, end: 4 }));
//! # Ok(())
//! # }
//! ```

mod error;
mod memory_store;
pub mod range;
mod registry;
pub mod store;
mod types;
mod uploaded_file;

// Re-export main types for clean API
pub use error::{BlobError, BlobResult};
pub use memory_store::MemoryStore;
pub use range::{RangeError, RangeSpec};
pub use registry::StorageRegistry;
pub use store::{BlobStore, GetResult, ObjectHead, ResolvedRange, StoreCapabilities};
pub use types::{slice_stream, ByteRange, ByteStream};
pub use uploaded_file::UploadedFile;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobError, BlobResult, BlobStore, ByteRange, ByteStream, MemoryStore, RangeSpec,
        StorageRegistry, UploadedFile,
    };
}
