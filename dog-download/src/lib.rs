//! # dog-download: a mountable download endpoint for DogRS blob stores
//!
//! Serves stored files over HTTP through an Axum router:
//!
//! - **Stable URLs**: a file's URL is `<host>/<prefix>/<segment>`, where the
//!   segment is URL-safe base64 of its storage key and id only
//! - **Range requests**: single-range `Range` headers answer `206`, ranges
//!   past the end answer `416`
//! - **Uniform not-found**: unknown storage, missing object and malformed
//!   segments all answer the same `404 File Not Found`
//! - **Redirects**: optionally `302` to the store's native URL or to a
//!   computed location instead of streaming
//! - **Per-uploader endpoints**: each [`Uploader`] (and each one derived
//!   from it) gets its own endpoint and settings
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use dog_blob::{MemoryStore, UploadedFile};
//! use dog_download::{DownloadUrlExt, EndpointConfig, Uploader};
//!
//! # fn main() -> Result<(), dog_download::ConfigError> {
//! let store = Arc::new(MemoryStore::new());
//! let id = store.upload("content", Some("text/plain"), Some("content.txt"));
//!
//! let uploader = Uploader::new("attachments")
//!     .with_storage("store", store)
//!     .with_config(EndpointConfig::new().with_prefix("attachments"));
//!
//! let app: axum::Router = uploader.router()?;
//! let url = UploadedFile::new(id, "store").download_url(&uploader);
//! assert!(url.starts_with("/attachments/"));
//! # let _ = app;
//! # Ok(())
//! # }
//! ```

mod config;
mod disposition;
mod endpoint;
mod error;
pub mod identifier;
pub mod responder;
pub mod url;
mod uploader;

pub use config::{Disposition, EndpointConfig, Redirect, RedirectFn, DEFAULT_CACHE_CONTROL};
pub use disposition::content_disposition;
pub use endpoint::DownloadEndpoint;
pub use error::{ConfigError, DecodeError, DownloadError};
pub use identifier::ResolvedIdentity;
pub use uploader::{DownloadUrlExt, Uploader};
pub use url::UrlOptions;
