use std::sync::Arc;

use axum::Router;
use dog_blob::{BlobStore, StorageRegistry, UploadedFile};
use once_cell::sync::OnceCell;
use tracing::debug;

use crate::{url, ConfigError, DownloadEndpoint, EndpointConfig, UrlOptions};

/// An uploader: a set of named stores plus the download settings for files
/// kept in them.
///
/// Each uploader owns at most one [`DownloadEndpoint`], built on first use
/// from a snapshot of its config. [`Uploader::derive`] makes a child that
/// starts from copies of the parent's stores and config and gets its own
/// endpoint, so configuring the child never touches the parent or siblings.
pub struct Uploader {
    name: String,
    storages: Arc<StorageRegistry>,
    config: EndpointConfig,
    endpoint: OnceCell<Arc<DownloadEndpoint>>,
}

impl Uploader {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            storages: Arc::new(StorageRegistry::new()),
            config: EndpointConfig::default(),
            endpoint: OnceCell::new(),
        }
    }

    pub fn with_storage<K, S>(self, key: K, store: Arc<S>) -> Self
    where
        K: Into<String>,
        S: BlobStore + 'static,
    {
        self.storages.register(key, store);
        self
    }

    pub fn with_config(mut self, config: EndpointConfig) -> Self {
        self.configure(config);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Live registry; endpoints of this uploader see changes immediately
    pub fn storages(&self) -> &Arc<StorageRegistry> {
        &self.storages
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    /// Replace the download settings.
    ///
    /// The next `download_endpoint()` call builds a fresh endpoint; endpoints
    /// already handed out keep serving with the settings they were built with.
    pub fn configure(&mut self, config: EndpointConfig) {
        self.config = config;
        self.endpoint = OnceCell::new();
    }

    /// Child uploader with copied stores and config and no endpoint yet
    pub fn derive<S: Into<String>>(&self, name: S) -> Self {
        let name = name.into();
        debug!(parent = %self.name, child = %name, "deriving uploader");
        Self {
            name,
            storages: Arc::new(self.storages.snapshot()),
            config: self.config.clone(),
            endpoint: OnceCell::new(),
        }
    }

    /// This uploader's endpoint, built on first call and shared afterwards
    pub fn download_endpoint(&self) -> Result<Arc<DownloadEndpoint>, ConfigError> {
        self.endpoint
            .get_or_try_init(|| {
                DownloadEndpoint::new(self.config.clone(), Arc::clone(&self.storages)).map(Arc::new)
            })
            .cloned()
    }

    /// Endpoint routes nested under the configured prefix
    pub fn router(&self) -> Result<Router, ConfigError> {
        Ok(self.download_endpoint()?.mount())
    }

    pub fn download_url(&self, file: &UploadedFile, options: &UrlOptions) -> String {
        url::download_url(&self.config, file, options)
    }
}

impl std::fmt::Debug for Uploader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Uploader")
            .field("name", &self.name)
            .field("storages", &self.storages)
            .field("config", &self.config)
            .finish()
    }
}

/// Download links for anything that identifies an uploaded file
pub trait DownloadUrlExt {
    fn download_url(&self, uploader: &Uploader) -> String {
        self.download_url_with(uploader, &UrlOptions::default())
    }

    fn download_url_with(&self, uploader: &Uploader, options: &UrlOptions) -> String;
}

impl DownloadUrlExt for UploadedFile {
    fn download_url_with(&self, uploader: &Uploader, options: &UrlOptions) -> String {
        uploader.download_url(self, options)
    }
}
