use dog_blob::UploadedFile;

use crate::{identifier, EndpointConfig};

/// Per-call overrides for generated download URLs
#[derive(Debug, Clone, Default)]
pub struct UrlOptions {
    pub host: Option<String>,
    pub prefix: Option<String>,
}

impl UrlOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }
}

/// `<host>/<prefix>/<segment>`; host and prefix are both optional.
///
/// Depends on nothing but the four arguments, so a file's URL never changes
/// with its metadata.
pub fn build_url(storage_key: &str, id: &str, host: Option<&str>, prefix: Option<&str>) -> String {
    let mut url = String::new();
    if let Some(host) = host {
        url.push_str(host.trim_end_matches('/'));
    }
    if let Some(prefix) = prefix.map(|p| p.trim_matches('/')).filter(|p| !p.is_empty()) {
        url.push('/');
        url.push_str(prefix);
    }
    url.push('/');
    url.push_str(&identifier::encode(storage_key, id));
    url
}

/// URL of `file` under `config`, with `options` taking precedence
pub fn download_url(config: &EndpointConfig, file: &UploadedFile, options: &UrlOptions) -> String {
    let host = options.host.as_deref().or(config.host.as_deref());
    let prefix = options.prefix.as_deref().or(config.prefix.as_deref());
    build_url(file.storage_key(), file.id(), host, prefix)
}
