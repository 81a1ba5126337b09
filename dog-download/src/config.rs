use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::http::{request::Parts, HeaderValue};
use dog_blob::UploadedFile;

use crate::ConfigError;

pub const DEFAULT_CACHE_CONTROL: &str = "max-age=31536000";
pub const DEFAULT_OPEN_TIMEOUT: Duration = Duration::from_secs(30);

/// `Content-Disposition` mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Disposition {
    #[default]
    Inline,
    Attachment,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

impl FromStr for Disposition {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "inline" => Ok(Disposition::Inline),
            "attachment" => Ok(Disposition::Attachment),
            _ => Err(ConfigError::InvalidDisposition(s.to_string())),
        }
    }
}

/// Computes a redirect target from the requested file and the request
pub type RedirectFn = Arc<dyn Fn(&UploadedFile, &Parts) -> String + Send + Sync>;

/// What to do instead of streaming
#[derive(Clone, Default)]
pub enum Redirect {
    /// Stream the file through the endpoint
    #[default]
    None,
    /// 302 to the store's own URL for the object
    Native,
    /// 302 to whatever the function returns, e.g. a signed URL
    Custom(RedirectFn),
}

impl fmt::Debug for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::None => f.write_str("None"),
            Redirect::Native => f.write_str("Native"),
            Redirect::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Download endpoint configuration.
///
/// One snapshot per uploader; an endpoint keeps the snapshot it was built
/// with for its whole life.
#[derive(Debug, Clone)]
pub struct EndpointConfig {
    pub disposition: Disposition,
    pub redirect: Redirect,
    /// Prepended to generated URLs, e.g. `https://cdn.example.com`
    pub host: Option<String>,
    /// Mount path of the endpoint, e.g. `attachments`
    pub prefix: Option<String>,
    pub cache_control: String,
    /// Also accept the old `/<storage>/<id>` routes
    pub legacy_routes: bool,
    /// Upper bound for each storage call; `None` waits indefinitely
    pub open_timeout: Option<Duration>,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            disposition: Disposition::Inline,
            redirect: Redirect::None,
            host: None,
            prefix: None,
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            legacy_routes: true,
            open_timeout: Some(DEFAULT_OPEN_TIMEOUT),
        }
    }
}

impl EndpointConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_disposition(mut self, disposition: Disposition) -> Self {
        self.disposition = disposition;
        self
    }

    /// `true` redirects to the store's native URL, `false` streams
    pub fn with_redirect(mut self, redirect: bool) -> Self {
        self.redirect = if redirect { Redirect::Native } else { Redirect::None };
        self
    }

    /// Redirect to a computed location
    pub fn redirect_with<F>(mut self, f: F) -> Self
    where
        F: Fn(&UploadedFile, &Parts) -> String + Send + Sync + 'static,
    {
        self.redirect = Redirect::Custom(Arc::new(f));
        self
    }

    pub fn with_host<S: Into<String>>(mut self, host: S) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn with_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn with_cache_control<S: Into<String>>(mut self, cache_control: S) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    pub fn without_legacy_routes(mut self) -> Self {
        self.legacy_routes = false;
        self
    }

    pub fn with_open_timeout(mut self, timeout: Duration) -> Self {
        self.open_timeout = Some(timeout);
        self
    }

    pub fn without_open_timeout(mut self) -> Self {
        self.open_timeout = None;
        self
    }

    /// Load from environment variables, e.g. with prefix `DOG_DOWNLOAD__`:
    ///
    /// ```bash
    /// export DOG_DOWNLOAD__DISPOSITION=attachment
    /// export DOG_DOWNLOAD__REDIRECT=false
    /// export DOG_DOWNLOAD__HOST=https://cdn.example.com
    /// export DOG_DOWNLOAD__PREFIX=attachments
    /// export DOG_DOWNLOAD__CACHE_CONTROL="public, max-age=3600"
    /// export DOG_DOWNLOAD__LEGACY_ROUTES=true
    /// export DOG_DOWNLOAD__OPEN_TIMEOUT_SECS=10
    /// ```
    ///
    /// Unset variables keep their defaults; a set but invalid one is an error.
    pub fn from_env(prefix: &str) -> Result<Self, ConfigError> {
        let var = |name: &str| std::env::var(format!("{}{}", prefix, name)).ok();
        let mut config = Self::default();

        if let Some(value) = var("DISPOSITION") {
            config.disposition = value.parse()?;
        }
        if let Some(value) = var("REDIRECT") {
            let redirect = value
                .trim()
                .parse::<bool>()
                .map_err(|_| ConfigError::InvalidRedirect(value.clone()))?;
            config = config.with_redirect(redirect);
        }
        if let Some(value) = var("HOST") {
            config.host = Some(value);
        }
        if let Some(value) = var("PREFIX") {
            config.prefix = Some(value);
        }
        if let Some(value) = var("CACHE_CONTROL") {
            config.cache_control = value;
        }
        if let Some(value) = var("LEGACY_ROUTES") {
            config.legacy_routes = parse_env(prefix, "LEGACY_ROUTES", &value)?;
        }
        if let Some(value) = var("OPEN_TIMEOUT_SECS") {
            let secs: u64 = parse_env(prefix, "OPEN_TIMEOUT_SECS", &value)?;
            config.open_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }

        config.validate()?;
        Ok(config)
    }

    /// Check everything that would otherwise fail at request time
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(host) = &self.host {
            if host.is_empty() || !is_url_safe(host) || host.contains(['?', '#']) {
                return Err(ConfigError::InvalidHost(host.clone()));
            }
        }
        if let Some(prefix) = &self.prefix {
            if !is_url_safe(prefix) || prefix.contains(['?', '#', ':', '{', '}']) {
                return Err(ConfigError::InvalidPrefix(prefix.clone()));
            }
        }
        self.cache_control_header()?;
        Ok(())
    }

    pub(crate) fn cache_control_header(&self) -> Result<HeaderValue, ConfigError> {
        HeaderValue::from_str(&self.cache_control)
            .map_err(|_| ConfigError::InvalidCacheControl(self.cache_control.clone()))
    }
}

fn is_url_safe(value: &str) -> bool {
    value.chars().all(|c| c.is_ascii_graphic())
}

fn parse_env<T: FromStr>(prefix: &str, name: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: format!("{}{}", prefix, name),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = EndpointConfig::default();
        assert_eq!(config.disposition, Disposition::Inline);
        assert!(matches!(config.redirect, Redirect::None));
        assert_eq!(config.cache_control, "max-age=31536000");
        assert!(config.legacy_routes);
        assert_eq!(config.open_timeout, Some(DEFAULT_OPEN_TIMEOUT));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn disposition_parses_case_insensitively() {
        assert_eq!("Attachment".parse::<Disposition>(), Ok(Disposition::Attachment));
        assert_eq!(
            "download".parse::<Disposition>(),
            Err(ConfigError::InvalidDisposition("download".to_string()))
        );
    }

    #[test]
    fn rejects_bad_host_and_prefix() {
        let config = EndpointConfig::new().with_host("http://exa mple.com");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidHost(_))));

        let config = EndpointConfig::new().with_prefix("files?x=1");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidPrefix(_))));
    }

    #[test]
    fn rejects_bad_cache_control() {
        let config = EndpointConfig::new().with_cache_control("max-age=1\n");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCacheControl(_))
        ));
    }

    #[test]
    fn from_env_reads_prefixed_variables() {
        let prefix = "DOG_DOWNLOAD_TEST_READ__";
        std::env::set_var(format!("{prefix}DISPOSITION"), "attachment");
        std::env::set_var(format!("{prefix}REDIRECT"), "true");
        std::env::set_var(format!("{prefix}PREFIX"), "attachments");
        std::env::set_var(format!("{prefix}OPEN_TIMEOUT_SECS"), "0");

        let config = EndpointConfig::from_env(prefix).unwrap();
        assert_eq!(config.disposition, Disposition::Attachment);
        assert!(matches!(config.redirect, Redirect::Native));
        assert_eq!(config.prefix.as_deref(), Some("attachments"));
        assert_eq!(config.open_timeout, None);
        assert_eq!(config.host, None);
    }

    #[test]
    fn from_env_rejects_invalid_redirect() {
        let prefix = "DOG_DOWNLOAD_TEST_REDIRECT__";
        std::env::set_var(format!("{prefix}REDIRECT"), "sometimes");

        assert_eq!(
            EndpointConfig::from_env(prefix).unwrap_err(),
            ConfigError::InvalidRedirect("sometimes".to_string())
        );
    }

    #[test]
    fn from_env_rejects_invalid_timeout() {
        let prefix = "DOG_DOWNLOAD_TEST_TIMEOUT__";
        std::env::set_var(format!("{prefix}OPEN_TIMEOUT_SECS"), "soon");

        assert!(matches!(
            EndpointConfig::from_env(prefix),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
