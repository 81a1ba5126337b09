use std::future::Future;
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::{header, request::Parts, HeaderValue},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use dog_blob::{
    range, slice_stream, BlobResult, BlobStore, ByteRange, ByteStream, RangeError, RangeSpec,
    StorageRegistry, UploadedFile,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use crate::{
    identifier::{self, ResolvedIdentity},
    responder::{self, ContentPolicy},
    ConfigError, DownloadError, EndpointConfig, Redirect,
};

/// Serves files of one uploader's stores over HTTP.
///
/// Holds the uploader's storage registry (not individual stores) and an
/// immutable config snapshot. Routes:
///
/// - `GET /{segment}` where `segment` comes from [`identifier::encode`]
/// - `GET /{storage}/{id}` when `legacy_routes` is on
pub struct DownloadEndpoint {
    config: EndpointConfig,
    storages: Arc<StorageRegistry>,
    cache_control: HeaderValue,
}

impl DownloadEndpoint {
    pub fn new(config: EndpointConfig, storages: Arc<StorageRegistry>) -> Result<Self, ConfigError> {
        config.validate()?;
        let cache_control = config.cache_control_header()?;

        info!(
            disposition = config.disposition.as_str(),
            redirect = ?config.redirect,
            legacy_routes = config.legacy_routes,
            "download endpoint configured"
        );

        Ok(Self {
            config,
            storages,
            cache_control,
        })
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn storages(&self) -> &Arc<StorageRegistry> {
        &self.storages
    }

    /// Routes relative to wherever the router gets nested
    pub fn router(self: &Arc<Self>) -> Router {
        let mut router = Router::new().route("/{segment}", get(serve_encoded));
        if self.config.legacy_routes {
            router = router.route("/{storage}/{id}", get(serve_legacy));
        }
        router.fallback(fallback).with_state(Arc::clone(self))
    }

    /// `router()` nested under the configured prefix
    pub fn mount(self: &Arc<Self>) -> Router {
        match self.config.prefix.as_deref().map(|p| p.trim_matches('/')) {
            Some(prefix) if !prefix.is_empty() => {
                Router::new().nest(&format!("/{}", prefix), self.router())
            }
            _ => self.router(),
        }
    }

    /// `mount()` with request/response tracing
    pub fn mount_with_tracing(self: &Arc<Self>) -> Router {
        self.mount().layer(TraceLayer::new_for_http())
    }

    /// Answer a request for `identity`.
    ///
    /// Missing storage and missing object come back as errors, which render
    /// as the uniform 404. An unsatisfiable range is an `Ok` 416.
    #[instrument(
        skip(self, identity, request),
        fields(storage = %identity.storage_key, id = %identity.id)
    )]
    pub async fn serve(
        &self,
        identity: ResolvedIdentity,
        request: &Parts,
    ) -> Result<Response, DownloadError> {
        let store = self.storages.resolve(&identity.storage_key)?;
        let file = UploadedFile::new(identity.id, identity.storage_key);

        match &self.config.redirect {
            Redirect::None => {}
            Redirect::Native => match store.url(file.id()) {
                Some(location) => return responder::redirect(&location),
                None => warn!("store has no native url, streaming instead"),
            },
            Redirect::Custom(location_for) => {
                return responder::redirect(&location_for(&file, request));
            }
        }

        let head = self.bounded(store.head(file.id())).await?;

        let range_header = request
            .headers
            .get(header::RANGE)
            .and_then(|value| value.to_str().ok());
        let spec = match range::resolve(range_header, head.size_bytes) {
            Ok(spec) => spec,
            Err(RangeError::Unsatisfiable { total }) => {
                debug!(total, range = ?range_header, "range not satisfiable");
                return responder::range_not_satisfiable(total);
            }
        };

        let body = self
            .open(store.as_ref(), file.id(), spec, head.size_bytes)
            .await?;
        let filename = head.filename.as_deref().unwrap_or(file.id());
        let policy = ContentPolicy {
            disposition: self.config.disposition,
            cache_control: &self.cache_control,
        };

        debug!(size = head.size_bytes, partial = spec.is_partial(), "streaming file");
        responder::content(&head, filename, spec, body, &policy)
    }

    /// Body stream for `spec`, sliced here when the store can't do ranges.
    ///
    /// Headers are computed from `head`, so an object whose size changed
    /// since then is refused rather than streamed under the wrong length.
    async fn open(
        &self,
        store: &dyn BlobStore,
        id: &str,
        spec: RangeSpec,
        expected_size: u64,
    ) -> Result<ByteStream, DownloadError> {
        let range = match spec {
            RangeSpec::Partial { start, end } if store.capabilities().supports_range => {
                Some(ByteRange::inclusive(start, end))
            }
            _ => None,
        };
        let result = self.bounded(store.get(id, range)).await?;

        if result.size_bytes != expected_size {
            return Err(DownloadError::Changed {
                expected: expected_size,
                actual: result.size_bytes,
            });
        }

        let RangeSpec::Partial { start, end } = spec else {
            return Ok(result.stream);
        };
        match result.resolved_range {
            Some(_) => Ok(result.stream),
            None => Ok(slice_stream(result.stream, start, end - start + 1)),
        }
    }

    async fn bounded<T, F>(&self, op: F) -> Result<T, DownloadError>
    where
        F: Future<Output = BlobResult<T>>,
    {
        match self.config.open_timeout {
            Some(limit) => tokio::time::timeout(limit, op)
                .await
                .map_err(|_| DownloadError::Timeout(limit))?
                .map_err(DownloadError::from),
            None => op.await.map_err(DownloadError::from),
        }
    }
}

impl std::fmt::Debug for DownloadEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadEndpoint")
            .field("config", &self.config)
            .field("storages", &self.storages)
            .finish()
    }
}

async fn serve_encoded(
    State(endpoint): State<Arc<DownloadEndpoint>>,
    Path(segment): Path<String>,
    request: Request,
) -> Response {
    let (parts, _body) = request.into_parts();
    let result = match identifier::decode(&segment) {
        Ok(identity) => endpoint.serve(identity, &parts).await,
        Err(e) => Err(e.into()),
    };
    result.unwrap_or_else(IntoResponse::into_response)
}

async fn serve_legacy(
    State(endpoint): State<Arc<DownloadEndpoint>>,
    Path((storage, id)): Path<(String, String)>,
    request: Request,
) -> Response {
    let (parts, _body) = request.into_parts();
    let result = match identifier::decode_legacy(&storage, &id) {
        Ok(identity) => endpoint.serve(identity, &parts).await,
        Err(e) => Err(e.into()),
    };
    result.unwrap_or_else(IntoResponse::into_response)
}

async fn fallback() -> Response {
    responder::not_found()
}
