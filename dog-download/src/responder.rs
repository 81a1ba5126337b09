use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use dog_blob::{ByteStream, ObjectHead, RangeSpec};

use crate::{disposition::content_disposition, Disposition, DownloadError};

pub const NOT_FOUND_BODY: &str = "File Not Found";

const OCTET_STREAM: &str = "application/octet-stream";

/// The one response for every not-found cause
pub fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        [(header::CONTENT_TYPE, "text/plain")],
        NOT_FOUND_BODY,
    )
        .into_response()
}

pub fn redirect(location: &str) -> Result<Response, DownloadError> {
    let location = HeaderValue::from_str(location)
        .map_err(|_| DownloadError::InvalidRedirect(location.to_string()))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}

pub fn range_not_satisfiable(total: u64) -> Result<Response, DownloadError> {
    let content_range = HeaderValue::try_from(format!("bytes */{}", total))?;
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::RANGE_NOT_SATISFIABLE;
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_RANGE, content_range);
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));
    Ok(response)
}

/// Headers that come from endpoint configuration rather than the object
#[derive(Debug, Clone)]
pub struct ContentPolicy<'a> {
    pub disposition: Disposition,
    pub cache_control: &'a HeaderValue,
}

/// 200 for `RangeSpec::Full`, 206 for `RangeSpec::Partial`.
///
/// `body` must already be narrowed to `spec`; it is streamed as-is.
pub fn content(
    head: &ObjectHead,
    filename: &str,
    spec: RangeSpec,
    body: ByteStream,
    policy: &ContentPolicy<'_>,
) -> Result<Response, DownloadError> {
    let total = head.size_bytes;
    let content_range = match spec {
        RangeSpec::Partial { start, end } => Some(HeaderValue::try_from(format!(
            "bytes {}-{}/{}",
            start, end, total
        ))?),
        RangeSpec::Full => None,
    };

    let mut response = Response::new(Body::from_stream(body));
    let headers = response.headers_mut();

    headers.insert(
        header::CONTENT_LENGTH,
        HeaderValue::from(spec.content_length(total)),
    );
    headers.insert(
        header::CONTENT_TYPE,
        head.content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
            .unwrap_or_else(|| HeaderValue::from_static(OCTET_STREAM)),
    );
    headers.insert(
        header::CONTENT_DISPOSITION,
        HeaderValue::from_str(&content_disposition(policy.disposition, filename))
            .unwrap_or_else(|_| HeaderValue::from_static(policy.disposition.as_str())),
    );
    headers.insert(header::CACHE_CONTROL, policy.cache_control.clone());
    headers.insert(header::ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    if let Some(content_range) = content_range {
        headers.insert(header::CONTENT_RANGE, content_range);
        *response.status_mut() = StatusCode::PARTIAL_CONTENT;
    }

    Ok(response)
}
