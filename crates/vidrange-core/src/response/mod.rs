//! Response assembly for the range-streaming endpoint.
//!
//! Looks up the configured object, validates the `Range` header against its
//! size before any body byte is read, and builds a 200, 206 or error
//! response. CORS reflection and `Vary: Origin` are applied to every response.

mod cors;
mod error;

pub use cors::{merge_vary, CorsPolicy};
pub use error::ServeError;

use std::borrow::Cow;

use axum::body::Body;
use axum::http::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, ORIGIN, RANGE,
};
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use tracing::Instrument;

use crate::range::{parse_range, RangeRequest};
use crate::storage::{ObjectStore, StoredObject};
use crate::window::RangedStream;

/// Media type used when none is configured.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Cache policy used when none is configured.
pub const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Immutable per-server settings injected into the handler.
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub object_key: String,
    pub content_type: HeaderValue,
    pub cache_control: HeaderValue,
    pub cors: CorsPolicy,
}

impl HandlerSettings {
    /// Settings for `object_key` with the default media type, cache policy and
    /// an empty CORS allow-list.
    pub fn for_key(object_key: impl Into<String>) -> Self {
        Self {
            object_key: object_key.into(),
            content_type: HeaderValue::from_static(DEFAULT_CONTENT_TYPE),
            cache_control: HeaderValue::from_static(DEFAULT_CACHE_CONTROL),
            cors: CorsPolicy::default(),
        }
    }

    pub fn with_allowed_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors = CorsPolicy::new(origins);
        self
    }

    pub fn with_content_type(mut self, content_type: &str) -> anyhow::Result<Self> {
        self.content_type = HeaderValue::from_str(content_type)
            .map_err(|_| anyhow::anyhow!("invalid content type: {:?}", content_type))?;
        Ok(self)
    }

    pub fn with_cache_control(mut self, cache_control: &str) -> anyhow::Result<Self> {
        self.cache_control = HeaderValue::from_str(cache_control)
            .map_err(|_| anyhow::anyhow!("invalid cache control: {:?}", cache_control))?;
        Ok(self)
    }
}

/// Header value as text. Bytes outside visible ASCII become U+FFFD, so a
/// garbled `Range` fails to parse instead of reading as blank.
fn header_str<'a>(headers: &'a HeaderMap, name: &HeaderName) -> Option<Cow<'a, str>> {
    headers
        .get(name)
        .map(|v| match v.to_str() {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => String::from_utf8_lossy(v.as_bytes()),
        })
}

/// Serves the configured object for a request with `request_headers`.
pub async fn serve_object<S: ObjectStore>(
    store: &S,
    settings: &HandlerSettings,
    request_headers: &HeaderMap,
) -> Response {
    let origin = header_str(request_headers, &ORIGIN);
    let range = header_str(request_headers, &RANGE);
    let span = tracing::debug_span!(
        "serve_object",
        key = %settings.object_key,
        range = range.as_deref().unwrap_or("-")
    );

    let mut response = match assemble(store, settings, range.as_deref()).instrument(span).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                ServeError::InvalidRange(_) => tracing::debug!("rejecting range: {}", e),
                ServeError::NotFound { .. } => tracing::warn!("{}", e),
                _ => tracing::error!("{}", e),
            }
            e.into_response()
        }
    };

    settings.cors.apply(origin.as_deref(), response.headers_mut());
    tracing::debug!(status = %response.status(), "response ready");
    response
}

async fn assemble<S: ObjectStore>(
    store: &S,
    settings: &HandlerSettings,
    range: Option<&str>,
) -> Result<Response, ServeError> {
    let key = &settings.object_key;
    let StoredObject {
        size,
        metadata,
        body,
        ..
    } = store
        .get(key)
        .await?
        .ok_or_else(|| ServeError::NotFound { key: key.clone() })?;
    let body = body.ok_or_else(|| ServeError::EmptyBody { key: key.clone() })?;

    let request = parse_range(range, size)?;

    let mut headers = HeaderMap::new();
    metadata.write_http_metadata(&mut headers);
    headers.insert(CONTENT_TYPE, settings.content_type.clone());
    headers.insert(CACHE_CONTROL, settings.cache_control.clone());
    headers.insert(ACCEPT_RANGES, HeaderValue::from_static("bytes"));

    let response = match request {
        RangeRequest::Full => {
            tracing::debug!(size, "serving full object");
            headers.insert(CONTENT_LENGTH, HeaderValue::from(size));
            (StatusCode::OK, headers, Body::from_stream(body)).into_response()
        }
        RangeRequest::Partial(window) => {
            tracing::debug!(start = window.start, end = window.end, size, "serving range");
            headers.insert(CONTENT_RANGE, HeaderValue::try_from(window.content_range(size))?);
            headers.insert(CONTENT_LENGTH, HeaderValue::from(window.len()));
            let stream = RangedStream::new(body, window);
            (StatusCode::PARTIAL_CONTENT, headers, Body::from_stream(stream)).into_response()
        }
    };
    Ok(response)
}
