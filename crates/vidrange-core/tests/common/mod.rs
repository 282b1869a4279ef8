//! Shared fixtures for handler integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;
use vidrange_core::response::HandlerSettings;
use vidrange_core::server::build_router;
use vidrange_core::storage::{MemoryStore, ObjectMetadata};

pub const KEY: &str = "kobe.mp4";
pub const ROUTE: &str = "/api/video";
pub const ALLOWED: &str = "https://kobe.example";

/// Deterministic object body of `size` bytes.
pub fn body_of(size: usize) -> Vec<u8> {
    (0u8..=250).cycle().take(size).collect()
}

/// Memory store holding `data` under [`KEY`], served in `chunk`-byte chunks.
pub fn store_with(data: &[u8], chunk: usize) -> MemoryStore {
    let store = MemoryStore::new(chunk);
    let metadata = ObjectMetadata {
        content_type: Some("application/octet-stream".to_string()),
        content_language: Some("en".to_string()),
        ..Default::default()
    };
    store.insert(KEY, data.to_vec(), metadata);
    store
}

pub fn settings() -> HandlerSettings {
    HandlerSettings::for_key(KEY).with_allowed_origins([ALLOWED])
}

pub fn router(store: MemoryStore) -> Router {
    build_router(store, settings(), ROUTE)
}

/// GET [`ROUTE`] with the given headers.
pub async fn get(router: Router, headers: &[(&str, &str)]) -> Response<Body> {
    let mut req = Request::builder().uri(ROUTE);
    for (name, value) in headers {
        req = req.header(*name, *value);
    }
    router.oneshot(req.body(Body::empty()).unwrap()).await.unwrap()
}

pub async fn body_bytes(resp: Response<Body>) -> Vec<u8> {
    resp.into_body().collect().await.unwrap().to_bytes().to_vec()
}

/// Number of `Origin` tokens across all `Vary` values.
pub fn vary_origin_count<B>(resp: &Response<B>) -> usize {
    resp.headers()
        .get_all("vary")
        .iter()
        .flat_map(|v| v.to_str().unwrap().split(',').map(str::trim))
        .filter(|t| t.eq_ignore_ascii_case("origin"))
        .count()
}
