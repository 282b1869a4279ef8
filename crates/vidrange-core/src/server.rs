//! HTTP wiring: axum router and listener.
//!
//! One GET route serves the configured object; HEAD is answered by axum from
//! the same handler with the body dropped unread.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::config::VidrangeConfig;
use crate::response::{serve_object, HandlerSettings};
use crate::storage::{FsStore, ObjectStore};

/// Shared state for the video handler.
pub struct AppState<S> {
    pub store: Arc<S>,
    pub settings: Arc<HandlerSettings>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            settings: Arc::clone(&self.settings),
        }
    }
}

/// GET handler for the object route.
async fn video<S: ObjectStore>(State(state): State<AppState<S>>, headers: HeaderMap) -> Response {
    serve_object(state.store.as_ref(), &state.settings, &headers).await
}

/// Build the router serving `store`'s object at `route` (must start with `/`).
pub fn build_router<S: ObjectStore>(store: S, settings: HandlerSettings, route: &str) -> Router {
    let state = AppState {
        store: Arc::new(store),
        settings: Arc::new(settings),
    };
    Router::new()
        .route(route, get(video::<S>))
        .with_state(state)
}

/// Serve the configured object from the filesystem store until Ctrl-C.
pub async fn run(cfg: &VidrangeConfig) -> Result<()> {
    cfg.validate()?;
    let settings = cfg.handler_settings()?;
    let root = cfg.storage_root()?;
    let store = FsStore::new(&root, cfg.storage().chunk_size);
    let addr = cfg.socket_addr()?;

    if !root.join(&settings.object_key).exists() {
        tracing::warn!(
            key = %settings.object_key,
            root = %root.display(),
            "object not present yet; requests will get 404 until it is"
        );
    }

    let router = build_router(store, settings, &cfg.route);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    tracing::info!(%addr, route = %cfg.route, root = %root.display(), "vidrange serving");

    axum::serve(listener, router)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("failed to listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
            tracing::info!("shutdown signal received");
        })
        .await
        .context("server error")?;

    tracing::info!("vidrange stopped");
    Ok(())
}
