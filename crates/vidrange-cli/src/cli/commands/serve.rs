//! `vidrange serve` – run the HTTP server.

use anyhow::Result;
use std::path::PathBuf;
use vidrange_core::config::{self, StorageConfig, VidrangeConfig};
use vidrange_core::server;

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct ServeOverrides {
    pub config: Option<PathBuf>,
    pub bind: Option<String>,
    pub root: Option<PathBuf>,
}

impl ServeOverrides {
    pub fn apply(self, cfg: &mut VidrangeConfig) {
        if let Some(bind) = self.bind {
            cfg.bind_addr = bind;
        }
        if let Some(root) = self.root {
            cfg.storage.get_or_insert_with(StorageConfig::default).root = Some(root);
        }
    }
}

/// Config file (explicit or XDG default) with command-line overrides applied.
/// Loaded before logging starts so `[logging]` can pick the log destination.
pub fn load_serve_config(mut overrides: ServeOverrides) -> Result<VidrangeConfig> {
    let mut cfg = match overrides.config.take() {
        Some(path) => config::load_from(&path)?,
        None => config::load_or_init()?,
    };
    overrides.apply(&mut cfg);
    Ok(cfg)
}

pub async fn run_serve(cfg: &VidrangeConfig) -> Result<()> {
    tracing::debug!("loaded config: {:?}", cfg);
    server::run(cfg).await
}
