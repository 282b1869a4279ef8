use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::response::{HandlerSettings, DEFAULT_CACHE_CONTROL, DEFAULT_CONTENT_TYPE};
use crate::storage::DEFAULT_CHUNK_SIZE;

/// Filesystem storage parameters (optional `[storage]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding stored objects. Defaults to `~/.local/share/vidrange/objects`.
    #[serde(default)]
    pub root: Option<PathBuf>,
    /// Read size in bytes for body chunks.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Log output parameters (optional `[logging]` section in config.toml).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Directory for `vidrange.log`. Defaults to `~/.local/state/vidrange`.
    #[serde(default)]
    pub dir: Option<PathBuf>,
    /// `EnvFilter` directives used when `RUST_LOG` is unset.
    #[serde(default)]
    pub filter: Option<String>,
}

/// Global configuration loaded from `~/.config/vidrange/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VidrangeConfig {
    /// Listen address, e.g. `127.0.0.1:8080`.
    pub bind_addr: String,
    /// Route the object is served on. Must start with `/`.
    pub route: String,
    /// Storage key of the single served object.
    pub object_key: String,
    /// Media type sent for the object, overriding stored metadata.
    pub content_type: String,
    /// `Cache-Control` sent on successful responses.
    pub cache_control: String,
    /// Origins that get `Access-Control-Allow-Origin` reflected.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
    /// Optional storage section; if missing, built-in defaults are used.
    #[serde(default)]
    pub storage: Option<StorageConfig>,
    /// Optional logging section.
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

impl Default for VidrangeConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            route: "/api/video".to_string(),
            object_key: "kobe.mp4".to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            allowed_origins: Vec::new(),
            storage: None,
            logging: None,
        }
    }
}

impl VidrangeConfig {
    /// Checks fields that would otherwise fail at bind or route time.
    pub fn validate(&self) -> Result<()> {
        if !self.route.starts_with('/') {
            anyhow::bail!("route must start with '/': {:?}", self.route);
        }
        self.socket_addr()?;
        self.handler_settings()?;
        if let Some(filter) = self.logging.as_ref().and_then(|l| l.filter.as_deref()) {
            crate::logging::parse_filter(filter)?;
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr
            .parse()
            .with_context(|| format!("invalid bind_addr {:?}", self.bind_addr))
    }

    /// Handler settings derived from this config.
    pub fn handler_settings(&self) -> Result<HandlerSettings> {
        HandlerSettings::for_key(self.object_key.clone())
            .with_allowed_origins(self.allowed_origins.iter().cloned())
            .with_content_type(&self.content_type)?
            .with_cache_control(&self.cache_control)
    }

    pub fn storage(&self) -> StorageConfig {
        self.storage.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Object directory: the configured root, else the XDG data dir.
    pub fn storage_root(&self) -> Result<PathBuf> {
        if let Some(root) = self.storage.as_ref().and_then(|s| s.root.clone()) {
            return Ok(root);
        }
        let xdg_dirs = xdg::BaseDirectories::with_prefix("vidrange")?;
        Ok(xdg_dirs.get_data_home().join("objects"))
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("vidrange")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<VidrangeConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = VidrangeConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }

    load_from(&path)
}

/// Load configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<VidrangeConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let cfg: VidrangeConfig =
        toml::from_str(&data).with_context(|| format!("parsing config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}
