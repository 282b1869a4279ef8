//! Logging init: `vidrange.log` in the configured or XDG state dir, or stderr.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

pub const DEFAULT_FILTER: &str = "info,vidrange=debug,vidrange_core=debug";
pub const LOG_FILE_NAME: &str = "vidrange.log";

/// Writer that is either the log file or stderr (used when the file handle can't be cloned).
enum LogWriter {
    File(fs::File),
    Stderr,
}

impl io::Write for LogWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            LogWriter::File(f) => f.write(buf),
            LogWriter::Stderr => io::stderr().lock().write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            LogWriter::File(f) => f.flush(),
            LogWriter::Stderr => io::stderr().lock().flush(),
        }
    }
}

struct LogFile(fs::File);

impl<'a> MakeWriter<'a> for LogFile {
    type Writer = LogWriter;

    fn make_writer(&'a self) -> Self::Writer {
        self.0
            .try_clone()
            .map(LogWriter::File)
            .unwrap_or(LogWriter::Stderr)
    }
}

/// Parse filter directives, e.g. `"warn,vidrange_core=trace"`.
pub fn parse_filter(directives: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(directives).with_context(|| format!("invalid log filter {:?}", directives))
}

/// `RUST_LOG` wins, then the configured filter, then [`DEFAULT_FILTER`].
fn env_filter(cfg: &LoggingConfig) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    cfg.filter
        .as_deref()
        .and_then(|f| parse_filter(f).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_FILTER))
}

/// Where the log file goes: `dir` from config, else the XDG state dir.
pub fn log_file_path(cfg: &LoggingConfig) -> Result<PathBuf> {
    let dir = match &cfg.dir {
        Some(dir) => dir.clone(),
        None => xdg::BaseDirectories::with_prefix("vidrange")?.get_state_home(),
    };
    Ok(dir.join(LOG_FILE_NAME))
}

/// Open (append) the log file, creating its directory.
fn open_log_file(path: &std::path::Path) -> Result<fs::File> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating log dir {}", dir.display()))?;
    }
    fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}

/// Initialize structured logging to the file from [`log_file_path`].
/// On failure (e.g. log dir unwritable), returns Err so the caller can fall back to stderr.
pub fn init_logging(cfg: &LoggingConfig) -> Result<PathBuf> {
    let path = log_file_path(cfg)?;
    let file = open_log_file(&path)?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(cfg))
        .with_writer(BoxMakeWriter::new(LogFile(file)))
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    tracing::info!("vidrange logging initialized at {}", path.display());
    Ok(path)
}

/// Initialize logging to stderr only. Used by `--log-stderr` and when
/// `init_logging()` fails, so the CLI doesn't crash.
pub fn init_logging_stderr(cfg: &LoggingConfig) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(cfg))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
