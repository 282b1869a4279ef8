//! CLI for the vidrange range-streaming server.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use vidrange_core::config::LoggingConfig;
use vidrange_core::logging;

use commands::{load_serve_config, run_check_range, run_config_path, run_serve, ServeOverrides};

/// Top-level CLI for vidrange.
#[derive(Debug, Parser)]
#[command(name = "vidrange")]
#[command(about = "vidrange: HTTP range streaming for a stored video", long_about = None)]
pub struct Cli {
    /// Log to stderr instead of the log file under the XDG state dir.
    #[arg(long, global = true)]
    pub log_stderr: bool,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Serve the configured object over HTTP until Ctrl-C.
    Serve {
        /// Config file to use instead of ~/.config/vidrange/config.toml.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
        /// Listen address, overriding `bind_addr`.
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
        /// Object directory, overriding `[storage] root`.
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
    },

    /// Show how a Range header resolves against an object size (no I/O).
    CheckRange {
        /// Raw Range header value, e.g. "bytes=0-99".
        header: String,
        /// Object size in bytes.
        #[arg(long)]
        size: u64,
    },

    /// Print the config file path.
    ConfigPath,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Serve { config, bind, root } => {
                let cfg = load_serve_config(ServeOverrides { config, bind, root })?;
                init_logging(cli.log_stderr, &cfg.logging());
                run_serve(&cfg).await?
            }
            CliCommand::CheckRange { header, size } => {
                init_logging(cli.log_stderr, &LoggingConfig::default());
                run_check_range(&header, size)
            }
            CliCommand::ConfigPath => {
                init_logging(cli.log_stderr, &LoggingConfig::default());
                run_config_path()?
            }
        }

        Ok(())
    }
}

fn init_logging(stderr: bool, cfg: &LoggingConfig) {
    if stderr {
        logging::init_logging_stderr(cfg);
        return;
    }
    if let Err(e) = logging::init_logging(cfg) {
        logging::init_logging_stderr(cfg);
        tracing::warn!("file logging unavailable, using stderr: {:#}", e);
    }
}

#[cfg(test)]
mod tests;
