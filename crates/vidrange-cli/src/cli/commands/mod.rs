//! CLI command handlers, one per file.

mod check_range;
mod config_path;
mod serve;

pub use check_range::run_check_range;
pub use config_path::run_config_path;
pub use serve::{load_serve_config, run_serve, ServeOverrides};
