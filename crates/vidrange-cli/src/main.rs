mod cli;

use crate::cli::CliCommand;

#[tokio::main]
async fn main() {
    // Parse CLI, initialize logging, and dispatch.
    if let Err(err) = CliCommand::run_from_args().await {
        eprintln!("vidrange error: {:#}", err);
        std::process::exit(1);
    }
}
