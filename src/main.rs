use std::process::ExitCode;

use clap::Parser;
use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

use notebook_autosave::cli::Cli;
use notebook_autosave::{worker, AutosaveConfig};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Usage errors exit with status 2.
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match AutosaveConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            return ExitCode::from(1);
        }
    };

    match worker::run(&cli.file_path, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Autosave failed: {:#}", e);
            ExitCode::from(1)
        }
    }
}
