use clap::Parser;
use std::path::PathBuf;

/// Autosave worker for notebook sandboxes
///
/// Reads SANDBOX_ID, DATA_LOADER_API_URL and HAS_PERSISTENT_STORAGE from the
/// environment.
#[derive(Parser, Debug)]
#[command(name = "autosave-worker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the notebook file to save
    #[arg(long)]
    pub file_path: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
