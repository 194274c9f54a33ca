//! Standalone worker entry point.
//!
//! Invoked by an external scheduler with a notebook path. Unlike the hook,
//! failures propagate to the process exit code.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::autosave::Autosaver;
use crate::config::AutosaveConfig;

/// Run one autosave pass for `file_path` with `config`.
pub async fn run(file_path: &Path, config: AutosaveConfig) -> Result<()> {
    let autosaver = Autosaver::new(config)?;
    run_with(file_path, &autosaver).await
}

/// Same as [`run`] with a prepared [`Autosaver`].
pub async fn run_with(file_path: &Path, autosaver: &Autosaver) -> Result<()> {
    info!(
        "Starting autosave for sandbox {}, file: {}",
        autosaver.config().sandbox_id,
        file_path.display()
    );

    autosaver.run(file_path).await?;

    info!("Autosave completed successfully");
    Ok(())
}
