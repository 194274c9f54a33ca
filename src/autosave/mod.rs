//! The autosave sequence shared by the save hook and the worker.
//!
//! Order is fixed: heartbeat first, then (without persistent storage) the
//! notebook file, then the version-control folder.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::api::{ApiClient, ApiError, SaveFile};
use crate::archive::{Archiver, ScratchArchive, TarArchiver};
use crate::cli::paths::{absolutize, relative_to_cwd};
use crate::config::AutosaveConfig;
use crate::domain::{autosave_tags, GIT_TAG};


/// Runs autosave operations for one sandbox.
pub struct Autosaver {
    config: AutosaveConfig,
    client: ApiClient,
    archiver: Arc<dyn Archiver>,
}

impl Autosaver {
    /// Build an autosaver talking to the configured host, archiving with `tar`.
    pub fn new(config: AutosaveConfig) -> Result<Self> {
        let client = ApiClient::new(config.api_host())?;
        Ok(Self::from_parts(config, client, Arc::new(TarArchiver::new())))
    }

    /// Assemble from an existing client and archiver.
    pub fn from_parts(config: AutosaveConfig, client: ApiClient, archiver: Arc<dyn Archiver>) -> Self {
        Self {
            config,
            client,
            archiver,
        }
    }

    pub fn config(&self) -> &AutosaveConfig {
        &self.config
    }

    /// Report the heartbeat. Never fails.
    pub async fn update_activity(&self) {
        self.client.update_activity().await;
    }

    /// Upload `path` to storage tagged `autosave`, `sandbox-<id>` and `extra_tags`.
    pub async fn save_file(&self, path: &Path, extra_tags: &[&str]) -> Result<()> {
        info!("Attempting to save file {} to Storage", path.display());

        match self.submit(path, extra_tags).await {
            Ok(()) => {
                info!("Successfully saved file {} to Storage", path.display());
                Ok(())
            }
            Err(err) => {
                error!(
                    "Saving file {} to Storage {}: {:#}",
                    path.display(),
                    failure_wording(&err),
                    err
                );
                Err(err)
            }
        }
    }

    async fn submit(&self, path: &Path, extra_tags: &[&str]) -> Result<()> {
        let absolute = absolutize(path)?;
        let relative = relative_to_cwd(path)?;
        let file = SaveFile {
            source: relative.to_string_lossy().into_owned(),
            tags: autosave_tags(&self.config.sandbox_id, extra_tags),
        };

        self.client
            .save(
                &self.config.save_protocol,
                &absolute.to_string_lossy(),
                file,
            )
            .await
    }

    /// Archive `folder` and upload the archive tagged `git`.
    ///
    /// A missing folder is not an error. The archive is removed on every
    /// exit path.
    pub async fn save_folder(&self, folder: &Path) -> Result<()> {
        if !folder.exists() {
            return Ok(());
        }

        let archive = self
            .archiver
            .compress(folder)
            .await
            .with_context(|| format!("Failed to archive {}", folder.display()))?;
        let archive = ScratchArchive::new(archive);

        let result = self.save_file(archive.path(), &[GIT_TAG]).await;
        archive.remove();
        result
    }

    /// Full sequence for `notebook`: heartbeat, then file and folder saves
    /// unless the sandbox has persistent storage.
    pub async fn run(&self, notebook: &Path) -> Result<()> {
        self.update_activity().await;

        if self.config.has_persistent_storage {
            info!("Sandbox has persistent storage, skipping upload");
            return Ok(());
        }

        self.save_file(notebook, &[]).await?;
        self.save_folder(&self.config.git_folder).await?;
        Ok(())
    }
}

/// How a failed save is described in the log: server-side failures have
/// already been retried, anything else was refused outright.
fn failure_wording(err: &anyhow::Error) -> &'static str {
    match err.downcast_ref::<ApiError>() {
        Some(api_error) if api_error.is_server_error() => "failed after retries",
        Some(_) => "was rejected",
        None => "failed",
    }
}
