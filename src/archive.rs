//! Folder archiving for version-control uploads.
//!
//! The rest of the crate only sees [`Archiver`]: folder in, archive path out.
//! [`TarArchiver`] shells out to `tar` and checks both its exit status and
//! that the archive actually landed on disk.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::cli::paths::absolutize;

/// Archive file name, created next to the archived folder.
pub const ARCHIVE_FILE_NAME: &str = "git_backup.tar.gz";

/// Upper bound on a single `tar` run.
pub const DEFAULT_ARCHIVE_TIMEOUT: Duration = Duration::from_secs(600);

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid folder path: {}", .0.display())]
    InvalidPath(PathBuf),

    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("archiving {} timed out after {timeout:?}", .folder.display())]
    TimedOut { folder: PathBuf, timeout: Duration },

    #[error("archiving {} failed with {status}: {stderr}", .folder.display())]
    CommandFailed {
        folder: PathBuf,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("folder {} was not gzipped to {}", .folder.display(), .archive.display())]
    NotCreated { folder: PathBuf, archive: PathBuf },
}

/// Compresses a folder into a single archive file.
#[async_trait]
pub trait Archiver: Send + Sync {
    /// Archive `folder` and return the path of the archive.
    async fn compress(&self, folder: &Path) -> Result<PathBuf, ArchiveError>;
}

/// [`Archiver`] backed by the system `tar` binary.
#[derive(Debug, Clone)]
pub struct TarArchiver {
    program: String,
    timeout: Duration,
}

impl Default for TarArchiver {
    fn default() -> Self {
        Self::new()
    }
}

impl TarArchiver {
    pub fn new() -> Self {
        Self {
            program: "tar".to_string(),
            timeout: DEFAULT_ARCHIVE_TIMEOUT,
        }
    }

    /// Use a different tar-compatible binary.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Where the archive of `folder` is written: `<parent>/git_backup.tar.gz`.
pub fn archive_path_for(folder: &Path) -> Result<PathBuf, ArchiveError> {
    let folder = absolutize(folder).map_err(|_| ArchiveError::InvalidPath(folder.to_path_buf()))?;
    let parent = folder
        .parent()
        .ok_or_else(|| ArchiveError::InvalidPath(folder.clone()))?;
    Ok(parent.join(ARCHIVE_FILE_NAME))
}

#[async_trait]
impl Archiver for TarArchiver {
    async fn compress(&self, folder: &Path) -> Result<PathBuf, ArchiveError> {
        let folder = absolutize(folder).map_err(|_| ArchiveError::InvalidPath(folder.to_path_buf()))?;
        let (parent, name) = match (folder.parent(), folder.file_name()) {
            (Some(parent), Some(name)) => (parent.to_path_buf(), name.to_os_string()),
            _ => return Err(ArchiveError::InvalidPath(folder)),
        };
        let archive = parent.join(ARCHIVE_FILE_NAME);

        debug!("Archiving {} to {}", folder.display(), archive.display());

        let mut command = Command::new(&self.program);
        command
            .arg("-zcf")
            .arg(&archive)
            .arg("--")
            .arg(&name)
            .current_dir(&parent)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        // Own process group, so the compressor `-z` spawns can be killed with tar.
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| ArchiveError::Spawn {
            program: self.program.clone(),
            source,
        })?;
        let pid = child.id();

        // Dropping the wait future on timeout kills the child.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(output) => output.map_err(|source| ArchiveError::Spawn {
                program: self.program.clone(),
                source,
            })?,
            Err(_) => {
                warn!("{} did not finish within {:?}", self.program, self.timeout);
                if let Some(pid) = pid {
                    kill_process_group(pid);
                }
                ScratchArchive::new(archive).remove();
                return Err(ArchiveError::TimedOut {
                    folder,
                    timeout: self.timeout,
                });
            }
        };

        if !output.status.success() {
            ScratchArchive::new(archive).remove();
            return Err(ArchiveError::CommandFailed {
                folder,
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        if !archive.exists() {
            return Err(ArchiveError::NotCreated { folder, archive });
        }

        Ok(archive)
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: u32) {
    // SAFETY: kill(2) takes no pointers; a negative pid addresses the group.
    let rc = unsafe { libc::kill(-(pgid as libc::pid_t), libc::SIGKILL) };
    if rc != 0 {
        debug!(
            "failed to kill process group {}: {}",
            pgid,
            std::io::Error::last_os_error()
        );
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: u32) {}

/// Archive file that is deleted when the guard goes out of scope.
#[derive(Debug)]
pub struct ScratchArchive {
    path: PathBuf,
    removed: bool,
}

impl ScratchArchive {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            removed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the archive now instead of on drop.
    pub fn remove(mut self) {
        self.remove_file();
    }

    fn remove_file(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed archive {}", self.path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(error = %e, path = ?self.path, "failed to remove archive"),
        }
    }
}

impl Drop for ScratchArchive {
    fn drop(&mut self) {
        self.remove_file();
    }
}
