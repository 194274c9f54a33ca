//! Post-save hook for the notebook server.
//!
//! The host calls [`post_save`] after every save. Only notebooks trigger an
//! autosave, and nothing the hook does may fail the host's save, so every
//! error ends up in the host's log span instead of the return value.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, error, Instrument, Span};

use crate::autosave::Autosaver;

/// Kind of artifact the host just saved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Notebook,
    File,
    Directory,
}

/// Save event delivered by the host.
#[derive(Debug, Clone)]
pub struct SaveEvent {
    pub kind: ContentKind,
    /// Filesystem path of the saved artifact
    pub path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct ContentModel {
    #[serde(rename = "type")]
    kind: ContentKind,
}

impl SaveEvent {
    pub fn new(kind: ContentKind, path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            path: path.into(),
        }
    }

    /// Build an event from the host's JSON content model
    /// (`{"type": "notebook", ...}`) and the saved file's path.
    pub fn from_model(model: &serde_json::Value, path: impl Into<PathBuf>) -> Result<Self> {
        let model = ContentModel::deserialize(model).context("Invalid content model")?;
        Ok(Self::new(model.kind, path))
    }
}

/// Everything the hook borrows from its host.
pub struct SaveContext<'a> {
    pub autosaver: &'a Autosaver,
    /// Host logger; hook output is recorded inside this span.
    pub log: Span,
}

/// Run the autosave sequence for a saved notebook. Never fails.
pub async fn post_save(event: &SaveEvent, ctx: &SaveContext<'_>) {
    if event.kind != ContentKind::Notebook {
        return;
    }

    async {
        debug!("Autosave triggered for {}", event.path.display());
        if let Err(err) = ctx.autosaver.run(&event.path).await {
            error!("Autosave of {} failed: {:#}", event.path.display(), err);
        }
    }
    .instrument(ctx.log.clone())
    .await
}
