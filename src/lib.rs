//! Autosave for notebook sandboxes.
//!
//! On every notebook save (through [`hook::post_save`]) or on an external
//! trigger (the `autosave-worker` binary, see [`worker`]), the notebook and
//! its `.git` folder are uploaded to storage and an activity heartbeat is
//! reported. Sandboxes with persistent storage only report the heartbeat.

pub mod api;
pub mod archive;
pub mod autosave;
pub mod cli;
pub mod config;
pub mod domain;
pub mod hook;
pub mod worker;

pub use autosave::Autosaver;
pub use config::{AutosaveConfig, ConfigError, SaveProtocol};
pub use domain::SandboxId;
pub use hook::{post_save, ContentKind, SaveContext, SaveEvent};
