//! Domain types shared across modules.
//!
//! The sandbox identifier and the tag set are used by the configuration,
//! the API payloads and the autosave sequence alike, so they live here to
//! avoid circular dependencies between those modules.

use std::fmt;

/// Tag attached to every autosave upload.
pub const AUTOSAVE_TAG: &str = "autosave";

/// Extra tag attached to archived version-control folders.
pub const GIT_TAG: &str = "git";

/// Identifier of the current sandbox instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SandboxId(String);

impl SandboxId {
    /// Wrap a raw identifier. Returns `None` for an empty string.
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        if id.is_empty() {
            None
        } else {
            Some(Self(id))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Storage tag naming this sandbox (`sandbox-<id>`).
    pub fn tag(&self) -> String {
        format!("sandbox-{}", self.0)
    }
}

impl fmt::Display for SandboxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build the tag list for an upload: `autosave`, `sandbox-<id>`, then `extra`.
pub fn autosave_tags(sandbox_id: &SandboxId, extra: &[&str]) -> Vec<String> {
    let mut tags = Vec::with_capacity(2 + extra.len());
    tags.push(AUTOSAVE_TAG.to_string());
    tags.push(sandbox_id.tag());
    tags.extend(extra.iter().map(|tag| tag.to_string()));
    tags
}
