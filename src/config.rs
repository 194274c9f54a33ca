//! Autosave configuration.
//!
//! Everything the autosave sequence needs from the environment is read once
//! into [`AutosaveConfig`] and passed down explicitly afterwards.

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::SandboxId;

/// Sandbox identifier (required)
pub const SANDBOX_ID_ENV: &str = "SANDBOX_ID";
/// Alternate data-loader host, e.g. `dataloader` or `http://127.0.0.1:8080`
pub const API_HOST_ENV: &str = "DATA_LOADER_API_URL";
/// Set when the sandbox already has durable storage
pub const PERSISTENT_STORAGE_ENV: &str = "HAS_PERSISTENT_STORAGE";
/// Selects the save endpoint variant (`internal` or `token`)
pub const SAVE_PROTOCOL_ENV: &str = "DATA_LOADER_SAVE_PROTOCOL";
/// Storage API token, only consulted by the token protocol
pub const STORAGE_TOKEN_ENV: &str = "KBC_TOKEN";

/// Host used when no override is configured.
pub const DEFAULT_API_HOST: &str = "data-loader-api";

/// Version-control folder uploaded next to the notebook.
pub const DEFAULT_GIT_FOLDER: &str = "/data/.git";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SANDBOX_ID environment variable is required")]
    MissingSandboxId,

    #[error("Could not find Storage API token (KBC_TOKEN)")]
    MissingStorageToken,

    #[error("unknown save protocol '{0}' (expected 'internal' or 'token')")]
    UnknownSaveProtocol(String),
}

/// How files are submitted to the save endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SaveProtocol {
    /// `/data-loader-api/internal/save`; trust comes from the sandbox network.
    #[default]
    Internal,
    /// `/data-loader-api/save` authenticated with `X-StorageApi-Token`.
    Token { token: String },
}

#[derive(Debug, Clone)]
pub struct AutosaveConfig {
    pub sandbox_id: SandboxId,
    /// Host override; `None` means [`DEFAULT_API_HOST`].
    pub api_host: Option<String>,
    pub has_persistent_storage: bool,
    pub save_protocol: SaveProtocol,
    pub git_folder: PathBuf,
}

impl AutosaveConfig {
    /// Config with defaults for everything but the sandbox id.
    pub fn new(sandbox_id: SandboxId) -> Self {
        Self {
            sandbox_id,
            api_host: None,
            has_persistent_storage: false,
            save_protocol: SaveProtocol::default(),
            git_folder: PathBuf::from(DEFAULT_GIT_FOLDER),
        }
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let sandbox_id = lookup(SANDBOX_ID_ENV)
            .and_then(SandboxId::new)
            .ok_or(ConfigError::MissingSandboxId)?;

        let api_host = lookup(API_HOST_ENV).filter(|host| !host.is_empty());

        let has_persistent_storage = lookup(PERSISTENT_STORAGE_ENV)
            .map(|value| is_truthy(&value))
            .unwrap_or(false);

        let save_protocol = match lookup(SAVE_PROTOCOL_ENV) {
            None => SaveProtocol::Internal,
            Some(value) => match value.to_lowercase().as_str() {
                "" | "internal" => SaveProtocol::Internal,
                "token" => {
                    let token = lookup(STORAGE_TOKEN_ENV)
                        .filter(|token| !token.is_empty())
                        .ok_or(ConfigError::MissingStorageToken)?;
                    SaveProtocol::Token { token }
                }
                _ => return Err(ConfigError::UnknownSaveProtocol(value)),
            },
        };

        Ok(Self {
            api_host,
            has_persistent_storage,
            save_protocol,
            ..Self::new(sandbox_id)
        })
    }

    /// Host the data-loader API is reached at.
    pub fn api_host(&self) -> &str {
        self.api_host.as_deref().unwrap_or(DEFAULT_API_HOST)
    }
}

/// Only `true` and `1` (any case) enable a flag.
fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "true" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_missing_sandbox_id() {
        let err = AutosaveConfig::from_lookup(lookup_from(&[])).unwrap_err();
        assert_eq!(err, ConfigError::MissingSandboxId);

        let err = AutosaveConfig::from_lookup(lookup_from(&[("SANDBOX_ID", "")])).unwrap_err();
        assert_eq!(err, ConfigError::MissingSandboxId);
    }

    #[test]
    fn test_defaults() {
        let config = AutosaveConfig::from_lookup(lookup_from(&[("SANDBOX_ID", "123")])).unwrap();
        assert_eq!(config.sandbox_id.as_str(), "123");
        assert_eq!(config.api_host(), DEFAULT_API_HOST);
        assert!(!config.has_persistent_storage);
        assert_eq!(config.save_protocol, SaveProtocol::Internal);
        assert_eq!(config.git_folder, PathBuf::from("/data/.git"));
    }

    #[test]
    fn test_empty_host_falls_back_to_default() {
        let config = AutosaveConfig::from_lookup(lookup_from(&[
            ("SANDBOX_ID", "123"),
            ("DATA_LOADER_API_URL", ""),
        ]))
        .unwrap();
        assert_eq!(config.api_host(), "data-loader-api");

        let config = AutosaveConfig::from_lookup(lookup_from(&[
            ("SANDBOX_ID", "123"),
            ("DATA_LOADER_API_URL", "dataloader"),
        ]))
        .unwrap();
        assert_eq!(config.api_host(), "dataloader");
    }

    #[test]
    fn test_persistent_storage_flag() {
        for (value, expected) in [
            ("true", true),
            ("True", true),
            ("1", true),
            ("false", false),
            ("0", false),
            ("yes", false),
            ("", false),
        ] {
            let config = AutosaveConfig::from_lookup(lookup_from(&[
                ("SANDBOX_ID", "123"),
                ("HAS_PERSISTENT_STORAGE", value),
            ]))
            .unwrap();
            assert_eq!(config.has_persistent_storage, expected, "value {:?}", value);
        }
    }

    #[test]
    fn test_token_protocol_requires_token() {
        let err = AutosaveConfig::from_lookup(lookup_from(&[
            ("SANDBOX_ID", "123"),
            ("DATA_LOADER_SAVE_PROTOCOL", "token"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingStorageToken);

        let config = AutosaveConfig::from_lookup(lookup_from(&[
            ("SANDBOX_ID", "123"),
            ("DATA_LOADER_SAVE_PROTOCOL", "token"),
            ("KBC_TOKEN", "secret"),
        ]))
        .unwrap();
        assert_eq!(
            config.save_protocol,
            SaveProtocol::Token {
                token: "secret".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_protocol() {
        let err = AutosaveConfig::from_lookup(lookup_from(&[
            ("SANDBOX_ID", "123"),
            ("DATA_LOADER_SAVE_PROTOCOL", "ftp"),
        ]))
        .unwrap_err();
        assert_eq!(err, ConfigError::UnknownSaveProtocol("ftp".to_string()));
    }
}
