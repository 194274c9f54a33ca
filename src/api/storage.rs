use anyhow::Result;
use tracing::debug;

use super::client::{ApiClient, REQUEST_TIMEOUT_SECS};
use super::types::{InternalSaveRequest, SaveFile, SaveRequest};
use crate::config::SaveProtocol;

/// Header carrying the Storage API token
pub const STORAGE_TOKEN_HEADER: &str = "X-StorageApi-Token";

impl ApiClient {
    /// Submit a file to the storage save endpoint.
    ///
    /// `absolute_path` is only sent by the internal variant, which reads the
    /// file from the shared volume.
    pub async fn save(
        &self,
        protocol: &SaveProtocol,
        absolute_path: &str,
        file: SaveFile,
    ) -> Result<()> {
        match protocol {
            SaveProtocol::Internal => {
                let body = InternalSaveRequest {
                    file_path: absolute_path.to_string(),
                    file,
                };
                self.post_api("internal/save", Some(&body), &[], REQUEST_TIMEOUT_SECS)
                    .await?;
            }
            SaveProtocol::Token { token } => {
                let body = SaveRequest { file };
                self.post_api(
                    "save",
                    Some(&body),
                    &[(STORAGE_TOKEN_HEADER, token.as_str())],
                    REQUEST_TIMEOUT_SECS,
                )
                .await?;
            }
        }

        debug!("Save request accepted for {}", absolute_path);
        Ok(())
    }
}
