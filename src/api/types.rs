//! Request payloads and error types for the data-loader API.

use serde::Serialize;

/// File descriptor shared by both save endpoint variants
#[derive(Debug, Clone, Serialize)]
pub struct SaveFile {
    /// Path relative to the working directory
    pub source: String,
    pub tags: Vec<String>,
}

/// Body of `POST /data-loader-api/save`
#[derive(Debug, Serialize)]
pub(super) struct SaveRequest {
    pub file: SaveFile,
}

/// Body of `POST /data-loader-api/internal/save`
#[derive(Debug, Serialize)]
pub(super) struct InternalSaveRequest {
    pub file_path: String,
    pub file: SaveFile,
}

/// Non-success response from the data-loader API.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// HTTP status code
    pub http_status: u16,
    /// Error message
    pub message: String,
    /// Request ID (for debugging)
    pub request_id: Option<String>,
}

impl ApiError {
    /// Create from HTTP status code and response body
    pub fn from_http_response(http_status: u16, body: String, request_id: Option<String>) -> Self {
        let message = if body.is_empty() {
            format!("API error (HTTP {})", http_status)
        } else {
            format!("API error (HTTP {}): {}", http_status, body)
        };

        Self {
            http_status,
            message,
            request_id,
        }
    }

    /// Server-side failure, as opposed to a rejected request.
    pub fn is_server_error(&self) -> bool {
        self.http_status >= 500
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_request_shape() {
        let request = SaveRequest {
            file: SaveFile {
                source: "../notebook.ipynb".to_string(),
                tags: vec!["autosave".to_string(), "sandbox-1".to_string()],
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "file": {"source": "../notebook.ipynb", "tags": ["autosave", "sandbox-1"]}
            })
        );
    }

    #[test]
    fn test_api_error_message() {
        let err = ApiError::from_http_response(502, String::new(), None);
        assert_eq!(err.to_string(), "API error (HTTP 502)");
        assert!(err.is_server_error());

        let err = ApiError::from_http_response(404, "no such sandbox".to_string(), None);
        assert_eq!(err.to_string(), "API error (HTTP 404): no such sandbox");
        assert!(!err.is_server_error());
    }
}
