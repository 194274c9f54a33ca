use anyhow::{Context, Result};
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use super::http::{send_with_retry, RetryPolicy};
use super::types::ApiError;

/// Per-attempt timeout for every data-loader request. The backend may hold
/// error responses for several minutes before answering.
pub(super) const REQUEST_TIMEOUT_SECS: u64 = 240;

/// User-Agent sent with every request
pub const USER_AGENT: &str = "Keboola Sandbox Autosave Request";

/// Path prefix every data-loader endpoint lives under
const API_PREFIX: &str = "data-loader-api/";

/// HTTP client for the data-loader API
pub struct ApiClient {
    pub(super) client: Client,
    pub(super) base_url: Url,
    pub(super) retry: RetryPolicy,
}

impl ApiClient {
    /// Create a client for `host`, which is either a bare `host[:port]` (reached
    /// over plain http) or a full `http(s)://` URL.
    pub fn new(host: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Self::build_base_url(host)?,
            retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn build_base_url(host: &str) -> Result<Url> {
        let raw = if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{}", host)
        };

        let mut base = Url::parse(&raw).with_context(|| format!("Invalid API host: {}", host))?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join(API_PREFIX)
            .with_context(|| format!("Failed to build API base URL from: {}", host))
    }

    /// Full URL of `endpoint`, e.g. `internal/activity`.
    pub fn endpoint_url(&self, endpoint: &str) -> Result<Url> {
        self.base_url
            .join(endpoint)
            .with_context(|| format!("Failed to build URL for endpoint: {}", endpoint))
    }

    /// POST `body` (or nothing) to `endpoint` through the retry policy.
    ///
    /// Non-success responses are turned into an [`ApiError`].
    pub(super) async fn post_api<T>(
        &self,
        endpoint: &str,
        body: Option<&T>,
        headers: &[(&str, &str)],
        timeout_secs: u64,
    ) -> Result<reqwest::Response>
    where
        T: Serialize,
    {
        let url = self.endpoint_url(endpoint)?;
        let request_id = Uuid::new_v4().to_string();

        debug!("=== API Request ===");
        debug!("URL: {}", url);
        debug!("Timeout: {}s", timeout_secs);

        let response = send_with_retry(&self.retry, || {
            let mut request = self
                .client
                .post(url.clone())
                .timeout(Duration::from_secs(timeout_secs))
                .header("Content-Type", "application/json")
                .header("x-request-id", &request_id);

            for (name, value) in headers {
                request = request.header(*name, *value);
            }

            match body {
                Some(body) => request.json(body),
                None => request,
            }
        })
        .await
        .with_context(|| format!("Failed to send request to {}", url))?;

        let status = response.status();
        debug!("=== API Response ===");
        debug!("Status: {}", status);

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            anyhow::bail!(ApiError::from_http_response(
                status.as_u16(),
                error_text,
                Some(request_id)
            ));
        }

        Ok(response)
    }
}
