use tracing::{error, info};

use super::client::{ApiClient, REQUEST_TIMEOUT_SECS};
use super::types::ApiError;

impl ApiClient {
    /// Record an autosave in the activity tracker.
    ///
    /// A missed heartbeat is harmless, so failures are logged and never
    /// returned.
    pub async fn update_activity(&self) {
        let result = self
            .post_api::<()>("internal/activity", None, &[], REQUEST_TIMEOUT_SECS)
            .await;

        match result {
            Ok(_) => info!("Successfully saved autosave to Sandboxes API"),
            Err(err) => match err.downcast_ref::<ApiError>() {
                Some(api_error) => {
                    error!("Saving autosave to Sandboxes API errored: {}", api_error)
                }
                None => error!("Saving autosave to Sandboxes API failed: {:#}", err),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::http::RetryPolicy;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(host: &str) -> ApiClient {
        ApiClient::new(host)
            .unwrap()
            .with_retry_policy(RetryPolicy::default().with_backoff_factor(Duration::ZERO))
    }

    #[tokio::test]
    async fn test_update_activity_posts_once() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/data-loader-api/internal/activity"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"result": "ok"})))
            .expect(1)
            .mount(&server)
            .await;

        // Bare host:port form, as DATA_LOADER_API_URL is usually set.
        client(&server.address().to_string()).update_activity().await;
    }

    #[test]
    fn test_heartbeat_shares_long_request_timeout() {
        assert_eq!(REQUEST_TIMEOUT_SECS, 240);
    }

    #[tokio::test]
    async fn test_update_activity_swallows_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_string("unknown sandbox"))
            .expect(1)
            .mount(&server)
            .await;

        client(&server.uri()).update_activity().await;
    }

    #[tokio::test]
    async fn test_update_activity_survives_unreachable_host() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();

        client(&format!("127.0.0.1:{}", port)).update_activity().await;
    }
}
