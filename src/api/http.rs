use anyhow::{Context, Result};
use reqwest::StatusCode;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Retry schedule for data-loader requests: 3 retries, delay doubling from
/// the backoff factor, only on gateway-style server errors.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: usize,
    pub backoff_factor: Duration,
    pub retry_statuses: Vec<StatusCode>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_factor: Duration::from_millis(300),
            retry_statuses: vec![
                StatusCode::INTERNAL_SERVER_ERROR,
                StatusCode::BAD_GATEWAY,
                StatusCode::GATEWAY_TIMEOUT,
            ],
        }
    }
}

impl RetryPolicy {
    /// Same policy with a different backoff factor.
    pub fn with_backoff_factor(mut self, backoff_factor: Duration) -> Self {
        self.backoff_factor = backoff_factor;
        self
    }

    fn is_retriable_status(&self, status: StatusCode) -> bool {
        self.retry_statuses.contains(&status)
    }

    /// Delay before the retry that follows attempt `attempt` (0-based).
    pub fn delay(&self, attempt: usize) -> Duration {
        let multiplier = 1u32.checked_shl(attempt as u32).unwrap_or(u32::MAX);
        self.backoff_factor.saturating_mul(multiplier)
    }
}

fn is_retriable_send_error(err: &reqwest::Error) -> bool {
    err.is_timeout() || err.is_connect()
}

/// Send the request built by `make_request`, retrying per `policy`.
///
/// A response is returned as soon as it is not retriable, or once the retries
/// are used up; the caller decides what a non-success status means.
pub(super) async fn send_with_retry(
    policy: &RetryPolicy,
    mut make_request: impl FnMut() -> reqwest::RequestBuilder,
) -> Result<reqwest::Response> {
    let max_attempts = policy.max_retries + 1;

    for attempt in 0..max_attempts {
        match make_request().send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    return Ok(response);
                }

                let should_retry =
                    policy.is_retriable_status(status) && attempt < policy.max_retries;
                if should_retry {
                    let delay = policy.delay(attempt);
                    debug!(
                        "HTTP request failed with status {}; retrying in {:?} (attempt {}/{})",
                        status,
                        delay,
                        attempt + 1,
                        max_attempts
                    );
                    let _ = response.bytes().await;
                    sleep(delay).await;
                    continue;
                }

                return Ok(response);
            }
            Err(err) => {
                let should_retry = is_retriable_send_error(&err) && attempt < policy.max_retries;
                if should_retry {
                    let delay = policy.delay(attempt);
                    debug!(
                        "HTTP request error: {}; retrying in {:?} (attempt {}/{})",
                        err,
                        delay,
                        attempt + 1,
                        max_attempts
                    );
                    sleep(delay).await;
                    continue;
                }

                return Err(anyhow::Error::new(err)).with_context(|| {
                    format!("HTTP request failed after {} attempt(s)", attempt + 1)
                });
            }
        }
    }

    unreachable!("send_with_retry should have returned within max_attempts")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_policy() -> RetryPolicy {
        RetryPolicy::default().with_backoff_factor(Duration::from_millis(1))
    }

    #[test]
    fn test_delay_doubles() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay(0), Duration::from_millis(300));
        assert_eq!(policy.delay(1), Duration::from_millis(600));
        assert_eq!(policy.delay(2), Duration::from_millis(1200));
    }

    #[tokio::test]
    async fn test_retries_server_errors_until_exhausted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(502))
            .expect(4)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/flaky", server.uri());
        let response = send_with_retry(&fast_policy(), || client.post(&url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(504))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/flaky", server.uri());
        let response = send_with_retry(&fast_policy(), || client.post(&url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_client_errors_are_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/bad", server.uri());
        let response = send_with_retry(&fast_policy(), || client.post(&url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_503_is_not_in_retry_set() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let url = format!("{}/busy", server.uri());
        let response = send_with_retry(&fast_policy(), || client.post(&url))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_connection_failure_surfaces_after_retries() {
        // Bind then drop to get a port nothing listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let client = reqwest::Client::new();
        let url = format!("http://127.0.0.1:{}/down", port);

        let mut attempts = 0;
        let err = send_with_retry(&fast_policy(), || {
            attempts += 1;
            client.post(&url)
        })
        .await
        .unwrap_err();

        assert_eq!(attempts, 4);
        assert!(err.to_string().contains("after 4 attempt(s)"));
    }
}
