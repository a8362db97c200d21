//! HTTP GET with bounded linear-backoff retry.
//!
//! 404 and 403 are fatal and returned immediately; every other non-success
//! status and any transport error is transient and retried until the attempt
//! budget is spent.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::{debug, warn};

use reportforge_shared::{ReportForgeError, Result};

/// Retry budget and backoff base for a single fetch.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before retry N is `base_delay * N` (linear, not exponential).
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

/// Issue a GET for `url`, retrying transient failures per `policy`.
///
/// Returns the response on any 2xx status. Backoff sleeps are cooperative
/// (`tokio::time::sleep`), so a paused-clock test can observe them.
pub async fn fetch_with_retry(
    client: &Client,
    url: &str,
    headers: &[(&str, &str)],
    policy: &RetryPolicy,
) -> Result<reqwest::Response> {
    for attempt in 1..=policy.max_attempts {
        let mut request = client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();
                if status.is_success() {
                    debug!(url, attempt, "fetch succeeded");
                    return Ok(response);
                }
                if status == StatusCode::NOT_FOUND {
                    return Err(ReportForgeError::NotFound {
                        url: url.to_string(),
                    });
                }
                if status == StatusCode::FORBIDDEN {
                    return Err(ReportForgeError::RateLimited {
                        url: url.to_string(),
                    });
                }
                warn!(url, attempt, status = status.as_u16(), "transient HTTP status");
            }
            Err(e) => {
                warn!(url, attempt, error = %e, "request failed");
            }
        }

        if attempt < policy.max_attempts {
            let delay = policy.base_delay * attempt;
            debug!(url, attempt, delay_ms = delay.as_millis() as u64, "backing off");
            tokio::time::sleep(delay).await;
        }
    }

    Err(ReportForgeError::ExhaustedRetries {
        url: url.to_string(),
        attempts: policy.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Instant;

    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_policy() -> RetryPolicy {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(20),
        }
    }

    #[tokio::test]
    async fn persistent_500_exhausts_all_attempts_with_linear_backoff() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/flaky"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = Client::new();
        let url = format!("{}/flaky", server.uri());
        let start = Instant::now();
        let result = fetch_with_retry(&client, &url, &[], &test_policy()).await;
        let elapsed = start.elapsed();

        match result {
            Err(ReportForgeError::ExhaustedRetries { attempts, .. }) => {
                assert_eq!(attempts, 3);
            }
            other => panic!("expected ExhaustedRetries, got {other:?}"),
        }
        // Backoff between attempts: 20ms after the first, 40ms after the second.
        assert!(elapsed >= Duration::from_millis(60), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn not_found_fails_on_first_attempt() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let url = format!("{}/missing", server.uri());
        let result = fetch_with_retry(&client, &url, &[], &test_policy()).await;

        assert!(matches!(result, Err(ReportForgeError::NotFound { .. })));
    }

    #[tokio::test]
    async fn forbidden_fails_on_first_attempt_with_distinct_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/limited"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let url = format!("{}/limited", server.uri());
        let result = fetch_with_retry(&client, &url, &[], &test_policy()).await;

        match result {
            Err(ReportForgeError::RateLimited { .. }) => {}
            other => panic!("expected RateLimited, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn recovers_after_transient_failure() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/eventually"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/eventually"))
            .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
            .mount(&server)
            .await;

        let client = Client::new();
        let url = format!("{}/eventually", server.uri());
        let response = fetch_with_retry(&client, &url, &[], &test_policy())
            .await
            .expect("second attempt should succeed");

        assert_eq!(response.text().await.unwrap(), "ok");
    }

    #[tokio::test]
    async fn request_headers_are_forwarded() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/raw"))
            .and(wiremock::matchers::header(
                "Accept",
                "application/vnd.github.v3.raw",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_string("body"))
            .expect(1)
            .mount(&server)
            .await;

        let client = Client::new();
        let url = format!("{}/raw", server.uri());
        let response = fetch_with_retry(
            &client,
            &url,
            &[("Accept", "application/vnd.github.v3.raw")],
            &test_policy(),
        )
        .await
        .expect("header match should succeed");

        assert_eq!(response.text().await.unwrap(), "body");
    }
}
