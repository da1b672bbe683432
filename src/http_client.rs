//! HTTP Client Module
//!
//! Thin wrapper over reqwest used for campaign service calls:
//! - Request and connect timeouts so scheduled refreshes never stall
//! - Retries with jittered exponential delay for transient failures

use std::time::Duration;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{RewardsError, Result};

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout
    pub request_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Maximum retries for failed requests
    pub max_retries: u32,
    /// Initial retry delay
    pub initial_retry_delay: Duration,
    /// Maximum retry delay
    pub max_retry_delay: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
            max_retries: 2,
            initial_retry_delay: Duration::from_millis(250),
            max_retry_delay: Duration::from_secs(5),
            user_agent: format!("social-rewards/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            request_timeout: Duration::from_secs(config.http_request_timeout_secs),
            connect_timeout: Duration::from_secs(config.http_connect_timeout_secs),
            max_retries: config.http_max_retries,
            ..Default::default()
        }
    }
}

/// HTTP client with timeouts and retries
#[derive(Clone)]
pub struct ResilientHttpClient {
    client: Client,
    config: HttpClientConfig,
}

impl ResilientHttpClient {
    /// Creates a new resilient HTTP client
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client, config })
    }

    /// Creates a client with default configuration
    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    /// POSTs a JSON body and expects a JSON response
    pub async fn post_json<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> Result<Response> {
        self.execute(url, || {
            self.client
                .post(url)
                .header(reqwest::header::ACCEPT, "application/json")
                .json(body)
        })
        .await
    }

    /// Executes a request with retry logic (exponential delay + jitter).
    /// The builder closure is invoked once per attempt.
    async fn execute<F>(&self, url: &str, build: F) -> Result<Response>
    where
        F: Fn() -> RequestBuilder,
    {
        let mut attempt = 0u32;
        let mut delay = self.config.initial_retry_delay;
        let max_retries = self.config.max_retries;

        loop {
            attempt += 1;
            debug!(url = %url, attempt, "Executing HTTP request");

            match build().send().await {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        return Ok(response);
                    }

                    if Self::is_retryable_status(status) && attempt <= max_retries {
                        warn!(
                            status = %status,
                            attempt,
                            max_retries,
                            "Retryable error, will retry"
                        );
                    } else {
                        let body = response.text().await.unwrap_or_default();
                        return Err(RewardsError::ApiError {
                            code: status.to_string(),
                            message: body,
                        });
                    }
                }
                Err(e) => {
                    if (e.is_timeout() || e.is_connect()) && attempt <= max_retries {
                        warn!(error = %e, attempt, "Transient error, will retry");
                    } else {
                        return Err(RewardsError::HttpError(e));
                    }
                }
            }

            // Jitter: random factor between 0.5 and 1.5
            let jitter = 0.5 + rand::random::<f64>();
            tokio::time::sleep(Duration::from_secs_f64(delay.as_secs_f64() * jitter)).await;
            delay = std::cmp::min(delay * 2, self.config.max_retry_delay);
        }
    }

    /// Checks if a status code should trigger a retry
    fn is_retryable_status(status: StatusCode) -> bool {
        matches!(
            status,
            StatusCode::TOO_MANY_REQUESTS |     // 429
            StatusCode::SERVICE_UNAVAILABLE |   // 503
            StatusCode::GATEWAY_TIMEOUT |       // 504
            StatusCode::BAD_GATEWAY |           // 502
            StatusCode::REQUEST_TIMEOUT         // 408
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = HttpClientConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.request_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_config_from_service_config() {
        let service = Config {
            http_request_timeout_secs: 3,
            http_max_retries: 0,
            ..Default::default()
        };
        let config = HttpClientConfig::from_config(&service);
        assert_eq!(config.request_timeout, Duration::from_secs(3));
        assert_eq!(config.max_retries, 0);
    }

    #[test]
    fn test_retryable_status() {
        assert!(ResilientHttpClient::is_retryable_status(StatusCode::TOO_MANY_REQUESTS));
        assert!(ResilientHttpClient::is_retryable_status(StatusCode::SERVICE_UNAVAILABLE));
        assert!(!ResilientHttpClient::is_retryable_status(StatusCode::NOT_FOUND));
        assert!(!ResilientHttpClient::is_retryable_status(StatusCode::UNAUTHORIZED));
    }
}
