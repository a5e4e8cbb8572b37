//! Generic HTTP client tools
//!
//! Shared request execution for the DNS and IAM calls: sending, logging,
//! reading the body, cancellation and the optional read retry.
//!
//! # design principles
//! - **Callers build the `RequestBuilder`** - URL, headers and body stay with the transport
//! - **Unified HTTP processing flow** - sending requests, logging, and reading responses
//! - **Status interpretation stays with the caller** - only 429 and 502-504 are classified here

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

use crate::error::{PROVIDER_NAME, ProviderError, Result};
use crate::utils::log_sanitizer::truncate_for_log;

/// Builds the reqwest client with connect/request timeouts.
pub fn create_http_client(connect_timeout: Duration, request_timeout: Duration) -> Result<Client> {
    Client::builder()
        .connect_timeout(connect_timeout)
        .timeout(request_timeout)
        .build()
        .map_err(|e| ProviderError::Configuration {
            detail: format!("failed to create HTTP client: {e}"),
        })
}

/// HTTP tool function set
pub struct HttpUtils;

impl HttpUtils {
    /// Performs an HTTP request and returns response text
    ///
    /// # Arguments
    /// * `request_builder` - configured request constructor (including URL, headers, body, etc.)
    /// * `method_name` - request method name (such as "GET", "POST", used for logs)
    /// * `url` - request URL (for logging)
    ///
    /// # Returns
    /// * `Ok((status_code, response_text))` - any status other than 429/502/503/504
    /// * `Err(ProviderError::NetworkError | Timeout | RateLimited)` - transport-level failure
    pub async fn execute_request(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
    ) -> Result<(u16, String)> {
        log::debug!("[{PROVIDER_NAME}] {method_name} {url}");

        let response = request_builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ProviderError::Timeout {
                    detail: e.to_string(),
                }
            } else {
                ProviderError::NetworkError {
                    detail: e.to_string(),
                }
            }
        })?;

        let status_code = response.status().as_u16();
        log::debug!("[{PROVIDER_NAME}] Response Status: {status_code}");

        // Extract Retry-After header (before consuming response body)
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        if status_code == 429 {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{PROVIDER_NAME}] Rate limited (HTTP 429), retry_after={retry_after:?}");
            return Err(ProviderError::RateLimited {
                retry_after,
                raw_message: Some(body),
            });
        }

        if matches!(status_code, 502..=504) {
            let body = response.text().await.unwrap_or_default();
            log::warn!("[{PROVIDER_NAME}] Server error (HTTP {status_code})");
            return Err(ProviderError::NetworkError {
                detail: format!("HTTP {status_code}: {}", truncate_for_log(&body)),
            });
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| ProviderError::NetworkError {
                detail: format!("Failed to read response body: {e}"),
            })?;

        log::debug!(
            "[{PROVIDER_NAME}] Response Body: {}",
            truncate_for_log(&response_text)
        );

        Ok((status_code, response_text))
    }

    /// Same as [`execute_request`](Self::execute_request), abandoned with
    /// [`ProviderError::Cancelled`] as soon as `cancel` fires.
    pub async fn execute_request_cancellable(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
        cancel: &CancellationToken,
    ) -> Result<(u16, String)> {
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                log::debug!("[{PROVIDER_NAME}] {method_name} {url} cancelled");
                Err(ProviderError::Cancelled)
            }
            result = Self::execute_request(request_builder, method_name, url) => result,
        }
    }

    /// Parse JSON response
    ///
    /// # Returns
    /// * `Ok(T)` - successfully parsed
    /// * `Err(ProviderError::ParseError)` - parsing failed
    pub fn parse_json<T>(response_text: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(response_text).map_err(|e| {
            log::error!("[{PROVIDER_NAME}] JSON parse failed: {e}");
            log::error!(
                "[{PROVIDER_NAME}] Raw response: {}",
                truncate_for_log(response_text)
            );
            ProviderError::ParseError {
                detail: e.to_string(),
            }
        })
    }

    /// Performs a read-only HTTP request, retrying transient failures.
    ///
    /// # Arguments
    /// * `max_retries` - Maximum number of retries (0 means no retries)
    /// * `cancel` - aborts the current attempt and any pending backoff
    ///
    /// # Retry strategy
    /// - Only [`ProviderError::is_retryable`] errors are retried
    /// - Exponential backoff: 100ms, 200ms, 400ms, 800ms, ... (maximum 10 seconds)
    /// - `Retry-After` on a 429 is honored (capped at 30 seconds)
    pub async fn execute_request_with_retry(
        request_builder: RequestBuilder,
        method_name: &str,
        url: &str,
        max_retries: u32,
        cancel: &CancellationToken,
    ) -> Result<(u16, String)> {
        if max_retries == 0 {
            return Self::execute_request_cancellable(request_builder, method_name, url, cancel)
                .await;
        }

        let mut last_error = None;

        for attempt in 0..=max_retries {
            // RequestBuilder can only be used once
            let Some(req) = request_builder.try_clone() else {
                log::warn!("[{PROVIDER_NAME}] Cannot clone request, disabling retry");
                return Self::execute_request_cancellable(
                    request_builder,
                    method_name,
                    url,
                    cancel,
                )
                .await;
            };

            match Self::execute_request_cancellable(req, method_name, url, cancel).await {
                Ok(resp) => return Ok(resp),
                Err(e) if attempt < max_retries && e.is_retryable() => {
                    let delay = retry_delay(&e, attempt);
                    log::warn!(
                        "[{}] Request failed (attempt {}/{}), retrying in {:.1}s: {}",
                        PROVIDER_NAME,
                        attempt + 1,
                        max_retries,
                        delay.as_secs_f32(),
                        e
                    );
                    tokio::select! {
                        biased;
                        () = cancel.cancelled() => return Err(ProviderError::Cancelled),
                        () = tokio::time::sleep(delay) => {}
                    }
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| ProviderError::NetworkError {
            detail: "All retries exhausted with no error captured".to_string(),
        }))
    }
}

/// Calculate retry delay
///
/// Use `retry_after` (capped at 30s) when the error is `RateLimited` and carries it.
/// Otherwise exponential backoff is used.
fn retry_delay(error: &ProviderError, attempt: u32) -> Duration {
    if let ProviderError::RateLimited {
        retry_after: Some(secs),
        ..
    } = error
    {
        Duration::from_secs((*secs).min(30))
    } else {
        backoff_delay(attempt)
    }
}

/// Calculate exponential backoff delay
///
/// Backoff strategy: 100ms, 200ms, 400ms, 800ms, 1.6s, ...
/// Maximum delay limit is 10 seconds
fn backoff_delay(attempt: u32) -> Duration {
    let capped_attempt = attempt.min(20); // Prevent 2^attempt from overflowing
    let delay_ms = 100_u64.saturating_mul(1_u64 << capped_attempt);
    let delay_ms = delay_ms.min(10_000);
    Duration::from_millis(delay_ms)
}
