//! Minimal async HTTP abstraction for the provider fetch path.
//!
//! The trait keeps the fetch pipeline testable offline: production wires in
//! [`ReqwestHttpClient`], tests substitute recording or failing fakes.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

const DEFAULT_TIMEOUT_MS: u64 = 5_000;

/// Outgoing GET request. The provider API is query-string only, so there is
/// no method, body, or auth surface here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }

    #[must_use]
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }
}

/// Raw response; decoding is the caller's concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Transport-level failure: connect, timeout, or mid-body errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct HttpError {
    message: String,
}

impl HttpError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Async HTTP execution seam.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Client that refuses every request. Useful as a safe default where no
/// network access is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpClient;

impl HttpClient for NoopHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            Err(HttpError::new(format!(
                "no live HTTP client configured for {}",
                request.url
            )))
        })
    }
}

/// Production client backed by a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Self {
        Self {
            client: Arc::new(reqwest::Client::new()),
        }
    }
}

impl Default for ReqwestHttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        let client = Arc::clone(&self.client);

        Box::pin(async move {
            let response = client
                .get(&request.url)
                .timeout(Duration::from_millis(request.timeout_ms))
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        HttpError::new(format!("request timed out after {}ms", request.timeout_ms))
                    } else if err.is_connect() {
                        HttpError::new(format!("connection failed: {err}"))
                    } else {
                        HttpError::new(format!("request failed: {err}"))
                    }
                })?;

            let status = response.status().as_u16();
            let body = response
                .text()
                .await
                .map_err(|err| HttpError::new(format!("failed to read response body: {err}")))?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_defaults_to_standard_timeout() {
        let request = HttpRequest::get("https://example.com");
        assert_eq!(request.timeout_ms, DEFAULT_TIMEOUT_MS);
        assert_eq!(
            HttpRequest::get("https://example.com")
                .with_timeout_ms(250)
                .timeout_ms,
            250
        );
    }

    #[test]
    fn status_classification() {
        let ok = HttpResponse {
            status: 200,
            body: String::new(),
        };
        let server_error = HttpResponse {
            status: 503,
            body: String::new(),
        };
        assert!(ok.is_success());
        assert!(!server_error.is_success());
    }

    #[tokio::test]
    async fn noop_client_refuses_requests() {
        let client = NoopHttpClient;
        let err = client
            .execute(HttpRequest::get("https://example.com/query"))
            .await
            .expect_err("noop must fail");
        assert!(err.message().contains("no live HTTP client"));
    }
}
