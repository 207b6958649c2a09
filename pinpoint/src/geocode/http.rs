//! HTTP client abstraction for testability

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use super::types::GatewayError;

/// Boxed future type for dyn-compatible async methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for HTTP GET operations against the gateway.
///
/// This abstraction allows dependency injection: the gateway is exercised
/// in tests with a mock client feeding canned JSON bodies.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request and returns the body as text.
    ///
    /// Implementations must treat non-2xx statuses as errors; the picker
    /// never inspects partial or error bodies.
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, GatewayError>>;
}

/// Real HTTP client implementation using reqwest.
///
/// Carries the identifying `User-Agent` the gateway's usage policy
/// requires and applies the configured request timeout to every call.
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    /// Creates a client with the given identifying user agent and timeout.
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Http(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

impl HttpClient for ReqwestClient {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, GatewayError>> {
        Box::pin(async move {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .map_err(|e| GatewayError::Http(format!("request failed: {}", e)))?;

            // Check HTTP status
            let status = response.status();
            if !status.is_success() {
                return Err(GatewayError::Status {
                    code: status.as_u16(),
                    url: url.to_string(),
                });
            }

            // Read response body
            response
                .text()
                .await
                .map_err(|e| GatewayError::Http(format!("failed to read response: {}", e)))
        })
    }
}
