//! reqwest-backed request executor.

use crate::classifier::{HttpFailure, RawFailure};
use crate::config::ClientConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::logging::{log_debug, log_error};
use crate::payload::parse_body;
use crate::pipeline::{ApiRequest, ApiResponse, RequestExecutor};
use async_trait::async_trait;

/// Performs requests over HTTP.
///
/// Requests that never got a response become status-0 [`HttpFailure`]s;
/// non-2xx responses become [`HttpFailure`]s carrying status, reason phrase,
/// decoded body and headers.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from the client configuration
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate or the
    /// underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> ConfigResult<Self> {
        config.validate()?;

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ConfigError::invalid_value("http_client", e.to_string()))?;

        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestExecutor for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RawFailure> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| anyhow::anyhow!("Invalid request URL '{}': {e}", request.url))?;

        let mut builder = self
            .client
            .request(request.method.clone(), url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            log_error!(
                url = %request.url,
                method = %request.method,
                error = %e,
                "HTTP request failed"
            );
            if e.is_builder() {
                RawFailure::Other(anyhow::Error::new(e))
            } else {
                RawFailure::Http(HttpFailure::network(e))
            }
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.bytes().await.map_err(|e| {
            log_error!(
                url = %request.url,
                status = status.as_u16(),
                error = %e,
                "Failed to read response body"
            );
            HttpFailure::network(e)
        })?;
        let body = parse_body(&bytes);

        log_debug!(
            url = %request.url,
            method = %request.method,
            status = status.as_u16(),
            "HTTP response received"
        );

        if status.is_success() {
            return Ok(ApiResponse {
                status: status.as_u16(),
                headers,
                body,
            });
        }

        let failure = HttpFailure::new(status.as_u16(), status.canonical_reason().unwrap_or(""))
            .with_headers(headers);
        Err(match body {
            Some(body) => failure.with_body(body),
            None => failure,
        }
        .into())
    }
}
