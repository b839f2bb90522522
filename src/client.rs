//! Typed JSON client over the error-handling pipeline
//!
//! Resolves request paths against the configured base URL, encodes bodies and
//! decodes responses with serde. Failures raised while encoding or decoding go
//! through the same classification and notification as transport failures.

use crate::classifier::{RawFailure, RequestContext};
use crate::config::ClientConfig;
use crate::error::{ConfigError, ConfigResult};
use crate::logging::log_debug;
use crate::navigation::SignInNavigator;
use crate::notifications::NotificationSink;
use crate::pipeline::{ApiRequest, ApiResponse, ErrorHandling, RequestExecutor};
use crate::transport::HttpTransport;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// Per-call options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Bypass classification, notification and redirect for this call
    pub skip_error_handling: bool,
}

impl RequestOptions {
    /// Options for calls whose failures are expected and handled by the caller
    pub fn silent() -> Self {
        Self {
            skip_error_handling: true,
        }
    }
}

/// JSON client for the admin API
///
/// Every call goes through the error-handling pipeline, so failures come back
/// as [`RawFailure::Handled`] unless the call opted out.
pub struct ApiClient<E = HttpTransport> {
    pipeline: ErrorHandling<E>,
    base_url: reqwest::Url,
}

impl ApiClient<HttpTransport> {
    /// Create a client talking HTTP to `config.base_url`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the configuration does not validate.
    pub fn from_config(
        config: &ClientConfig,
        sink: Arc<dyn NotificationSink>,
        navigator: Arc<dyn SignInNavigator>,
    ) -> ConfigResult<Self> {
        let transport = HttpTransport::new(config)?;
        let pipeline = ErrorHandling::new(transport, sink, navigator)
            .with_correlation_header(config.correlation_header.clone());

        log_debug!(
            base_url = %config.base_url,
            locale = %config.locale,
            "ApiClient created"
        );

        Self::new(pipeline, &config.base_url)
    }
}

impl<E: RequestExecutor> ApiClient<E> {
    /// Create a client over an existing pipeline
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if `base_url` is not a valid URL.
    pub fn new(pipeline: ErrorHandling<E>, base_url: &str) -> ConfigResult<Self> {
        let mut base_url = reqwest::Url::parse(base_url)
            .map_err(|e| ConfigError::invalid_value("base_url", format!("'{base_url}': {e}")))?;
        // Joining replaces the last path segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { pipeline, base_url })
    }

    pub fn pipeline(&self) -> &ErrorHandling<E> {
        &self.pipeline
    }

    /// Absolute URL for `path`. Absolute inputs are returned as-is.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        match self.base_url.join(path.trim_start_matches('/')) {
            Ok(url) => url.to_string(),
            Err(_) => format!("{}{}", self.base_url, path.trim_start_matches('/')),
        }
    }

    /// Send a prepared request through the pipeline
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, RawFailure> {
        self.pipeline.execute(request).await
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<T, RawFailure> {
        self.call(Method::GET, path, None::<&()>, options).await
    }

    pub async fn post<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, RawFailure>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.call(Method::POST, path, Some(body), options).await
    }

    pub async fn put<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, RawFailure>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.call(Method::PUT, path, Some(body), options).await
    }

    pub async fn patch<B, T>(
        &self,
        path: &str,
        body: &B,
        options: RequestOptions,
    ) -> Result<T, RawFailure>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.call(Method::PATCH, path, Some(body), options).await
    }

    /// DELETE, ignoring any response body
    pub async fn delete(&self, path: &str, options: RequestOptions) -> Result<(), RawFailure> {
        let request = self.request(Method::DELETE, path, options);
        self.send(request).await.map(|_| ())
    }

    fn request(&self, method: Method, path: &str, options: RequestOptions) -> ApiRequest {
        let mut request = ApiRequest::new(method, self.url(path));
        request.skip_error_handling = options.skip_error_handling;
        request
    }

    async fn call<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: RequestOptions,
    ) -> Result<T, RawFailure>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let mut request = self.request(method, path, options);
        let context = request.context();

        if let Some(body) = body {
            match serde_json::to_value(body) {
                Ok(value) => request.body = Some(value),
                Err(e) => {
                    let failure = anyhow::Error::new(e).context("Failed to encode request body");
                    return Err(self.local_failure(failure.into(), &context, options).await);
                }
            }
        }

        let response = self.send(request).await?;
        match response.json::<T>() {
            Ok(value) => Ok(value),
            Err(e) => {
                let failure = anyhow::Error::new(e).context("Failed to decode response body");
                Err(self.local_failure(failure.into(), &context, options).await)
            }
        }
    }

    /// Failures raised by the client itself go through the same handling as
    /// transport failures.
    async fn local_failure(
        &self,
        failure: RawFailure,
        context: &RequestContext,
        options: RequestOptions,
    ) -> RawFailure {
        if options.skip_error_handling {
            return failure;
        }
        RawFailure::Handled(self.pipeline.handle_failure(failure, context).await)
    }
}
