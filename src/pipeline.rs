//! The error-handling layer every request passes through.
//!
//! [`ErrorHandling`] wraps any [`RequestExecutor`]. On failure it classifies
//! the error, hands it to the [`NotificationSink`], redirects to sign-in when
//! the session expired, and returns the classified error to the caller in
//! place of the original one. In that order.
//!
//! Errors the layer has reported come back as [`RawFailure::Handled`]. Outer
//! layers pass those through untouched; any other failure, including an
//! [`AppError`] an inner executor raised itself, is reported exactly once.
//!
//! ```rust,no_run
//! use api_error_pipeline::pipeline::{with_error_handling, ApiRequest, RequestExecutor};
//! # use api_error_pipeline::{HttpTransport, ToastQueue, navigation::SignInNavigator};
//! # use std::sync::Arc;
//! # async fn example(
//! #     transport: HttpTransport,
//! #     navigator: Arc<dyn SignInNavigator>,
//! # ) -> Result<(), api_error_pipeline::RawFailure> {
//! let toasts = Arc::new(ToastQueue::default());
//! let executor = with_error_handling(transport, toasts.clone(), navigator);
//!
//! // Failures here are notified once and come back classified.
//! let response = executor
//!     .execute(ApiRequest::get("http://localhost:3000/users"))
//!     .await?;
//!
//! // Expected failures can opt out of notifications and redirects.
//! let probe = executor
//!     .execute(ApiRequest::get("http://localhost:3000/auth/me").skip_error_handling())
//!     .await;
//! # Ok(())
//! # }
//! ```

use crate::classifier::{
    classify, correlation_id_from_headers, RawFailure, RequestContext, CORRELATION_ID_HEADER,
};
use crate::error::AppError;
use crate::logging::log_debug;
use crate::navigation::SignInNavigator;
use crate::notifications::NotificationSink;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;

/// An outgoing request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    /// Absolute URL including the query string.
    pub url: String,
    pub headers: HeaderMap,
    pub body: Option<Value>,
    /// When set, failures bypass classification, notification and redirect.
    pub skip_error_handling: bool,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            skip_error_handling: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn put(url: impl Into<String>) -> Self {
        Self::new(Method::PUT, url)
    }

    pub fn patch(url: impl Into<String>) -> Self {
        Self::new(Method::PATCH, url)
    }

    pub fn delete(url: impl Into<String>) -> Self {
        Self::new(Method::DELETE, url)
    }

    pub fn with_json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Silence this request's failures (e.g. a startup "who am I" probe).
    pub fn skip_error_handling(mut self) -> Self {
        self.skip_error_handling = true;
        self
    }

    pub fn context(&self) -> RequestContext {
        RequestContext::new(self.method.as_str(), self.url.clone())
    }
}

/// A successful response.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// Deserialize the body. A missing body deserializes as JSON `null`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.body.clone().unwrap_or(Value::Null))
    }
}

/// Something that can perform a request.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RawFailure>;
}

#[async_trait]
impl<E: RequestExecutor + ?Sized> RequestExecutor for Arc<E> {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RawFailure> {
        (**self).execute(request).await
    }
}

/// Error-handling layer around an inner executor.
pub struct ErrorHandling<E> {
    inner: E,
    sink: Arc<dyn NotificationSink>,
    navigator: Arc<dyn SignInNavigator>,
    correlation_header: String,
}

/// Wrap `inner` so that all of its failures are classified and reported.
pub fn with_error_handling<E: RequestExecutor>(
    inner: E,
    sink: Arc<dyn NotificationSink>,
    navigator: Arc<dyn SignInNavigator>,
) -> ErrorHandling<E> {
    ErrorHandling::new(inner, sink, navigator)
}

impl<E: RequestExecutor> ErrorHandling<E> {
    pub fn new(
        inner: E,
        sink: Arc<dyn NotificationSink>,
        navigator: Arc<dyn SignInNavigator>,
    ) -> Self {
        Self {
            inner,
            sink,
            navigator,
            correlation_header: CORRELATION_ID_HEADER.to_string(),
        }
    }

    /// Read the correlation id from a header other than `x-correlation-id`.
    pub fn with_correlation_header(mut self, header_name: impl Into<String>) -> Self {
        self.correlation_header = header_name.into().to_ascii_lowercase();
        self
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    /// Classify a failure and run the side effects: notify, then redirect on
    /// session expiry. Returns the classified error for the caller.
    pub async fn handle_failure(&self, failure: RawFailure, context: &RequestContext) -> AppError {
        let correlation_id = match &failure {
            RawFailure::Http(http) => {
                correlation_id_from_headers(&http.headers, &self.correlation_header)
            }
            _ => None,
        };

        let error = classify(failure, context, correlation_id);
        self.sink.notify(&error);

        if error.is_session_expiry() {
            log_debug!(
                url = %context.url,
                method = %context.method,
                "Session expired during request"
            );
            self.navigator.navigate_to_sign_in().await;
        }

        error
    }
}

#[async_trait]
impl<E: RequestExecutor> RequestExecutor for ErrorHandling<E> {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RawFailure> {
        if request.skip_error_handling {
            log_debug!(
                url = %request.url,
                method = %request.method,
                "Error handling skipped for request"
            );
            return self.inner.execute(request).await;
        }

        let context = request.context();
        match self.inner.execute(request).await {
            Ok(response) => Ok(response),
            // An inner layer already reported this one.
            Err(RawFailure::Handled(error)) => Err(RawFailure::Handled(error)),
            Err(failure) => Err(RawFailure::Handled(
                self.handle_failure(failure, &context).await,
            )),
        }
    }
}
