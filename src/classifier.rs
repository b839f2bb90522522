//! Failure classification.
//!
//! [`classify`] is a total function from whatever went wrong with a request to
//! exactly one [`AppError`]:
//!
//! - an already classified error comes back unchanged,
//! - an HTTP failure is dispatched on its status code,
//! - anything else becomes an unexpected error wrapping the original.
//!
//! ```rust
//! use api_error_pipeline::classifier::{classify, HttpFailure, RawFailure, RequestContext};
//! use api_error_pipeline::error::ErrorCategory;
//!
//! let context = RequestContext::new("get", "https://api.example.com/users/42");
//! let failure = RawFailure::from(HttpFailure::new(404, "Not Found"));
//!
//! let error = classify(failure, &context, None);
//! assert_eq!(error.name(), "NotFoundError");
//! assert_eq!(error.category(), ErrorCategory::NotFound);
//! assert_eq!(error.http().map(|http| http.method.as_str()), Some("GET"));
//! ```

use crate::error::{
    default_messages, AppError, ErrorOrigin, FieldError, HttpErrorContext, SharedCause,
};
use crate::logging::log_trace;
use crate::payload::{normalize, BackendErrorPayload};
use reqwest::header::HeaderMap;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Response header conventionally carrying the backend correlation id.
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// A request that failed at the transport level.
///
/// Status 0 means no response reached the client (connection refused, DNS,
/// timeout, blocked by the environment).
#[derive(Error, Debug, Clone)]
#[error("HTTP request failed with status {status}")]
pub struct HttpFailure {
    pub status: u16,
    pub status_text: String,
    /// Decoded error body, if the response had one.
    pub body: Option<Value>,
    pub headers: HeaderMap,
    #[source]
    pub source: Option<SharedCause>,
}

impl HttpFailure {
    pub fn new(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            body: None,
            headers: HeaderMap::new(),
            source: None,
        }
    }

    /// Failure where no response was received.
    pub fn network(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            source: Some(Arc::new(source)),
            ..Self::new(0, "")
        }
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }
}

/// Anything a request can fail with before classification.
#[derive(Error, Debug)]
pub enum RawFailure {
    /// Transport-level failure carrying a status code.
    #[error(transparent)]
    Http(#[from] HttpFailure),

    /// Already classified, but not yet reported to the user.
    #[error(transparent)]
    Classified(#[from] AppError),

    /// Classified and already reported by an error-handling layer. Outer
    /// layers pass it through without repeating side effects.
    #[error(transparent)]
    Handled(AppError),

    /// Any other failure.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl RawFailure {
    pub fn as_app_error(&self) -> Option<&AppError> {
        match self {
            Self::Classified(error) | Self::Handled(error) => Some(error),
            _ => None,
        }
    }

    /// Whether an error-handling layer already notified and redirected.
    pub fn is_handled(&self) -> bool {
        matches!(self, Self::Handled(_))
    }

    pub fn into_app_error(self) -> Option<AppError> {
        match self {
            Self::Classified(error) | Self::Handled(error) => Some(error),
            _ => None,
        }
    }
}

/// The parts of the outgoing request the classifier records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Full URL including the query string.
    pub url: String,
    /// Uppercase HTTP verb.
    pub method: String,
}

impl RequestContext {
    pub fn new(method: impl AsRef<str>, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: method.as_ref().to_ascii_uppercase(),
        }
    }
}

/// Read the correlation id from response headers. Blank or non UTF-8 values
/// are ignored.
pub fn correlation_id_from_headers(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Map a raw failure to exactly one [`AppError`]. Never panics.
///
/// `correlation_id` is passed through as given; the classifier never invents
/// one.
pub fn classify(
    failure: RawFailure,
    context: &RequestContext,
    correlation_id: Option<String>,
) -> AppError {
    match failure {
        RawFailure::Classified(error) | RawFailure::Handled(error) => error,
        RawFailure::Http(failure) => classify_http(failure, context, correlation_id),
        RawFailure::Other(error) => {
            let cause: Box<dyn std::error::Error + Send + Sync + 'static> = error.into();
            AppError::unexpected(
                default_messages::UNEXPECTED,
                ErrorOrigin::new(correlation_id, Some(SharedCause::from(cause))),
            )
        }
    }
}

fn classify_http(
    failure: HttpFailure,
    context: &RequestContext,
    correlation_id: Option<String>,
) -> AppError {
    let status = failure.status;
    let payload = normalize(failure.body.as_ref());

    log_trace!(
        status = status,
        url = %context.url,
        method = %context.method,
        has_body = failure.body.is_some(),
        "Classifying HTTP failure"
    );

    let http = HttpErrorContext {
        status,
        status_text: failure.status_text.clone(),
        url: context.url.clone(),
        method: context.method.clone(),
        backend_body: failure.body.clone(),
    };
    let origin = ErrorOrigin::new(correlation_id, Some(Arc::new(failure)));

    match status {
        0 => AppError::network(origin),
        400 => classify_bad_request(http, &payload, origin),
        401 => AppError::unauthorized(
            http,
            user_message(&payload, default_messages::UNAUTHORIZED),
            origin,
        ),
        403 => AppError::forbidden(
            http,
            user_message(&payload, default_messages::FORBIDDEN),
            origin,
        ),
        404 => AppError::not_found(
            http,
            user_message(&payload, default_messages::NOT_FOUND),
            origin,
        ),
        409 => AppError::conflict(
            http,
            user_message(&payload, default_messages::CONFLICT),
            origin,
        ),
        500..=599 => AppError::server(http, origin),
        _ => AppError::unexpected(default_messages::UNEXPECTED, origin),
    }
}

/// A 400 becomes a validation error only when the backend sent a usable
/// per-field list; anything else degrades to a plain bad request.
fn classify_bad_request(
    http: HttpErrorContext,
    payload: &BackendErrorPayload,
    origin: ErrorOrigin,
) -> AppError {
    let message = user_message(payload, default_messages::BAD_REQUEST);
    match extract_field_errors(payload.details.as_ref()) {
        Some(field_errors) => AppError::validation(http, field_errors, message, origin),
        None => AppError::bad_request(http, message, origin),
    }
}

/// Collect `{ field, message }` entries from the backend `errors` value.
///
/// Malformed entries are skipped. Returns `None` unless `details` is an array
/// with at least one well-formed entry.
pub fn extract_field_errors(details: Option<&Value>) -> Option<Vec<FieldError>> {
    let entries = details?.as_array()?;
    let field_errors: Vec<FieldError> = entries.iter().filter_map(field_error).collect();
    if field_errors.is_empty() {
        None
    } else {
        Some(field_errors)
    }
}

fn field_error(entry: &Value) -> Option<FieldError> {
    let field = entry.get("field")?.as_str()?;
    let message = entry.get("message")?.as_str()?;
    Some(FieldError::new(field, message))
}

fn user_message(payload: &BackendErrorPayload, fallback: &str) -> String {
    payload
        .display_message()
        .unwrap_or_else(|| fallback.to_string())
}
