//! Error taxonomy for failed API requests.
//!
//! Every failure that passes through the error-handling pipeline is turned into
//! exactly one [`AppError`]. The envelope carries the fields every failure has
//! (timestamp, user-facing message, correlation id, wrapped cause) while the
//! variant-specific data lives in [`ErrorKind`].
//!
//! # Variants
//!
//! | Kind | Status | Category | Severity | Retryable |
//! |------|--------|----------|----------|-----------|
//! | `BadRequest` | 400 | Validation | Warning | No |
//! | `Validation` | 400 | Validation | Warning | No |
//! | `Unauthorized` | 401 | Authentication | Error | No |
//! | `Forbidden` | 403 | Authorization | Error | No |
//! | `NotFound` | 404 | NotFound | Warning | No |
//! | `Conflict` | 409 | Validation | Warning | No |
//! | `Server` | 5xx | Server | Critical | Yes |
//! | `Network` | 0 | Network | Error | Yes |
//! | `Unexpected` | - | Unknown | Error | No |
//!
//! # Example
//!
//! ```rust
//! use api_error_pipeline::error::{AppError, ErrorCategory, ErrorOrigin};
//!
//! let err = AppError::network(ErrorOrigin::default());
//! assert_eq!(err.category(), ErrorCategory::Network);
//! assert!(err.is_retryable());
//! assert_eq!(err.status(), Some(0));
//! ```

use crate::logging::{log_error, log_info, log_warn};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// The original failure wrapped by an [`AppError`].
///
/// Shared rather than boxed so that an error can be handed to the notification
/// sink and still be re-raised to the caller.
pub type SharedCause = Arc<dyn std::error::Error + Send + Sync + 'static>;

/// Fixed user-facing messages used when the backend provides nothing usable.
pub mod default_messages {
    pub const BAD_REQUEST: &str = "The request could not be processed. Please check your input.";
    pub const UNAUTHORIZED: &str = "Your session has expired. Please sign in again.";
    pub const FORBIDDEN: &str = "You do not have permission to perform this action.";
    pub const NOT_FOUND: &str = "The requested resource was not found.";
    pub const CONFLICT: &str = "The request conflicts with the current state of the resource.";
    pub const SERVER: &str = "The server encountered an error. Please try again later.";
    pub const NETWORK: &str = "Unable to reach the server. Please check your internet connection.";
    pub const UNEXPECTED: &str = "An unexpected error occurred. Please try again.";
}

// ============================================================================
// Error categorization types
// ============================================================================

/// High-level categorization used for routing and display decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    /// The request was rejected because of its input (400, 409).
    Validation,
    /// The caller is not signed in or the session expired (401).
    Authentication,
    /// The caller is signed in but not allowed to do this (403).
    Authorization,
    /// The addressed resource does not exist (404).
    NotFound,
    /// No response reached the client.
    Network,
    /// The backend failed (5xx).
    Server,
    /// Anything the classifier could not place.
    Unknown,
}

/// Severity level, used for logging and for styling the notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorSeverity {
    /// Informational, nothing went wrong from the user's point of view.
    Info,
    /// The user can fix this (bad input, missing resource).
    Warning,
    /// The action failed.
    Error,
    /// The backend is broken. Needs attention beyond the current user.
    Critical,
}

/// One invalid input field reported by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// HTTP details attached to every error that came back with a response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpErrorContext {
    /// HTTP status code of the failed response.
    pub status: u16,
    /// Reason phrase, may be empty.
    pub status_text: String,
    /// Full request URL including the query string.
    pub url: String,
    /// Uppercase HTTP verb.
    pub method: String,
    /// Raw error body, kept for diagnostics. Never shown to users.
    pub backend_body: Option<serde_json::Value>,
}

// ============================================================================
// Error kinds
// ============================================================================

/// The closed set of classified failures.
#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    /// 400 without a usable per-field breakdown.
    BadRequest(HttpErrorContext),
    /// 400 with a per-field breakdown from the backend.
    Validation {
        http: HttpErrorContext,
        field_errors: Vec<FieldError>,
    },
    /// 401, the session is gone.
    Unauthorized(HttpErrorContext),
    /// 403
    Forbidden(HttpErrorContext),
    /// 404
    NotFound(HttpErrorContext),
    /// 409
    Conflict(HttpErrorContext),
    /// Any 5xx. The actual status is kept in the context.
    Server(HttpErrorContext),
    /// No response reached the client (status 0).
    Network,
    /// Universal fallback.
    Unexpected,
}

impl ErrorKind {
    /// Discriminant name of the variant.
    pub fn name(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BadRequestError",
            Self::Validation { .. } => "ValidationError",
            Self::Unauthorized(_) => "UnauthorizedError",
            Self::Forbidden(_) => "ForbiddenError",
            Self::NotFound(_) => "NotFoundError",
            Self::Conflict(_) => "ConflictError",
            Self::Server(_) => "ServerError",
            Self::Network => "NetworkError",
            Self::Unexpected => "UnexpectedError",
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::BadRequest(_) => ErrorCategory::Validation,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Unauthorized(_) => ErrorCategory::Authentication,
            Self::Forbidden(_) => ErrorCategory::Authorization,
            Self::NotFound(_) => ErrorCategory::NotFound,
            // Kept alongside bad requests: the caller has to change its input.
            Self::Conflict(_) => ErrorCategory::Validation,
            Self::Server(_) => ErrorCategory::Server,
            Self::Network => ErrorCategory::Network,
            Self::Unexpected => ErrorCategory::Unknown,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::BadRequest(_) => ErrorSeverity::Warning,
            Self::Validation { .. } => ErrorSeverity::Warning,
            Self::Unauthorized(_) => ErrorSeverity::Error,
            Self::Forbidden(_) => ErrorSeverity::Error,
            Self::NotFound(_) => ErrorSeverity::Warning,
            Self::Conflict(_) => ErrorSeverity::Warning,
            Self::Server(_) => ErrorSeverity::Critical,
            Self::Network => ErrorSeverity::Error,
            Self::Unexpected => ErrorSeverity::Error,
        }
    }

    /// Whether attempting the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Server(_) | Self::Network)
    }

    /// HTTP details, for the variants that carry them.
    pub fn http(&self) -> Option<&HttpErrorContext> {
        match self {
            Self::BadRequest(http)
            | Self::Validation { http, .. }
            | Self::Unauthorized(http)
            | Self::Forbidden(http)
            | Self::NotFound(http)
            | Self::Conflict(http)
            | Self::Server(http) => Some(http),
            Self::Network | Self::Unexpected => None,
        }
    }
}

// ============================================================================
// AppError envelope
// ============================================================================

/// Where a classified error came from: the correlation id returned by the
/// backend and the original failure.
#[derive(Debug, Clone, Default)]
pub struct ErrorOrigin {
    pub correlation_id: Option<String>,
    pub cause: Option<SharedCause>,
}

impl ErrorOrigin {
    pub fn new(correlation_id: Option<String>, cause: Option<SharedCause>) -> Self {
        Self {
            correlation_id,
            cause,
        }
    }
}

/// A classified request failure.
///
/// Immutable once constructed: all fields are private and only readable
/// through accessors. Use the constructor methods, which log the error at a
/// level matching its severity.
#[derive(Error, Debug, Clone)]
#[error("{}: {}", .kind.name(), .user_message)]
pub struct AppError {
    kind: ErrorKind,
    timestamp: DateTime<Utc>,
    user_message: String,
    correlation_id: Option<String>,
    #[source]
    cause: Option<SharedCause>,
}

impl AppError {
    fn build(kind: ErrorKind, user_message: String, origin: ErrorOrigin) -> Self {
        let error = Self {
            kind,
            timestamp: Utc::now(),
            user_message,
            correlation_id: origin.correlation_id,
            cause: origin.cause,
        };
        error.log_created();
        error
    }

    fn log_created(&self) {
        let error_type = self.name();
        let category = self.category();
        let status = self.status();
        let correlation_id = self.correlation_id.as_deref().unwrap_or("");
        match self.severity() {
            ErrorSeverity::Critical | ErrorSeverity::Error => log_error!(
                error_type = error_type,
                category = ?category,
                status = ?status,
                correlation_id = correlation_id,
                user_message = %self.user_message,
                "Request failure classified"
            ),
            ErrorSeverity::Warning => log_warn!(
                error_type = error_type,
                category = ?category,
                status = ?status,
                correlation_id = correlation_id,
                user_message = %self.user_message,
                "Request failure classified"
            ),
            ErrorSeverity::Info => log_info!(
                error_type = error_type,
                category = ?category,
                status = ?status,
                correlation_id = correlation_id,
                "Request failure classified"
            ),
        }
    }

    // =========================================================================
    // Constructor methods with automatic logging
    // =========================================================================

    pub fn bad_request(
        http: HttpErrorContext,
        user_message: impl Into<String>,
        origin: ErrorOrigin,
    ) -> Self {
        Self::build(ErrorKind::BadRequest(http), user_message.into(), origin)
    }

    pub fn validation(
        http: HttpErrorContext,
        field_errors: Vec<FieldError>,
        user_message: impl Into<String>,
        origin: ErrorOrigin,
    ) -> Self {
        Self::build(
            ErrorKind::Validation { http, field_errors },
            user_message.into(),
            origin,
        )
    }

    pub fn unauthorized(
        http: HttpErrorContext,
        user_message: impl Into<String>,
        origin: ErrorOrigin,
    ) -> Self {
        Self::build(ErrorKind::Unauthorized(http), user_message.into(), origin)
    }

    pub fn forbidden(
        http: HttpErrorContext,
        user_message: impl Into<String>,
        origin: ErrorOrigin,
    ) -> Self {
        Self::build(ErrorKind::Forbidden(http), user_message.into(), origin)
    }

    pub fn not_found(
        http: HttpErrorContext,
        user_message: impl Into<String>,
        origin: ErrorOrigin,
    ) -> Self {
        Self::build(ErrorKind::NotFound(http), user_message.into(), origin)
    }

    pub fn conflict(
        http: HttpErrorContext,
        user_message: impl Into<String>,
        origin: ErrorOrigin,
    ) -> Self {
        Self::build(ErrorKind::Conflict(http), user_message.into(), origin)
    }

    /// Server failure. Uses the fixed server message: backend 5xx text is
    /// treated as internal.
    pub fn server(http: HttpErrorContext, origin: ErrorOrigin) -> Self {
        Self::build(
            ErrorKind::Server(http),
            default_messages::SERVER.to_string(),
            origin,
        )
    }

    /// No response reached the client.
    pub fn network(origin: ErrorOrigin) -> Self {
        Self::build(
            ErrorKind::Network,
            default_messages::NETWORK.to_string(),
            origin,
        )
    }

    pub fn unexpected(user_message: impl Into<String>, origin: ErrorOrigin) -> Self {
        Self::build(ErrorKind::Unexpected, user_message.into(), origin)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Message that is safe to render to end users.
    pub fn user_message(&self) -> &str {
        &self.user_message
    }

    pub fn category(&self) -> ErrorCategory {
        self.kind.category()
    }

    pub fn severity(&self) -> ErrorSeverity {
        self.kind.severity()
    }

    /// Advisory only. Nothing in this crate retries.
    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn cause(&self) -> Option<&SharedCause> {
        self.cause.as_ref()
    }

    pub fn http(&self) -> Option<&HttpErrorContext> {
        self.kind.http()
    }

    /// HTTP status: `Some(0)` for network failures, `None` for unexpected ones.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::Network => Some(0),
            kind => kind.http().map(|http| http.status),
        }
    }

    /// Per-field problems. Empty unless this is a validation error.
    pub fn field_errors(&self) -> &[FieldError] {
        match &self.kind {
            ErrorKind::Validation { field_errors, .. } => field_errors,
            _ => &[],
        }
    }

    /// True for the failure that forces the user back to sign-in.
    pub fn is_session_expiry(&self) -> bool {
        matches!(self.kind, ErrorKind::Unauthorized(_))
    }
}

// ============================================================================
// Configuration errors
// ============================================================================

/// Result alias for configuration loading and validation.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or validating [`ClientConfig`](crate::config::ClientConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A setting could not be parsed.
    #[error("Invalid value for {key}: {message}")]
    InvalidValue {
        /// Name of the setting or environment variable.
        key: String,
        /// What was wrong with it.
        message: String,
    },

    /// The settings parsed but are not usable together.
    #[error("Configuration validation failed: {message}")]
    ValidationFailed {
        /// Description of the problem.
        message: String,
    },
}

impl ConfigError {
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        let key = key.into();
        let message = message.into();
        log_error!(
            error_type = "invalid_value",
            key = %key,
            message = %message,
            "Client configuration value invalid"
        );
        Self::InvalidValue { key, message }
    }

    pub fn validation_failed(message: impl Into<String>) -> Self {
        let message = message.into();
        log_error!(
            error_type = "validation_failed",
            message = %message,
            "Client configuration validation failed"
        );
        Self::ValidationFailed { message }
    }
}
