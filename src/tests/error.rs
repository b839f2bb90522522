// Unit Tests for the Error Taxonomy
//
// UNIT UNDER TEST: AppError, ErrorKind, ConfigError
//
// BUSINESS RESPONSIBILITY:
//   - Gives every classified failure a fixed category, severity and retry flag
//   - Keeps user-facing text separate from backend diagnostics
//   - Exposes HTTP details, field errors and the wrapped cause read-only
//   - Automatically logs errors at creation with structured context
//
// TEST COVERAGE:
//   - Category/severity/retryable tuple for every variant
//   - Status reporting (0 for network, none for unexpected)
//   - Field error access and session-expiry detection
//   - Source chain through the wrapped cause
//   - Display formatting and configuration errors

use crate::error::{
    default_messages, AppError, ConfigError, ErrorCategory, ErrorKind, ErrorOrigin,
    ErrorSeverity, FieldError, SharedCause,
};
use crate::tests::helpers::http_context;
use std::error::Error as _;
use std::sync::Arc;

#[cfg(test)]
mod app_error_categorization_tests {
    use super::*;

    fn assert_tuple(
        error: &AppError,
        category: ErrorCategory,
        severity: ErrorSeverity,
        retryable: bool,
    ) {
        assert_eq!(error.category(), category, "{} category", error.name());
        assert_eq!(error.severity(), severity, "{} severity", error.name());
        assert_eq!(error.is_retryable(), retryable, "{} retryable", error.name());
    }

    #[test]
    fn test_bad_request_is_non_retryable_validation_warning() {
        // Arrange & Act
        let error = AppError::bad_request(http_context(400), "Bad input", ErrorOrigin::default());

        // Assert
        assert_eq!(error.name(), "BadRequestError");
        assert_tuple(&error, ErrorCategory::Validation, ErrorSeverity::Warning, false);
        assert_eq!(error.status(), Some(400));
    }

    #[test]
    fn test_validation_error_carries_field_errors() {
        // Arrange
        let fields = vec![FieldError::new("email", "invalid")];

        // Act
        let error = AppError::validation(
            http_context(400),
            fields.clone(),
            "Bad input",
            ErrorOrigin::default(),
        );

        // Assert
        assert_eq!(error.name(), "ValidationError");
        assert_tuple(&error, ErrorCategory::Validation, ErrorSeverity::Warning, false);
        assert_eq!(error.field_errors(), fields.as_slice());
    }

    #[test]
    fn test_unauthorized_is_authentication_error_and_session_expiry() {
        // Arrange & Act
        let error = AppError::unauthorized(
            http_context(401),
            default_messages::UNAUTHORIZED,
            ErrorOrigin::default(),
        );

        // Assert
        assert_tuple(&error, ErrorCategory::Authentication, ErrorSeverity::Error, false);
        assert!(error.is_session_expiry());
    }

    #[test]
    fn test_forbidden_is_authorization_error() {
        let error = AppError::forbidden(http_context(403), "No", ErrorOrigin::default());

        assert_tuple(&error, ErrorCategory::Authorization, ErrorSeverity::Error, false);
        assert!(
            !error.is_session_expiry(),
            "Only 401 should force a sign-in redirect"
        );
    }

    #[test]
    fn test_not_found_is_warning() {
        let error = AppError::not_found(http_context(404), "Gone", ErrorOrigin::default());

        assert_tuple(&error, ErrorCategory::NotFound, ErrorSeverity::Warning, false);
    }

    #[test]
    fn test_conflict_shares_validation_category() {
        // Test verifies 409 stays in the validation category alongside 400

        let error = AppError::conflict(http_context(409), "Taken", ErrorOrigin::default());

        assert_eq!(error.name(), "ConflictError");
        assert_tuple(&error, ErrorCategory::Validation, ErrorSeverity::Warning, false);
    }

    #[test]
    fn test_server_error_is_critical_and_retryable_with_fixed_message() {
        // Arrange & Act
        let error = AppError::server(http_context(503), ErrorOrigin::default());

        // Assert
        assert_tuple(&error, ErrorCategory::Server, ErrorSeverity::Critical, true);
        assert_eq!(error.status(), Some(503));
        assert_eq!(error.user_message(), default_messages::SERVER);
    }

    #[test]
    fn test_network_error_has_status_zero_and_no_http_fields() {
        let error = AppError::network(ErrorOrigin::default());

        assert_tuple(&error, ErrorCategory::Network, ErrorSeverity::Error, true);
        assert_eq!(error.status(), Some(0));
        assert!(error.http().is_none(), "Network errors carry no HTTP context");
        assert_eq!(error.user_message(), default_messages::NETWORK);
    }

    #[test]
    fn test_unexpected_error_has_no_status() {
        let error = AppError::unexpected(default_messages::UNEXPECTED, ErrorOrigin::default());

        assert_tuple(&error, ErrorCategory::Unknown, ErrorSeverity::Error, false);
        assert_eq!(error.status(), None);
        assert!(error.field_errors().is_empty());
    }
}

#[cfg(test)]
mod app_error_envelope_tests {
    use super::*;

    #[test]
    fn test_correlation_id_and_cause_are_preserved() {
        // Arrange
        let cause: SharedCause = Arc::new(std::io::Error::new(
            std::io::ErrorKind::ConnectionRefused,
            "refused",
        ));
        let origin = ErrorOrigin::new(Some("abc-123".to_string()), Some(cause));

        // Act
        let error = AppError::network(origin);

        // Assert
        assert_eq!(error.correlation_id(), Some("abc-123"));
        let source = error.source().expect("cause should be exposed as source");
        assert_eq!(source.to_string(), "refused");
        assert!(error.cause().is_some());
    }

    #[test]
    fn test_missing_correlation_id_is_none() {
        let error = AppError::network(ErrorOrigin::default());

        assert_eq!(error.correlation_id(), None);
        assert!(error.source().is_none());
    }

    #[test]
    fn test_display_uses_name_and_user_message() {
        let error = AppError::not_found(
            http_context(404),
            default_messages::NOT_FOUND,
            ErrorOrigin::default(),
        );

        assert_eq!(
            error.to_string(),
            "NotFoundError: The requested resource was not found."
        );
    }

    #[test]
    fn test_http_context_keeps_request_details() {
        // Arrange
        let mut http = http_context(404);
        http.status_text = "Not Found".to_string();
        http.backend_body = Some(serde_json::json!({"internal": "trace"}));

        // Act
        let error = AppError::not_found(http, "Missing", ErrorOrigin::default());

        // Assert
        let http = error.http().expect("HTTP context");
        assert_eq!(http.url, "https://api.example.com/users?page=2");
        assert_eq!(http.method, "POST");
        assert_eq!(http.status_text, "Not Found");
        assert!(
            !error.user_message().contains("trace"),
            "Backend body should never leak into the user message"
        );
    }

    #[test]
    fn test_clone_keeps_identity_fields() {
        // Test verifies a cloned error (as handed to sinks) is indistinguishable

        let error = AppError::server(http_context(500), ErrorOrigin::default());
        let copy = error.clone();

        assert_eq!(copy.timestamp(), error.timestamp());
        assert_eq!(copy.kind(), error.kind());
        assert_eq!(copy.user_message(), error.user_message());
    }

    #[test]
    fn test_kind_exposes_http_only_for_response_variants() {
        assert!(ErrorKind::Server(http_context(502)).http().is_some());
        assert!(ErrorKind::Network.http().is_none());
        assert!(ErrorKind::Unexpected.http().is_none());
    }

    #[test]
    fn test_category_serializes_in_screaming_case() {
        let json = serde_json::to_string(&ErrorCategory::NotFound).unwrap();
        assert_eq!(json, "\"NOT_FOUND\"");

        let json = serde_json::to_string(&ErrorSeverity::Critical).unwrap();
        assert_eq!(json, "\"CRITICAL\"");
    }
}

#[cfg(test)]
mod config_error_tests {
    use super::*;

    #[test]
    fn test_invalid_value_message_names_the_key() {
        let error = ConfigError::invalid_value("API_TIMEOUT_SECS", "'abc': invalid digit");

        assert_eq!(
            error.to_string(),
            "Invalid value for API_TIMEOUT_SECS: 'abc': invalid digit"
        );
    }

    #[test]
    fn test_validation_failed_message() {
        let error = ConfigError::validation_failed("Request timeout must be greater than zero");

        assert!(matches!(error, ConfigError::ValidationFailed { .. }));
        assert!(error.to_string().contains("greater than zero"));
    }
}
