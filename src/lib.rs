//! # api-error-pipeline
//!
//! HTTP error classification and propagation for admin API clients.
//!
//! ## Key Features
//!
//! - **Single interception point**: every request runs through [`ErrorHandling`]
//! - **Closed taxonomy**: each failure becomes exactly one [`AppError`] kind
//! - **Defensive payload parsing**: backend error bodies of any shape are tolerated
//! - **Consistent side effects**: one notification per failure, redirect to sign-in on 401
//! - **Per-request opt-out**: expected failures can skip all of the above
//!
//! ## Example
//!
//! ```rust,no_run
//! use api_error_pipeline::{
//!     ApiClient, ClientConfig, LocaleNavigator, RawFailure, RequestOptions, Router, ToastQueue,
//! };
//! use std::sync::Arc;
//!
//! struct LogRouter;
//!
//! #[async_trait::async_trait]
//! impl Router for LogRouter {
//!     async fn navigate_by_url(&self, path: String) {
//!         println!("navigate to {path}");
//!     }
//! }
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ClientConfig::from_env()?;
//! let toasts = Arc::new(ToastQueue::default());
//! let navigator = Arc::new(LocaleNavigator::from_config(Arc::new(LogRouter), &config));
//! let client = ApiClient::from_config(&config, toasts.clone(), navigator)?;
//!
//! match client.get::<serde_json::Value>("users", RequestOptions::default()).await {
//!     Ok(users) => println!("{users}"),
//!     Err(RawFailure::Handled(err)) if !err.field_errors().is_empty() => {
//!         // highlight err.field_errors() in the form
//!     }
//!     Err(_) => {
//!         // already shown to the user as a toast
//!     }
//! }
//! # Ok(())
//! # }
//! ```

// Allow missing errors documentation - errors are self-documenting via type signatures
#![allow(clippy::missing_errors_doc)]

// Logging utilities (re-exports tracing with log_* naming) - internal only
pub(crate) mod logging;

pub mod classifier;
pub mod client;
pub mod config;
pub mod error;
pub mod navigation;
pub mod notifications;
pub mod payload;
pub mod pipeline;
pub mod transport;

#[cfg(test)]
pub mod tests;

// Re-export main types
pub use classifier::{classify, HttpFailure, RawFailure, RequestContext};
pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::{
    AppError, ConfigError, ConfigResult, ErrorCategory, ErrorKind, ErrorSeverity, FieldError,
    HttpErrorContext,
};
pub use navigation::{LocaleNavigator, Router, SignInNavigator};
pub use notifications::{NotificationSink, Toast, ToastKind, ToastQueue};
pub use payload::{normalize, BackendErrorPayload, BackendMessage};
pub use pipeline::{with_error_handling, ApiRequest, ApiResponse, ErrorHandling, RequestExecutor};
pub use transport::HttpTransport;
