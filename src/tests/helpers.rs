//! Test helper utilities for api-error-pipeline tests
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use crate::classifier::{HttpFailure, RawFailure, RequestContext};
use crate::error::HttpErrorContext;
use crate::navigation::SignInNavigator;
use crate::notifications::NotificationSink;
use crate::pipeline::{ApiRequest, ApiResponse, RequestExecutor};
use crate::AppError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

pub const TEST_URL: &str = "https://api.example.com/users?page=2";

/// Request context used by most classifier tests
pub fn request_context() -> RequestContext {
    RequestContext::new("post", TEST_URL)
}

/// HTTP failure with a JSON body
pub fn http_failure(status: u16, body: Value) -> RawFailure {
    RawFailure::Http(HttpFailure::new(status, "").with_body(body))
}

/// HTTP failure carrying an `x-correlation-id` header
pub fn http_failure_with_correlation(status: u16, correlation_id: &str) -> RawFailure {
    let mut headers = HeaderMap::new();
    headers.insert(
        "x-correlation-id",
        HeaderValue::from_str(correlation_id).expect("valid header value"),
    );
    RawFailure::Http(HttpFailure::new(status, "").with_headers(headers))
}

pub fn http_context(status: u16) -> HttpErrorContext {
    HttpErrorContext {
        status,
        status_text: String::new(),
        url: TEST_URL.to_string(),
        method: "POST".to_string(),
        backend_body: None,
    }
}

pub fn ok_response(body: Value) -> ApiResponse {
    ApiResponse {
        status: 200,
        headers: HeaderMap::new(),
        body: Some(body),
    }
}

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse, RawFailure> + Send + Sync;

/// Executor returning whatever its responder produces
pub struct StubExecutor {
    responder: Box<Responder>,
    calls: AtomicU32,
    last_request: Mutex<Option<ApiRequest>>,
}

impl StubExecutor {
    pub fn new(
        responder: impl Fn(&ApiRequest) -> Result<ApiResponse, RawFailure> + Send + Sync + 'static,
    ) -> Self {
        Self {
            responder: Box::new(responder),
            calls: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    pub fn failing_with_status(status: u16, body: Value) -> Self {
        Self::new(move |_| Err(http_failure(status, body.clone())))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<ApiRequest> {
        self.last_request.lock().expect("lock").clone()
    }
}

#[async_trait]
impl RequestExecutor for StubExecutor {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, RawFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let result = (self.responder)(&request);
        *self.last_request.lock().expect("lock") = Some(request);
        result
    }
}

/// Records side effects in the order they happen
#[derive(Default)]
pub struct EventLog {
    events: Mutex<Vec<String>>,
}

impl EventLog {
    pub fn record(&self, event: impl Into<String>) {
        self.events.lock().expect("lock").push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().expect("lock").clone()
    }
}

/// Sink writing `notify:<ErrorName>` to a shared log
pub struct RecordingSink {
    pub log: Arc<EventLog>,
    pub errors: Mutex<Vec<AppError>>,
}

impl RecordingSink {
    pub fn new(log: Arc<EventLog>) -> Self {
        Self {
            log,
            errors: Mutex::new(Vec::new()),
        }
    }

    pub fn errors(&self) -> Vec<AppError> {
        self.errors.lock().expect("lock").clone()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, error: &AppError) {
        self.log.record(format!("notify:{}", error.name()));
        self.errors.lock().expect("lock").push(error.clone());
    }
}

/// Navigator writing `navigate` to a shared log
pub struct RecordingNavigator {
    pub log: Arc<EventLog>,
}

#[async_trait]
impl SignInNavigator for RecordingNavigator {
    async fn navigate_to_sign_in(&self) {
        self.log.record("navigate");
    }
}
