//! Test helper utilities for api-error-pipeline integration tests
//!
//! Builds a fully wired client (HTTP transport, toast queue, locale-aware
//! navigator) against a wiremock server.
//!
//! IMPORTANT: These helpers are test-only and should NEVER be used in production code.

// Allow dead code in test utilities - functions are used across different test files
#![allow(dead_code)]

use api_error_pipeline::{ApiClient, ClientConfig, LocaleNavigator, Router, ToastQueue};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Router recording every path it was asked to open
#[derive(Default)]
pub struct RecordingRouter {
    paths: Mutex<Vec<String>>,
}

impl RecordingRouter {
    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Router for RecordingRouter {
    async fn navigate_by_url(&self, path: String) {
        self.paths.lock().expect("lock").push(path);
    }
}

/// Everything a test needs to observe the pipeline's side effects
pub struct TestApp {
    pub client: ApiClient,
    pub toasts: Arc<ToastQueue>,
    pub router: Arc<RecordingRouter>,
}

/// Configuration pointing at `base_url` with a short timeout
pub fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        request_timeout: Duration::from_secs(5),
        ..ClientConfig::default()
    }
}

pub fn create_test_app(base_url: &str) -> TestApp {
    create_test_app_with(test_config(base_url))
}

pub fn create_test_app_with(config: ClientConfig) -> TestApp {
    let toasts = Arc::new(ToastQueue::default());
    let router = Arc::new(RecordingRouter::default());
    let navigator = Arc::new(LocaleNavigator::from_config(router.clone(), &config));
    let client = ApiClient::from_config(&config, toasts.clone(), navigator)
        .expect("test configuration should be valid");

    TestApp {
        client,
        toasts,
        router,
    }
}
