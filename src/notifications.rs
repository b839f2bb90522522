//! User-visible notifications for classified failures.
//!
//! The pipeline only depends on [`NotificationSink`]. [`ToastQueue`] is the
//! in-memory implementation a front end renders from: every call appends one
//! toast, toasts are addressed by a monotonically increasing id starting at 1,
//! and each one expires after a delay that depends on its kind.

use crate::error::{AppError, ErrorSeverity};
use crate::logging::log_debug;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Receives every classified failure the pipeline observes.
///
/// Implementations must not block and must not panic.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send + Sync {
    fn notify(&self, error: &AppError);
}

/// Visual style of a toast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Info,
    Warning,
    Error,
}

impl ToastKind {
    pub fn from_severity(severity: ErrorSeverity) -> Self {
        match severity {
            ErrorSeverity::Info => Self::Info,
            ErrorSeverity::Warning => Self::Warning,
            ErrorSeverity::Error | ErrorSeverity::Critical => Self::Error,
        }
    }
}

/// How long each kind of toast stays up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToastDurations {
    pub success: Duration,
    pub info: Duration,
    pub warning: Duration,
    pub error: Duration,
    /// Errors with critical severity stay up longer than ordinary errors.
    pub critical: Duration,
}

impl Default for ToastDurations {
    fn default() -> Self {
        Self {
            success: Duration::seconds(3),
            info: Duration::seconds(4),
            warning: Duration::seconds(5),
            error: Duration::seconds(6),
            critical: Duration::seconds(8),
        }
    }
}

impl ToastDurations {
    pub fn for_kind(&self, kind: ToastKind) -> Duration {
        match kind {
            ToastKind::Success => self.success,
            ToastKind::Info => self.info,
            ToastKind::Warning => self.warning,
            ToastKind::Error => self.error,
        }
    }

    fn for_severity(&self, severity: ErrorSeverity) -> Duration {
        match severity {
            ErrorSeverity::Critical => self.critical,
            other => self.for_kind(ToastKind::from_severity(other)),
        }
    }
}

/// One queued notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Toast {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug)]
struct QueueState {
    next_id: u64,
    toasts: Vec<Toast>,
}

/// In-memory toast queue.
#[derive(Debug)]
pub struct ToastQueue {
    durations: ToastDurations,
    state: Mutex<QueueState>,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new(ToastDurations::default())
    }
}

impl ToastQueue {
    pub fn new(durations: ToastDurations) -> Self {
        Self {
            durations,
            state: Mutex::new(QueueState {
                next_id: 1,
                toasts: Vec::new(),
            }),
        }
    }

    // A panic while holding the lock cannot leave the queue half-updated,
    // so a poisoned lock is still safe to use.
    fn state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queue a toast and return its id.
    pub fn push(&self, kind: ToastKind, message: impl Into<String>) -> u64 {
        self.push_at(kind, message.into(), self.durations.for_kind(kind), Utc::now())
    }

    pub fn success(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Success, message)
    }

    pub fn info(&self, message: impl Into<String>) -> u64 {
        self.push(ToastKind::Info, message)
    }

    fn push_at(
        &self,
        kind: ToastKind,
        message: String,
        lifetime: Duration,
        now: DateTime<Utc>,
    ) -> u64 {
        let mut state = self.state();
        let id = state.next_id;
        state.next_id += 1;

        log_debug!(
            toast_id = id,
            kind = ?kind,
            lifetime_ms = lifetime.num_milliseconds(),
            "Toast queued"
        );

        state.toasts.push(Toast {
            id,
            kind,
            message,
            created_at: now,
            expires_at: now + lifetime,
        });
        id
    }

    /// Remove a toast. Returns false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut state = self.state();
        let before = state.toasts.len();
        state.toasts.retain(|toast| toast.id != id);
        before != state.toasts.len()
    }

    pub fn clear(&self) {
        self.state().toasts.clear();
    }

    /// Drop toasts that expired by `now` and return the rest, oldest first.
    pub fn visible_at(&self, now: DateTime<Utc>) -> Vec<Toast> {
        let mut state = self.state();
        state.toasts.retain(|toast| !toast.is_expired_at(now));
        state.toasts.clone()
    }

    /// Everything currently queued, expired or not.
    pub fn snapshot(&self) -> Vec<Toast> {
        self.state().toasts.clone()
    }

    pub fn len(&self) -> usize {
        self.state().toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl NotificationSink for ToastQueue {
    fn notify(&self, error: &AppError) {
        let severity = error.severity();
        self.push_at(
            ToastKind::from_severity(severity),
            error.user_message().to_string(),
            self.durations.for_severity(severity),
            Utc::now(),
        );
    }
}
