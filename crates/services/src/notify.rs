//! User-visible notifications (toasts and alerts).

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// Must be acknowledged by the user instead of fading out.
    pub blocking: bool,
    pub at: DateTime<Utc>,
}

impl Notification {
    #[must_use]
    pub fn info(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(NotificationLevel::Info, message, at)
    }

    #[must_use]
    pub fn success(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(NotificationLevel::Success, message, at)
    }

    #[must_use]
    pub fn error(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self::new(NotificationLevel::Error, message, at)
    }

    #[must_use]
    pub fn blocking(mut self) -> Self {
        self.blocking = true;
        self
    }

    fn new(level: NotificationLevel, message: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            level,
            message: message.into(),
            blocking: false,
            at,
        }
    }
}

/// Where stores send user-facing messages.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Collects notifications in memory, e.g. for a UI to drain or for tests.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Arc<Mutex<Vec<Notification>>>,
}

impl NotificationLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Notification> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes and returns everything collected so far.
    pub fn drain(&self) -> Vec<Notification> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

impl Notifier for NotificationLog {
    fn notify(&self, notification: Notification) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notification);
    }
}
