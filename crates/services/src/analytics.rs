//! Product analytics for user actions on course state.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalyticsKind {
    Saved,
    Unsaved,
    AttemptedWhileSignedOut,
    Enrolled,
    LessonCompleted,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyticsEvent {
    pub kind: AnalyticsKind,
    /// Course name or slug the action was about.
    pub subject: String,
    pub at: DateTime<Utc>,
}

pub trait AnalyticsSink: Send + Sync {
    fn track(&self, event: AnalyticsEvent);
}

/// In-memory event buffer.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsLog {
    events: Arc<Mutex<Vec<AnalyticsEvent>>>,
}

impl AnalyticsLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn events(&self) -> Vec<AnalyticsEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<AnalyticsKind> {
        self.events().into_iter().map(|e| e.kind).collect()
    }
}

impl AnalyticsSink for AnalyticsLog {
    fn track(&self, event: AnalyticsEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalytics;

impl AnalyticsSink for TracingAnalytics {
    fn track(&self, event: AnalyticsEvent) {
        debug!(kind = ?event.kind, subject = %event.subject, at = %event.at, "analytics");
    }
}
