#![forbid(unsafe_code)]

pub mod analytics;
pub mod auth;
pub mod context;
pub mod error;
pub mod mutation;
pub mod notify;
pub mod progress;
pub mod saved_courses;
pub mod session;

pub use course_core::Clock;

pub use analytics::{AnalyticsEvent, AnalyticsKind, AnalyticsLog, AnalyticsSink, TracingAnalytics};
pub use auth::CurrentUser;
pub use context::StoreContext;
pub use error::{SessionError, StoreError};
pub use mutation::{MutationOutcome, MutationPhase};
pub use notify::{Notification, NotificationLevel, NotificationLog, Notifier};
pub use progress::UserProgressStore;
pub use saved_courses::SavedCoursesStore;
pub use session::UserSession;
