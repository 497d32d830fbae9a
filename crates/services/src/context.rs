use std::sync::Arc;

use remote::RemoteStateClient;

use crate::Clock;
use crate::analytics::{AnalyticsEvent, AnalyticsKind, AnalyticsSink};
use crate::auth::CurrentUser;
use crate::notify::{Notification, Notifier};

/// Collaborators shared by the stores of one session.
#[derive(Clone)]
pub struct StoreContext {
    pub user: CurrentUser,
    pub remote: Arc<dyn RemoteStateClient>,
    pub notifier: Arc<dyn Notifier>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub clock: Clock,
}

impl StoreContext {
    #[must_use]
    pub fn new(
        user: CurrentUser,
        remote: Arc<dyn RemoteStateClient>,
        notifier: Arc<dyn Notifier>,
        analytics: Arc<dyn AnalyticsSink>,
        clock: Clock,
    ) -> Self {
        Self {
            user,
            remote,
            notifier,
            analytics,
            clock,
        }
    }

    pub(crate) fn info(&self, message: impl Into<String>) {
        self.notifier
            .notify(Notification::info(message, self.clock.now()));
    }

    pub(crate) fn success(&self, message: impl Into<String>) {
        self.notifier
            .notify(Notification::success(message, self.clock.now()));
    }

    pub(crate) fn error(&self, message: impl Into<String>, blocking: bool) {
        let notification = Notification::error(message, self.clock.now());
        self.notifier.notify(if blocking {
            notification.blocking()
        } else {
            notification
        });
    }

    pub(crate) fn track(&self, kind: AnalyticsKind, subject: impl Into<String>) {
        self.analytics.track(AnalyticsEvent {
            kind,
            subject: subject.into(),
            at: self.clock.now(),
        });
    }
}
