use std::sync::Arc;

use course_core::User;
use remote::RemoteStateClient;
use tracing::info;

use crate::Clock;
use crate::analytics::AnalyticsSink;
use crate::auth::CurrentUser;
use crate::context::StoreContext;
use crate::error::SessionError;
use crate::notify::Notifier;
use crate::progress::UserProgressStore;
use crate::saved_courses::SavedCoursesStore;

/// Owns the course-state stores for one signed-in user.
///
/// Consumers get the stores from here instead of from globals. `end` tears
/// them down so no state leaks into the next session.
#[derive(Clone)]
pub struct UserSession {
    user: CurrentUser,
    saved_courses: Arc<SavedCoursesStore>,
    progress: Arc<UserProgressStore>,
}

impl UserSession {
    #[must_use]
    pub fn new(
        remote: Arc<dyn RemoteStateClient>,
        notifier: Arc<dyn Notifier>,
        analytics: Arc<dyn AnalyticsSink>,
        clock: Clock,
    ) -> Self {
        let user = CurrentUser::signed_out();
        let ctx = StoreContext::new(user.clone(), remote, notifier, analytics, clock);
        Self {
            user,
            saved_courses: Arc::new(SavedCoursesStore::new(ctx.clone())),
            progress: Arc::new(UserProgressStore::new(ctx)),
        }
    }

    /// Sign `user` in and load their canonical state.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if either collection cannot be fetched. The user
    /// stays signed in; `reload` can be retried.
    pub async fn start(&self, user: User) -> Result<(), SessionError> {
        info!(user = %user.id(), "starting session");
        self.saved_courses.clear();
        self.progress.clear();
        self.user.sign_in(user);
        self.reload().await
    }

    /// Re-fetch both collections from the backend.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` naming the collection that failed.
    pub async fn reload(&self) -> Result<(), SessionError> {
        self.saved_courses
            .load()
            .await
            .map_err(SessionError::SavedCourses)?;
        self.progress
            .load()
            .await
            .map_err(SessionError::Enrollments)?;
        Ok(())
    }

    /// Sign out and drop all local state.
    pub fn end(&self) {
        if let Some(user) = self.user.user() {
            info!(user = %user.id(), "ending session");
        }
        self.user.sign_out();
        self.saved_courses.clear();
        self.progress.clear();
    }

    #[must_use]
    pub fn current_user(&self) -> Option<User> {
        self.user.user()
    }

    #[must_use]
    pub fn saved_courses(&self) -> Arc<SavedCoursesStore> {
        Arc::clone(&self.saved_courses)
    }

    #[must_use]
    pub fn progress(&self) -> Arc<UserProgressStore> {
        Arc::clone(&self.progress)
    }
}
