#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use course_core::time::fixed_clock;
use course_core::{
    CourseName, CourseSlug, Enrollments, LessonId, SaveIntent, SavedCourseSet, User, UserId,
};
use remote::{InMemoryRemote, RemoteError, RemoteStateClient};
use services::{AnalyticsLog, NotificationLog, UserSession};
use tokio::sync::Semaphore;

pub fn name(s: &str) -> CourseName {
    CourseName::new(s).expect("valid course name")
}

pub fn slug(s: &str) -> CourseSlug {
    CourseSlug::new(s).expect("valid slug")
}

pub fn lesson(s: &str) -> LessonId {
    LessonId::new(s).expect("valid lesson id")
}

pub fn student() -> User {
    User::new(UserId::new("student-42").expect("valid user id")).with_display_name("Student")
}

pub struct Harness {
    pub session: UserSession,
    pub notes: NotificationLog,
    pub analytics: AnalyticsLog,
}

pub fn harness(remote: Arc<dyn RemoteStateClient>) -> Harness {
    let notes = NotificationLog::new();
    let analytics = AnalyticsLog::new();
    let session = UserSession::new(
        remote,
        Arc::new(notes.clone()),
        Arc::new(analytics.clone()),
        fixed_clock(),
    );
    Harness {
        session,
        notes,
        analytics,
    }
}

/// Holds mutating calls until the test releases a permit.
#[derive(Clone)]
pub struct GatedRemote {
    pub inner: InMemoryRemote,
    pub gate: Arc<Semaphore>,
}

impl GatedRemote {
    pub fn new(inner: InMemoryRemote) -> Self {
        Self {
            inner,
            gate: Arc::new(Semaphore::new(0)),
        }
    }

    async fn wait(&self) {
        self.gate.acquire().await.expect("gate open").forget();
    }
}

#[async_trait]
impl RemoteStateClient for GatedRemote {
    async fn fetch_saved_courses(&self) -> Result<SavedCourseSet, RemoteError> {
        self.inner.fetch_saved_courses().await
    }

    async fn set_saved_course(
        &self,
        name: &CourseName,
        intent: SaveIntent,
    ) -> Result<SavedCourseSet, RemoteError> {
        self.wait().await;
        self.inner.set_saved_course(name, intent).await
    }

    async fn fetch_enrollments(&self) -> Result<Enrollments, RemoteError> {
        self.inner.fetch_enrollments().await
    }

    async fn create_enrollment(&self, slug: &CourseSlug) -> Result<Enrollments, RemoteError> {
        self.wait().await;
        self.inner.create_enrollment(slug).await
    }

    async fn complete_lesson(
        &self,
        slug: &CourseSlug,
        lesson: &LessonId,
    ) -> Result<Enrollments, RemoteError> {
        self.wait().await;
        self.inner.complete_lesson(slug, lesson).await
    }
}
