use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use course_core::{
    CourseName, CourseSlug, Enrollments, LessonId, Progress, SaveIntent, SavedCourseSet,
};

use crate::client::RemoteStateClient;
use crate::error::RemoteError;

/// Lesson count assumed for courses registered without one.
pub const DEFAULT_LESSON_COUNT: usize = 10;

/// Number of calls received, per operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub fetch_saved_courses: usize,
    pub set_saved_course: usize,
    pub fetch_enrollments: usize,
    pub create_enrollment: usize,
    pub complete_lesson: usize,
}

impl CallCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.fetch_saved_courses
            + self.set_saved_course
            + self.fetch_enrollments
            + self.create_enrollment
            + self.complete_lesson
    }
}

#[derive(Default)]
struct BackendState {
    authenticated: bool,
    saved: SavedCourseSet,
    enrollments: Enrollments,
    lesson_counts: HashMap<CourseSlug, usize>,
    failures: VecDeque<RemoteError>,
    calls: CallCounts,
}

/// In-process backend for tests and offline runs.
///
/// Behaves like the HTTP backend: every mutation answers with the full canonical
/// collection. Failures can be scripted with `fail_next`.
#[derive(Clone)]
pub struct InMemoryRemote {
    state: Arc<Mutex<BackendState>>,
}

impl Default for InMemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryRemote {
    /// An empty backend with a valid session.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(BackendState {
                authenticated: true,
                ..BackendState::default()
            })),
        }
    }

    #[must_use]
    pub fn with_saved(self, names: impl IntoIterator<Item = CourseName>) -> Self {
        self.lock().saved = names.into_iter().collect();
        self
    }

    /// Registers how many lessons a course has, for progress computation.
    #[must_use]
    pub fn with_course(self, slug: CourseSlug, lessons: usize) -> Self {
        self.lock().lesson_counts.insert(slug, lessons);
        self
    }

    #[must_use]
    pub fn with_enrollments(self, enrollments: Enrollments) -> Self {
        self.lock().enrollments = enrollments;
        self
    }

    /// Simulates the session cookie being valid or expired.
    pub fn set_authenticated(&self, authenticated: bool) {
        self.lock().authenticated = authenticated;
    }

    /// The next call (of any operation) fails with `err`.
    pub fn fail_next(&self, err: RemoteError) {
        self.fail_next_n(1, err);
    }

    pub fn fail_next_n(&self, n: usize, err: RemoteError) {
        self.lock().failures.extend(std::iter::repeat_n(err, n));
    }

    #[must_use]
    pub fn calls(&self) -> CallCounts {
        self.lock().calls
    }

    #[must_use]
    pub fn saved(&self) -> SavedCourseSet {
        self.lock().saved.clone()
    }

    #[must_use]
    pub fn enrollments(&self) -> Enrollments {
        self.lock().enrollments.clone()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks state, records the call, and applies scripted failures and the
    /// session check.
    fn begin(
        &self,
        count: impl FnOnce(&mut CallCounts),
    ) -> Result<MutexGuard<'_, BackendState>, RemoteError> {
        let mut state = self.lock();
        count(&mut state.calls);

        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        if !state.authenticated {
            return Err(RemoteError::Unauthenticated);
        }
        Ok(state)
    }
}

#[async_trait]
impl RemoteStateClient for InMemoryRemote {
    async fn fetch_saved_courses(&self) -> Result<SavedCourseSet, RemoteError> {
        let state = self.begin(|c| c.fetch_saved_courses += 1)?;
        Ok(state.saved.clone())
    }

    async fn set_saved_course(
        &self,
        name: &CourseName,
        intent: SaveIntent,
    ) -> Result<SavedCourseSet, RemoteError> {
        let mut state = self.begin(|c| c.set_saved_course += 1)?;
        state.saved.apply(name.clone(), intent);
        Ok(state.saved.clone())
    }

    async fn fetch_enrollments(&self) -> Result<Enrollments, RemoteError> {
        let state = self.begin(|c| c.fetch_enrollments += 1)?;
        Ok(state.enrollments.clone())
    }

    async fn create_enrollment(&self, slug: &CourseSlug) -> Result<Enrollments, RemoteError> {
        let mut state = self.begin(|c| c.create_enrollment += 1)?;
        if !state.enrollments.enroll(slug.clone()) {
            return Err(RemoteError::AlreadyEnrolled);
        }
        Ok(state.enrollments.clone())
    }

    async fn complete_lesson(
        &self,
        slug: &CourseSlug,
        lesson: &LessonId,
    ) -> Result<Enrollments, RemoteError> {
        let mut state = self.begin(|c| c.complete_lesson += 1)?;
        let total = state
            .lesson_counts
            .get(slug)
            .copied()
            .unwrap_or(DEFAULT_LESSON_COUNT);

        let record = state
            .enrollments
            .get_mut(slug)
            .ok_or(RemoteError::Status(404))?;
        record.mark_lesson(lesson.clone());
        let progress = Progress::from_fraction(record.completed_count(), total);
        record.set_progress(progress);

        Ok(state.enrollments.clone())
    }
}
