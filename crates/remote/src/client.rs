use async_trait::async_trait;
use course_core::{CourseName, CourseSlug, Enrollments, LessonId, SaveIntent, SavedCourseSet};

use crate::error::RemoteError;

/// Contract between the stores and the backend collection of the signed-in user.
///
/// Every mutating call returns the full canonical collection, never a delta.
/// Credentials are ambient to the implementation.
#[async_trait]
pub trait RemoteStateClient: Send + Sync {
    /// Fetch the saved course names.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::Unauthenticated` without a valid session,
    /// `RemoteError::Network` on transport failure.
    async fn fetch_saved_courses(&self) -> Result<SavedCourseSet, RemoteError>;

    /// Save or unsave one course and return the resulting set.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on any failure; the backend state is then unchanged.
    async fn set_saved_course(
        &self,
        name: &CourseName,
        intent: SaveIntent,
    ) -> Result<SavedCourseSet, RemoteError>;

    /// Fetch every enrollment record.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on any failure.
    async fn fetch_enrollments(&self) -> Result<Enrollments, RemoteError>;

    /// Create an enrollment and return all records.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::AlreadyEnrolled` for a duplicate, or other remote errors.
    async fn create_enrollment(&self, slug: &CourseSlug) -> Result<Enrollments, RemoteError>;

    /// Mark a lesson as completed and return all records with updated progress.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on any failure.
    async fn complete_lesson(
        &self,
        slug: &CourseSlug,
        lesson: &LessonId,
    ) -> Result<Enrollments, RemoteError>;
}
