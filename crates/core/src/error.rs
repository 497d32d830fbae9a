use thiserror::Error;

/// Validation failures for course-state values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CourseError {
    #[error("course name cannot be empty")]
    EmptyCourseName,

    #[error("invalid course slug: {0:?}")]
    InvalidSlug(String),

    #[error("lesson id cannot be empty")]
    EmptyLessonId,

    #[error("user id cannot be empty")]
    EmptyUserId,

    #[error("progress must be within 0..=100, got {0}")]
    ProgressOutOfRange(u32),

    #[error("duplicate enrollment for course {0}")]
    DuplicateEnrollment(String),
}
