#![forbid(unsafe_code)]

pub mod error;
pub mod model;
pub mod time;

pub use error::CourseError;
pub use model::{
    CourseName, CourseSlug, EnrolledCourseRecord, Enrollments, LessonId, Progress, SaveIntent,
    SavedCourseSet, User, UserId,
};
pub use time::Clock;
