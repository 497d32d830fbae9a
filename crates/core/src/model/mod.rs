mod enrollment;
mod ids;
mod saved;
mod user;

pub use enrollment::{EnrolledCourseRecord, Enrollments, Progress};
pub use ids::{CourseName, CourseSlug, LessonId, UserId};
pub use saved::{SaveIntent, SavedCourseSet};
pub use user::User;
