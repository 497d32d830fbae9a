//! JSON bodies exchanged with the backend, with schema checks on the way in.

use course_core::{
    CourseName, CourseSlug, EnrolledCourseRecord, Enrollments, LessonId, Progress, SaveIntent,
    SavedCourseSet,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::RemoteError;

//
// ─── REQUESTS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SetSavedCourseRequest<'a> {
    pub course_name: &'a str,
    pub action: SaveIntent,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CreateEnrollmentRequest<'a> {
    pub course_slug: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CompleteLessonRequest<'a> {
    pub lesson_id: &'a str,
}

//
// ─── RESPONSES ─────────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SavedCoursesResponse {
    saved_courses: Vec<CourseName>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentsResponse {
    enrollments: Vec<EnrollmentBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnrollmentBody {
    course_slug: CourseSlug,
    progress: Progress,
    #[serde(default)]
    completed_lessons: Vec<LessonId>,
}

impl From<EnrollmentBody> for EnrolledCourseRecord {
    fn from(body: EnrollmentBody) -> Self {
        EnrolledCourseRecord::from_parts(body.course_slug, body.progress, body.completed_lessons)
    }
}

fn parse<T: DeserializeOwned>(body: &str) -> Result<T, RemoteError> {
    serde_json::from_str(body).map_err(|e| RemoteError::MalformedResponse(e.to_string()))
}

/// Decode a `{"savedCourses": [...]}` body.
///
/// # Errors
///
/// Returns `RemoteError::MalformedResponse` if the shape or any name is invalid.
pub fn decode_saved_courses(body: &str) -> Result<SavedCourseSet, RemoteError> {
    let response: SavedCoursesResponse = parse(body)?;
    Ok(response.saved_courses.into_iter().collect())
}

/// Decode a `{"enrollments": [...]}` body.
///
/// # Errors
///
/// Returns `RemoteError::MalformedResponse` for an invalid shape, slug, lesson id,
/// out-of-range progress, or a slug listed twice.
pub fn decode_enrollments(body: &str) -> Result<Enrollments, RemoteError> {
    let response: EnrollmentsResponse = parse(body)?;
    Enrollments::from_records(response.enrollments.into_iter().map(Into::into))
        .map_err(|e| RemoteError::MalformedResponse(e.to_string()))
}
