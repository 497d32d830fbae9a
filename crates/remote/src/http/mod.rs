mod wire;

pub use wire::{decode_enrollments, decode_saved_courses};

use async_trait::async_trait;
use course_core::{CourseName, CourseSlug, Enrollments, LessonId, SaveIntent, SavedCourseSet};
use reqwest::header::{COOKIE, HeaderMap, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode};
use tracing::debug;

use crate::client::RemoteStateClient;
use crate::config::RemoteConfig;
use crate::error::RemoteError;
use wire::{CompleteLessonRequest, CreateEnrollmentRequest, SetSavedCourseRequest};

/// `RemoteStateClient` over HTTP+JSON.
///
/// The session cookie from `RemoteConfig` is attached to every request as a
/// default header.
#[derive(Clone)]
pub struct HttpRemoteClient {
    client: Client,
    base_url: String,
}

impl HttpRemoteClient {
    /// # Errors
    ///
    /// Returns `RemoteError::InvalidConfig` if the cookie is not a valid header
    /// value or the HTTP client cannot be built.
    pub fn new(config: &RemoteConfig) -> Result<Self, RemoteError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let mut value = HeaderValue::from_str(cookie)
                .map_err(|e| RemoteError::InvalidConfig(format!("session cookie: {e}")))?;
            value.set_sensitive(true);
            headers.insert(COOKIE, value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::InvalidConfig(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder, op: Operation) -> Result<String, RemoteError> {
        let response = request.send().await?;
        let status = response.status();
        debug!(?op, %status, "remote response");

        if !status.is_success() {
            return Err(classify_status(status, op));
        }
        Ok(response.text().await?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    FetchSaved,
    SetSaved,
    FetchEnrollments,
    CreateEnrollment,
    CompleteLesson,
}

fn classify_status(status: StatusCode, op: Operation) -> RemoteError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => RemoteError::Unauthenticated,
        StatusCode::CONFLICT if op == Operation::CreateEnrollment => RemoteError::AlreadyEnrolled,
        other => RemoteError::Status(other.as_u16()),
    }
}

#[async_trait]
impl RemoteStateClient for HttpRemoteClient {
    async fn fetch_saved_courses(&self) -> Result<SavedCourseSet, RemoteError> {
        let request = self.client.get(self.url("/api/saved-courses"));
        let body = self.send(request, Operation::FetchSaved).await?;
        decode_saved_courses(&body)
    }

    async fn set_saved_course(
        &self,
        name: &CourseName,
        intent: SaveIntent,
    ) -> Result<SavedCourseSet, RemoteError> {
        let request = self
            .client
            .post(self.url("/api/saved-courses"))
            .json(&SetSavedCourseRequest {
                course_name: name.as_str(),
                action: intent,
            });
        let body = self.send(request, Operation::SetSaved).await?;
        decode_saved_courses(&body)
    }

    async fn fetch_enrollments(&self) -> Result<Enrollments, RemoteError> {
        let request = self.client.get(self.url("/api/enrollments"));
        let body = self.send(request, Operation::FetchEnrollments).await?;
        decode_enrollments(&body)
    }

    async fn create_enrollment(&self, slug: &CourseSlug) -> Result<Enrollments, RemoteError> {
        let request = self
            .client
            .post(self.url("/api/enrollments"))
            .json(&CreateEnrollmentRequest {
                course_slug: slug.as_str(),
            });
        let body = self.send(request, Operation::CreateEnrollment).await?;
        decode_enrollments(&body)
    }

    async fn complete_lesson(
        &self,
        slug: &CourseSlug,
        lesson: &LessonId,
    ) -> Result<Enrollments, RemoteError> {
        // Slugs are restricted to [a-z0-9-], so they are path-safe as-is.
        let path = format!("/api/enrollments/{slug}/lessons");
        let request = self
            .client
            .post(self.url(&path))
            .json(&CompleteLessonRequest {
                lesson_id: lesson.as_str(),
            });
        let body = self.send(request, Operation::CompleteLesson).await?;
        decode_enrollments(&body)
    }
}
