use std::sync::{Mutex, MutexGuard, PoisonError};

use course_core::{CourseSlug, EnrolledCourseRecord, Enrollments, LessonId};
use remote::RemoteError;
use tracing::{debug, warn};

use crate::analytics::AnalyticsKind;
use crate::context::StoreContext;
use crate::error::StoreError;
use crate::mutation::{InFlight, Mutation, MutationOutcome};
use crate::saved_courses::SESSION_EXPIRED;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum ProgressKey {
    Enroll(CourseSlug),
    Lesson(CourseSlug, LessonId),
}

/// Enrollment and lesson completion of the signed-in user.
///
/// Both mutations follow the same policy: apply locally, then commit the
/// server's canonical list or roll back and notify.
pub struct UserProgressStore {
    ctx: StoreContext,
    enrollments: Mutex<Enrollments>,
    in_flight: InFlight<ProgressKey>,
}

impl UserProgressStore {
    #[must_use]
    pub fn new(ctx: StoreContext) -> Self {
        Self {
            ctx,
            enrollments: Mutex::new(Enrollments::new()),
            in_flight: InFlight::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, Enrollments> {
        self.enrollments
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace local state with the backend's enrollment list.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` without a network call when signed out,
    /// or `StoreError::Remote` if the fetch fails.
    pub async fn load(&self) -> Result<(), StoreError> {
        if !self.ctx.user.is_authenticated() {
            return Err(StoreError::Unauthenticated);
        }
        let epoch = self.ctx.user.epoch();
        let canonical = self.ctx.remote.fetch_enrollments().await?;
        if self.ctx.user.epoch() == epoch {
            *self.state() = canonical;
        }
        Ok(())
    }

    /// Enroll in a course. A course already enrolled locally is a no-op.
    pub async fn enroll(&self, slug: &CourseSlug) -> MutationOutcome {
        if !self.ctx.user.is_authenticated() {
            self.ctx.info("Please sign in to enroll in courses.");
            self.ctx
                .track(AnalyticsKind::AttemptedWhileSignedOut, slug.as_str());
            return MutationOutcome::Refused;
        }
        // Claim first: a pending enrollment's optimistic record must not read as enrolled.
        let Some(_claim) = self.in_flight.try_acquire(ProgressKey::Enroll(slug.clone())) else {
            debug!(course = %slug, "enrollment already in flight");
            return MutationOutcome::Busy;
        };
        if self.is_enrolled(slug) {
            return MutationOutcome::AlreadyEnrolled;
        }

        let epoch = self.ctx.user.epoch();
        let mut mutation = Mutation::idle();
        mutation.apply(
            &mut *self.state(),
            |s| s.get(slug).cloned(),
            |s| {
                s.enroll(slug.clone());
            },
        );

        let mut result = self.ctx.remote.create_enrollment(slug).await;
        let mut already_enrolled = false;
        if matches!(result, Err(RemoteError::AlreadyEnrolled)) {
            // Local state was stale; converge on the server's list.
            debug!(course = %slug, "backend reports existing enrollment, refetching");
            already_enrolled = true;
            result = self.ctx.remote.fetch_enrollments().await;
        }

        if self.ctx.user.epoch() != epoch {
            debug!(course = %slug, "session changed during enrollment, dropping result");
            return MutationOutcome::Discarded;
        }

        match result {
            Ok(canonical) => {
                mutation.commit(&mut *self.state(), canonical);
                if already_enrolled {
                    return MutationOutcome::AlreadyEnrolled;
                }
                self.ctx.track(AnalyticsKind::Enrolled, slug.as_str());
                self.ctx.success(format!("You are now enrolled in {slug}."));
                MutationOutcome::Committed
            }
            Err(err) => {
                warn!(course = %slug, error = %err, "enrollment failed, rolling back");
                mutation.roll_back(&mut *self.state(), |s, previous| {
                    restore_record(s, slug, previous);
                });
                self.ctx.error(
                    match err {
                        RemoteError::Unauthenticated => SESSION_EXPIRED.to_string(),
                        _ => format!("Could not enroll in {slug}. Please try again."),
                    },
                    true,
                );
                MutationOutcome::RolledBack(err)
            }
        }
    }

    /// Mark a lesson complete.
    ///
    /// The lesson shows as completed at once; the progress percentage only moves
    /// when the server answers, since the lesson count lives there.
    pub async fn mark_lesson_complete(
        &self,
        slug: &CourseSlug,
        lesson: &LessonId,
    ) -> MutationOutcome {
        if !self.ctx.user.is_authenticated() {
            self.ctx.info("Please sign in to track your progress.");
            self.ctx
                .track(AnalyticsKind::AttemptedWhileSignedOut, slug.as_str());
            return MutationOutcome::Refused;
        }
        let key = ProgressKey::Lesson(slug.clone(), lesson.clone());
        let Some(_claim) = self.in_flight.try_acquire(key) else {
            debug!(course = %slug, lesson = %lesson, "lesson completion already in flight");
            return MutationOutcome::Busy;
        };

        let epoch = self.ctx.user.epoch();
        let mut mutation = Mutation::idle();
        mutation.apply(
            &mut *self.state(),
            |s| s.is_lesson_completed(slug, lesson),
            |s| {
                if let Some(record) = s.get_mut(slug) {
                    record.mark_lesson(lesson.clone());
                }
            },
        );

        let result = self.ctx.remote.complete_lesson(slug, lesson).await;

        if self.ctx.user.epoch() != epoch {
            debug!(course = %slug, lesson = %lesson, "session changed during completion, dropping result");
            return MutationOutcome::Discarded;
        }

        match result {
            Ok(canonical) => {
                mutation.commit(&mut *self.state(), canonical);
                self.ctx.track(
                    AnalyticsKind::LessonCompleted,
                    format!("{slug}/{lesson}"),
                );
                MutationOutcome::Committed
            }
            Err(err) => {
                warn!(course = %slug, lesson = %lesson, error = %err, "lesson completion failed, rolling back");
                mutation.roll_back(&mut *self.state(), |s, was_completed| {
                    if !was_completed {
                        if let Some(record) = s.get_mut(slug) {
                            record.unmark_lesson(lesson);
                        }
                    }
                });
                self.ctx.error(
                    match err {
                        RemoteError::Unauthenticated => SESSION_EXPIRED,
                        _ => "Could not save your lesson progress. Please try again.",
                    },
                    false,
                );
                MutationOutcome::RolledBack(err)
            }
        }
    }

    /// Stored percentage for the course, 0 when not enrolled.
    #[must_use]
    pub fn get_course_progress(&self, slug: &CourseSlug) -> u8 {
        self.state().progress_of(slug).value()
    }

    #[must_use]
    pub fn is_lesson_completed(&self, slug: &CourseSlug, lesson: &LessonId) -> bool {
        self.state().is_lesson_completed(slug, lesson)
    }

    #[must_use]
    pub fn is_enrolled(&self, slug: &CourseSlug) -> bool {
        self.state().contains(slug)
    }

    /// All records, ordered by slug.
    #[must_use]
    pub fn enrollments(&self) -> Vec<EnrolledCourseRecord> {
        self.state().records().cloned().collect()
    }

    pub fn clear(&self) {
        *self.state() = Enrollments::new();
    }
}

fn restore_record(
    enrollments: &mut Enrollments,
    slug: &CourseSlug,
    previous: Option<EnrolledCourseRecord>,
) {
    match previous {
        Some(record) => enrollments.replace(record),
        None => {
            enrollments.remove(slug);
        }
    }
}
