use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CourseError;
use crate::model::ids::{CourseSlug, LessonId};

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

/// Completion percentage of a course, always within `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Progress(u8);

impl Progress {
    pub const ZERO: Self = Self(0);
    pub const COMPLETE: Self = Self(100);

    /// # Errors
    ///
    /// Returns `CourseError::ProgressOutOfRange` for values above 100.
    pub fn new(percent: u32) -> Result<Self, CourseError> {
        u8::try_from(percent)
            .ok()
            .filter(|p| *p <= 100)
            .map(Self)
            .ok_or(CourseError::ProgressOutOfRange(percent))
    }

    /// Percentage of `done` out of `total`, rounded down and capped at 100.
    ///
    /// A course with no lessons reports zero.
    #[must_use]
    pub fn from_fraction(done: usize, total: usize) -> Self {
        if total == 0 {
            return Self::ZERO;
        }
        let percent = (done.min(total) * 100) / total;
        Self(u8::try_from(percent).unwrap_or(100))
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<u32> for Progress {
    type Error = CourseError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Progress> for u32 {
    fn from(value: Progress) -> Self {
        u32::from(value.0)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// Per-user, per-course progress tracking entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledCourseRecord {
    course_slug: CourseSlug,
    progress: Progress,
    completed_lessons: BTreeSet<LessonId>,
}

impl EnrolledCourseRecord {
    /// A fresh enrollment: no progress, no lessons completed.
    #[must_use]
    pub fn new(course_slug: CourseSlug) -> Self {
        Self {
            course_slug,
            progress: Progress::ZERO,
            completed_lessons: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn from_parts(
        course_slug: CourseSlug,
        progress: Progress,
        completed_lessons: impl IntoIterator<Item = LessonId>,
    ) -> Self {
        Self {
            course_slug,
            progress,
            completed_lessons: completed_lessons.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn course_slug(&self) -> &CourseSlug {
        &self.course_slug
    }

    #[must_use]
    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn set_progress(&mut self, progress: Progress) {
        self.progress = progress;
    }

    #[must_use]
    pub fn is_lesson_completed(&self, lesson: &LessonId) -> bool {
        self.completed_lessons.contains(lesson)
    }

    pub fn completed_lessons(&self) -> impl Iterator<Item = &LessonId> {
        self.completed_lessons.iter()
    }

    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.completed_lessons.len()
    }

    /// Adds `lesson` to the completed set. Returns `true` if it was new.
    ///
    /// Progress is left alone; only the backend knows the lesson count.
    pub fn mark_lesson(&mut self, lesson: LessonId) -> bool {
        self.completed_lessons.insert(lesson)
    }

    /// Removes `lesson` from the completed set. Returns `true` if it was present.
    pub fn unmark_lesson(&mut self, lesson: &LessonId) -> bool {
        self.completed_lessons.remove(lesson)
    }
}

//
// ─── COLLECTION ────────────────────────────────────────────────────────────────
//

/// All enrollment records of one user, keyed by course slug.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Enrollments {
    records: BTreeMap<CourseSlug, EnrolledCourseRecord>,
}

impl Enrollments {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the collection from a list, as returned by the backend.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::DuplicateEnrollment` if two records share a slug.
    pub fn from_records(
        records: impl IntoIterator<Item = EnrolledCourseRecord>,
    ) -> Result<Self, CourseError> {
        let mut out = Self::new();
        for record in records {
            if out.records.contains_key(record.course_slug()) {
                return Err(CourseError::DuplicateEnrollment(
                    record.course_slug().to_string(),
                ));
            }
            out.records.insert(record.course_slug().clone(), record);
        }
        Ok(out)
    }

    #[must_use]
    pub fn get(&self, slug: &CourseSlug) -> Option<&EnrolledCourseRecord> {
        self.records.get(slug)
    }

    pub fn get_mut(&mut self, slug: &CourseSlug) -> Option<&mut EnrolledCourseRecord> {
        self.records.get_mut(slug)
    }

    #[must_use]
    pub fn contains(&self, slug: &CourseSlug) -> bool {
        self.records.contains_key(slug)
    }

    /// Inserts a fresh record for `slug` unless one exists. Returns `true` on insert.
    pub fn enroll(&mut self, slug: CourseSlug) -> bool {
        if self.records.contains_key(&slug) {
            return false;
        }
        self.records
            .insert(slug.clone(), EnrolledCourseRecord::new(slug));
        true
    }

    /// Inserts `record`, replacing any record with the same slug.
    pub fn replace(&mut self, record: EnrolledCourseRecord) {
        self.records.insert(record.course_slug().clone(), record);
    }

    pub fn remove(&mut self, slug: &CourseSlug) -> Option<EnrolledCourseRecord> {
        self.records.remove(slug)
    }

    /// Stored percentage, or zero when there is no record.
    #[must_use]
    pub fn progress_of(&self, slug: &CourseSlug) -> Progress {
        self.get(slug)
            .map_or(Progress::ZERO, EnrolledCourseRecord::progress)
    }

    #[must_use]
    pub fn is_lesson_completed(&self, slug: &CourseSlug, lesson: &LessonId) -> bool {
        self.get(slug)
            .is_some_and(|record| record.is_lesson_completed(lesson))
    }

    pub fn records(&self) -> impl Iterator<Item = &EnrolledCourseRecord> {
        self.records.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slug(s: &str) -> CourseSlug {
        CourseSlug::new(s).unwrap()
    }

    fn lesson(s: &str) -> LessonId {
        LessonId::new(s).unwrap()
    }

    #[test]
    fn progress_rejects_over_100() {
        assert!(Progress::new(100).is_ok());
        assert_eq!(Progress::new(101), Err(CourseError::ProgressOutOfRange(101)));
        assert_eq!(Progress::new(300), Err(CourseError::ProgressOutOfRange(300)));
    }

    #[test]
    fn progress_from_fraction_rounds_down() {
        assert_eq!(Progress::from_fraction(1, 3).value(), 33);
        assert_eq!(Progress::from_fraction(3, 3), Progress::COMPLETE);
        assert_eq!(Progress::from_fraction(5, 3), Progress::COMPLETE);
        assert_eq!(Progress::from_fraction(2, 0), Progress::ZERO);
    }

    #[test]
    fn missing_record_reports_zero_and_not_completed() {
        let enrollments = Enrollments::new();
        assert_eq!(enrollments.progress_of(&slug("rust-basics")), Progress::ZERO);
        assert!(!enrollments.is_lesson_completed(&slug("rust-basics"), &lesson("intro")));
    }

    #[test]
    fn enroll_does_not_replace_existing_record() {
        let mut enrollments = Enrollments::new();
        assert!(enrollments.enroll(slug("rust-basics")));
        enrollments
            .get_mut(&slug("rust-basics"))
            .unwrap()
            .mark_lesson(lesson("intro"));

        assert!(!enrollments.enroll(slug("rust-basics")));
        assert!(enrollments.is_lesson_completed(&slug("rust-basics"), &lesson("intro")));
        assert_eq!(enrollments.len(), 1);
    }

    #[test]
    fn from_records_rejects_duplicates() {
        let records = vec![
            EnrolledCourseRecord::new(slug("a")),
            EnrolledCourseRecord::new(slug("a")),
        ];
        assert_eq!(
            Enrollments::from_records(records),
            Err(CourseError::DuplicateEnrollment("a".into()))
        );
    }

    #[test]
    fn record_deserializes_with_checked_progress() {
        let json = r#"{"course_slug":"web-dev","progress":40,"completed_lessons":["l1","l2"]}"#;
        let record: EnrolledCourseRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.progress().value(), 40);
        assert_eq!(record.completed_count(), 2);

        let bad = r#"{"course_slug":"web-dev","progress":140,"completed_lessons":[]}"#;
        assert!(serde_json::from_str::<EnrolledCourseRecord>(bad).is_err());
    }
}
