use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CourseError;

/// Display name of a course, as shown in the catalog and stored in the saved set.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseName(String);

impl CourseName {
    /// Creates a `CourseName`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyCourseName` if nothing is left after trimming.
    pub fn new(name: impl Into<String>) -> Result<Self, CourseError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(CourseError::EmptyCourseName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// URL-safe unique key of a course (`data-science-ai`).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CourseSlug(String);

impl CourseSlug {
    /// Creates a `CourseSlug`.
    ///
    /// Slugs are lowercase ASCII alphanumerics separated by `-`.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::InvalidSlug` for empty input or any other character.
    pub fn new(slug: impl Into<String>) -> Result<Self, CourseError> {
        let slug = slug.into();
        let valid = !slug.is_empty()
            && slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
        if !valid {
            return Err(CourseError::InvalidSlug(slug));
        }
        Ok(Self(slug))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Identifier of a lesson within a course.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LessonId(String);

impl LessonId {
    /// Creates a `LessonId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `CourseError::EmptyLessonId` if nothing is left after trimming.
    pub fn new(id: impl Into<String>) -> Result<Self, CourseError> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err(CourseError::EmptyLessonId);
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Opaque identity of the signed-in user.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// # Errors
    ///
    /// Returns `CourseError::EmptyUserId` for blank input.
    pub fn new(id: impl Into<String>) -> Result<Self, CourseError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(CourseError::EmptyUserId);
        }
        Ok(Self(id))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

macro_rules! string_id {
    ($ty:ident) => {
        impl TryFrom<String> for $ty {
            type Error = CourseError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$ty> for String {
            fn from(value: $ty) -> Self {
                value.0
            }
        }

        impl FromStr for $ty {
            type Err = CourseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($ty), self.0)
            }
        }
    };
}

string_id!(CourseName);
string_id!(CourseSlug);
string_id!(LessonId);
string_id!(UserId);

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_name_is_trimmed() {
        let name = CourseName::new("  Python Programming ").unwrap();
        assert_eq!(name.as_str(), "Python Programming");
    }

    #[test]
    fn course_name_rejects_blank() {
        assert_eq!(CourseName::new("   "), Err(CourseError::EmptyCourseName));
    }

    #[test]
    fn course_name_keeps_punctuation() {
        let name: CourseName = "Data Science & AI".parse().unwrap();
        assert_eq!(name.to_string(), "Data Science & AI");
    }

    #[test]
    fn slug_accepts_kebab_case() {
        let slug = CourseSlug::new("data-science-101").unwrap();
        assert_eq!(slug.as_str(), "data-science-101");
    }

    #[test]
    fn slug_rejects_uppercase_and_spaces() {
        assert!(CourseSlug::new("Data-Science").is_err());
        assert!(CourseSlug::new("data science").is_err());
        assert!(CourseSlug::new("").is_err());
    }

    #[test]
    fn lesson_id_rejects_blank() {
        assert_eq!(LessonId::new(""), Err(CourseError::EmptyLessonId));
    }

    #[test]
    fn debug_names_the_type() {
        let id = LessonId::new("intro").unwrap();
        assert_eq!(format!("{id:?}"), "LessonId(\"intro\")");
    }

    #[test]
    fn deserialize_validates() {
        let ok: CourseSlug = serde_json::from_str("\"rust-basics\"").unwrap();
        assert_eq!(ok.as_str(), "rust-basics");

        let bad = serde_json::from_str::<CourseSlug>("\"Rust Basics\"");
        assert!(bad.is_err());
    }
}
