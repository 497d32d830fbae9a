//! Shared error types for the services crate.

use thiserror::Error;

use remote::RemoteError;

/// Errors emitted when a store loads canonical state.
///
/// Mutations never return these; they report through `MutationOutcome` and
/// notifications instead.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("not signed in")]
    Unauthenticated,
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

/// Errors emitted while starting or refreshing a user session.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("loading saved courses failed: {0}")]
    SavedCourses(#[source] StoreError),
    #[error("loading enrollments failed: {0}")]
    Enrollments(#[source] StoreError),
}
