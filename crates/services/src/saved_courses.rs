use std::sync::{Mutex, MutexGuard, PoisonError};

use course_core::{CourseName, SaveIntent, SavedCourseSet};
use remote::RemoteError;
use tracing::{debug, warn};

use crate::analytics::AnalyticsKind;
use crate::context::StoreContext;
use crate::error::StoreError;
use crate::mutation::{InFlight, Mutation, MutationOutcome};

pub(crate) const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Bookmarked course names of the signed-in user, mirrored from the backend.
pub struct SavedCoursesStore {
    ctx: StoreContext,
    saved: Mutex<SavedCourseSet>,
    in_flight: InFlight<CourseName>,
}

impl SavedCoursesStore {
    #[must_use]
    pub fn new(ctx: StoreContext) -> Self {
        Self {
            ctx,
            saved: Mutex::new(SavedCourseSet::new()),
            in_flight: InFlight::new(),
        }
    }

    fn state(&self) -> MutexGuard<'_, SavedCourseSet> {
        self.saved.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace local state with the backend's saved set.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unauthenticated` without a network call when signed out,
    /// or `StoreError::Remote` if the fetch fails. Local state is untouched on error.
    pub async fn load(&self) -> Result<(), StoreError> {
        if !self.ctx.user.is_authenticated() {
            return Err(StoreError::Unauthenticated);
        }
        let epoch = self.ctx.user.epoch();
        let canonical = self.ctx.remote.fetch_saved_courses().await?;
        if self.ctx.user.epoch() == epoch {
            *self.state() = canonical;
        }
        Ok(())
    }

    /// Save the course if it is not saved, remove it otherwise.
    ///
    /// The change is visible locally at once. It is replaced by the server's
    /// canonical set on success and undone on failure. Every call that reaches
    /// the network produces exactly one notification.
    pub async fn toggle_save(&self, name: &CourseName) -> MutationOutcome {
        if !self.ctx.user.is_authenticated() {
            self.ctx.info("Please sign in to save courses.");
            self.ctx
                .track(AnalyticsKind::AttemptedWhileSignedOut, name.as_str());
            return MutationOutcome::Refused;
        }

        let Some(_claim) = self.in_flight.try_acquire(name.clone()) else {
            debug!(course = %name, "toggle already in flight");
            return MutationOutcome::Busy;
        };

        let epoch = self.ctx.user.epoch();
        let mut mutation = Mutation::idle();
        let intent = {
            let mut saved = self.state();
            let intent = saved.toggle_intent(name);
            mutation.apply(
                &mut *saved,
                |s| s.contains(name),
                |s| {
                    s.apply(name.clone(), intent);
                },
            );
            intent
        };
        self.ctx.track(
            match intent {
                SaveIntent::Save => AnalyticsKind::Saved,
                SaveIntent::Unsave => AnalyticsKind::Unsaved,
            },
            name.as_str(),
        );

        let result = self.ctx.remote.set_saved_course(name, intent).await;

        if self.ctx.user.epoch() != epoch {
            debug!(course = %name, "session changed during toggle, dropping result");
            return MutationOutcome::Discarded;
        }

        match result {
            Ok(canonical) => {
                mutation.commit(&mut *self.state(), canonical);
                self.ctx.success(match intent {
                    SaveIntent::Save => format!("Saved \"{name}\" to your courses."),
                    SaveIntent::Unsave => format!("Removed \"{name}\" from your saved courses."),
                });
                MutationOutcome::Committed
            }
            Err(err) => {
                warn!(course = %name, %intent, error = %err, "saved course update failed, rolling back");
                mutation.roll_back(&mut *self.state(), |s, was_saved| {
                    let restore = if was_saved {
                        SaveIntent::Save
                    } else {
                        SaveIntent::Unsave
                    };
                    s.apply(name.clone(), restore);
                });
                self.ctx.error(
                    match err {
                        RemoteError::Unauthenticated => SESSION_EXPIRED,
                        _ => "Could not update your saved courses. Please try again.",
                    },
                    false,
                );
                MutationOutcome::RolledBack(err)
            }
        }
    }

    #[must_use]
    pub fn is_saved(&self, name: &CourseName) -> bool {
        self.state().contains(name)
    }

    /// Current saved names in alphabetical order.
    #[must_use]
    pub fn saved_courses(&self) -> Vec<CourseName> {
        self.state().iter().cloned().collect()
    }

    /// Drop local state at session teardown.
    pub fn clear(&self) {
        *self.state() = SavedCourseSet::new();
    }
}
