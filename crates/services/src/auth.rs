use std::sync::{Arc, PoisonError, RwLock};

use course_core::User;

#[derive(Debug, Default)]
struct AuthState {
    user: Option<User>,
    epoch: u64,
}

/// Shared sign-in state for the stores of one session.
///
/// Every sign-in or sign-out bumps `epoch`. A mutation that started under an
/// older epoch must not write its result into local state.
#[derive(Debug, Clone, Default)]
pub struct CurrentUser {
    inner: Arc<RwLock<AuthState>>,
}

impl CurrentUser {
    /// A gate with nobody signed in.
    #[must_use]
    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn sign_in(&self, user: User) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.user = Some(user);
        state.epoch += 1;
    }

    pub fn sign_out(&self) {
        let mut state = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        state.user = None;
        state.epoch += 1;
    }

    #[must_use]
    pub fn user(&self) -> Option<User> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .user
            .is_some()
    }

    #[must_use]
    pub fn epoch(&self) -> u64 {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).epoch
    }
}
