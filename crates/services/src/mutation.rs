//! Two-phase local mutation: apply optimistically, then commit or roll back.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use remote::RemoteError;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one optimistic mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    PendingOptimistic,
    Committed,
    RolledBack,
}

/// What a store operation ended up doing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The server accepted the change; local state now mirrors its canonical answer.
    Committed,
    /// The server call failed; local state was restored from the snapshot.
    RolledBack(RemoteError),
    /// Nobody is signed in; nothing was sent.
    Refused,
    /// The course was already enrolled locally; nothing was sent.
    AlreadyEnrolled,
    /// The same key already has a mutation in flight; nothing was sent.
    Busy,
    /// The session changed while the request was in flight; the answer was dropped.
    Discarded,
}

impl MutationOutcome {
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(self, MutationOutcome::Committed)
    }
}

//
// ─── MUTATION ──────────────────────────────────────────────────────────────────
//

/// Holds the single pre-mutation snapshot for one operation.
///
/// `Snap` is whatever slice of state the operation needs to undo itself,
/// e.g. the previous membership of one course name.
#[derive(Debug)]
pub struct Mutation<Snap> {
    phase: MutationPhase,
    snapshot: Option<Snap>,
}

impl<Snap> Default for Mutation<Snap> {
    fn default() -> Self {
        Self {
            phase: MutationPhase::Idle,
            snapshot: None,
        }
    }
}

impl<Snap> Mutation<Snap> {
    #[must_use]
    pub fn idle() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> MutationPhase {
        self.phase
    }

    /// Captures the snapshot and applies `change`. Only valid from `Idle`.
    pub fn apply<S>(
        &mut self,
        state: &mut S,
        capture: impl FnOnce(&S) -> Snap,
        change: impl FnOnce(&mut S),
    ) {
        if self.phase != MutationPhase::Idle {
            return;
        }
        self.snapshot = Some(capture(state));
        change(state);
        self.phase = MutationPhase::PendingOptimistic;
    }

    /// Overwrites `state` with the server's canonical value.
    ///
    /// Returns `false` (and leaves `state` alone) unless the mutation is pending.
    pub fn commit<S>(&mut self, state: &mut S, canonical: S) -> bool {
        if self.phase != MutationPhase::PendingOptimistic {
            return false;
        }
        *state = canonical;
        self.snapshot = None;
        self.phase = MutationPhase::Committed;
        true
    }

    /// Restores the snapshot into `state`.
    ///
    /// Returns `false` (and leaves `state` alone) unless the mutation is pending.
    pub fn roll_back<S>(&mut self, state: &mut S, restore: impl FnOnce(&mut S, Snap)) -> bool {
        if self.phase != MutationPhase::PendingOptimistic {
            return false;
        }
        let Some(snapshot) = self.snapshot.take() else {
            return false;
        };
        restore(state, snapshot);
        self.phase = MutationPhase::RolledBack;
        true
    }
}

//
// ─── IN-FLIGHT GUARD ───────────────────────────────────────────────────────────
//

/// Set of keys that currently have a mutation outstanding.
#[derive(Debug)]
pub struct InFlight<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
}

impl<K: Eq + Hash> Default for InFlight<K> {
    fn default() -> Self {
        Self {
            keys: Arc::new(Mutex::new(HashSet::new())),
        }
    }
}

impl<K: Eq + Hash + Clone> InFlight<K> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `key`, or returns `None` if it is already claimed.
    ///
    /// The claim is released when the returned token drops.
    #[must_use]
    pub fn try_acquire(&self, key: K) -> Option<InFlightToken<K>> {
        let mut keys = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !keys.insert(key.clone()) {
            return None;
        }
        Some(InFlightToken {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    #[must_use]
    pub fn is_in_flight(&self, key: &K) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its key on drop, including on early return or a cancelled future.
#[derive(Debug)]
pub struct InFlightToken<K: Eq + Hash> {
    keys: Arc<Mutex<HashSet<K>>>,
    key: K,
}

impl<K: Eq + Hash> Drop for InFlightToken<K> {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
