mod common;

use std::sync::Arc;

use common::{GatedRemote, harness, name, student};
use remote::{InMemoryRemote, RemoteError};
use services::{AnalyticsKind, MutationOutcome, NotificationLevel};

#[tokio::test]
async fn signed_out_save_is_refused_locally() {
    let remote = InMemoryRemote::new();
    let h = harness(Arc::new(remote.clone()));
    let store = h.session.saved_courses();

    let outcome = store.toggle_save(&name("Python Programming")).await;

    assert_eq!(outcome, MutationOutcome::Refused);
    assert!(!store.is_saved(&name("Python Programming")));
    assert_eq!(remote.calls().total(), 0);

    let notes = h.notes.entries();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Info);
    assert_eq!(
        h.analytics.kinds(),
        vec![AnalyticsKind::AttemptedWhileSignedOut]
    );
}

#[tokio::test]
async fn signed_in_save_commits_canonical_set() {
    let remote = InMemoryRemote::new();
    let h = harness(Arc::new(remote.clone()));
    h.session.start(student()).await.unwrap();
    let store = h.session.saved_courses();

    let outcome = store.toggle_save(&name("Data Science & AI")).await;

    assert_eq!(outcome, MutationOutcome::Committed);
    assert!(store.is_saved(&name("Data Science & AI")));
    assert_eq!(store.saved_courses(), vec![name("Data Science & AI")]);
    assert_eq!(remote.calls().set_saved_course, 1);

    let notes = h.notes.entries();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Success);
    assert!(notes[0].message.contains("Saved"));
}

#[tokio::test]
async fn unsave_commits_removal() {
    let remote = InMemoryRemote::new().with_saved([name("Cloud Computing")]);
    let h = harness(Arc::new(remote.clone()));
    h.session.start(student()).await.unwrap();
    let store = h.session.saved_courses();
    assert!(store.is_saved(&name("Cloud Computing")));

    let outcome = store.toggle_save(&name("Cloud Computing")).await;

    assert_eq!(outcome, MutationOutcome::Committed);
    assert!(!store.is_saved(&name("Cloud Computing")));
    assert!(remote.saved().is_empty());
    assert!(h.notes.entries()[0].message.contains("Removed"));
}

#[tokio::test]
async fn failed_unsave_reverts_to_saved() {
    let remote = InMemoryRemote::new().with_saved([name("Web Development")]);
    let h = harness(Arc::new(remote.clone()));
    h.session.start(student()).await.unwrap();
    let store = h.session.saved_courses();
    remote.fail_next(RemoteError::Status(500));

    let outcome = store.toggle_save(&name("Web Development")).await;

    assert_eq!(outcome, MutationOutcome::RolledBack(RemoteError::Status(500)));
    assert!(store.is_saved(&name("Web Development")));
    assert!(remote.saved().iter().any(|n| n.as_str() == "Web Development"));

    let notes = h.notes.entries();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].level, NotificationLevel::Error);
}

#[tokio::test]
async fn membership_is_unchanged_under_failure_for_any_course() {
    let remote = InMemoryRemote::new().with_saved([name("Saved One")]);
    let h = harness(Arc::new(remote.clone()));
    h.session.start(student()).await.unwrap();
    let store = h.session.saved_courses();

    for course in ["Saved One", "Not Saved", "Also Not Saved"] {
        let before = store.is_saved(&name(course));
        remote.fail_next(RemoteError::Network("connection reset".into()));
        store.toggle_save(&name(course)).await;
        assert_eq!(store.is_saved(&name(course)), before, "{course}");
    }
    assert_eq!(h.notes.len(), 3);
}

#[tokio::test]
async fn double_click_is_rejected_while_first_toggle_is_pending() {
    let gated = GatedRemote::new(InMemoryRemote::new());
    let h = harness(Arc::new(gated.clone()));
    h.session.start(student()).await.unwrap();
    let store = h.session.saved_courses();
    let course = name("Python Programming");

    let first = tokio::spawn({
        let store = Arc::clone(&store);
        let course = course.clone();
        async move { store.toggle_save(&course).await }
    });

    // Optimistic state is visible before the server answers.
    while !store.is_saved(&course) {
        tokio::task::yield_now().await;
    }

    let second = store.toggle_save(&course).await;
    assert_eq!(second, MutationOutcome::Busy);

    gated.gate.add_permits(1);
    assert_eq!(first.await.unwrap(), MutationOutcome::Committed);

    assert!(store.is_saved(&course));
    assert_eq!(gated.inner.calls().set_saved_course, 1);
    assert_eq!(h.notes.len(), 1);
}

#[tokio::test]
async fn different_courses_toggle_concurrently() {
    let gated = GatedRemote::new(InMemoryRemote::new());
    let h = harness(Arc::new(gated.clone()));
    h.session.start(student()).await.unwrap();
    let store = h.session.saved_courses();

    let handles: Vec<_> = ["Rust", "Go"]
        .into_iter()
        .map(|course| {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.toggle_save(&name(course)).await })
        })
        .collect();

    while !(store.is_saved(&name("Rust")) && store.is_saved(&name("Go"))) {
        tokio::task::yield_now().await;
    }
    gated.gate.add_permits(2);

    for handle in handles {
        assert_eq!(handle.await.unwrap(), MutationOutcome::Committed);
    }
    assert_eq!(store.saved_courses(), vec![name("Go"), name("Rust")]);
}
