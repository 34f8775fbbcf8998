
use moodtrail::autosave::{AutosaveHandle, SaveStatus};
use moodtrail::errors::WriteOperation;
use moodtrail::lifecycle::Draft;
use moodtrail::model::OwnerId;
use moodtrail::mood::Mood;
use moodtrail::store::MemoryStore;
use std::sync::Arc;
use std::time::Duration;
use test_helpers::{FlakyStore, StoreCall};
use tokio::time::sleep;

const DELAY: Duration = Duration::from_millis(3000);

fn draft(mood: Mood, content: &str) -> Draft {
    Draft {
        content: content.to_string(),
        mood_before: Some(mood),
        mood_after: None,
    }
}

fn spawn(store: &FlakyStore) -> AutosaveHandle {
    AutosaveHandle::spawn(Arc::new(store.clone()), OwnerId::from("alice"), DELAY)
}

#[tokio::test(start_paused = true)]
async fn test_rapid_edits_produce_one_write_with_last_state() {
    let store = FlakyStore::new(MemoryStore::new());
    let handle = spawn(&store);

    for text in ["I", "I feel", "I feel tense"] {
        handle.draft_changed(draft(Mood::Anxious, text));
        sleep(Duration::from_millis(1000)).await;
    }
    // Two seconds after the last edit nothing has been written yet
    sleep(Duration::from_millis(1900)).await;
    assert!(store.calls().is_empty());

    let state = handle.settle().await;
    let calls = store.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0],
        StoreCall::Create {
            content: "I feel tense".to_string(),
            mood_before: Mood::Anxious,
            mood_after: None,
        }
    );
    assert!(matches!(state.status, SaveStatus::Saved { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_pending_status_while_timer_is_armed() {
    let store = FlakyStore::new(MemoryStore::new());
    let handle = spawn(&store);
    let mut rx = handle.subscribe();

    handle.draft_changed(draft(Mood::Sad, "waiting"));
    let state = rx
        .wait_for(|s| s.status == SaveStatus::Pending)
        .await
        .unwrap()
        .clone();
    assert!(state.pending);
    assert!(state.dirty);
    assert!(!state.in_flight);
}

#[tokio::test(start_paused = true)]
async fn test_later_saves_update_the_bound_entry() {
    let store = FlakyStore::new(MemoryStore::new());
    let handle = spawn(&store);

    handle.draft_changed(draft(Mood::Anxious, "first"));
    let first = handle.settle().await;
    let id = first.bound_entry_id.clone().unwrap();

    handle.draft_changed(Draft {
        mood_after: Some(Mood::Calm),
        ..draft(Mood::Anxious, "first, then more")
    });
    let second = handle.settle().await;

    assert_eq!(second.bound_entry_id, Some(id.clone()));
    let calls = store.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].is_create());
    assert_eq!(
        calls[1],
        StoreCall::Update {
            id: id.clone(),
            content: "first, then more".to_string(),
            mood_before: Mood::Anxious,
            mood_after: Some(Mood::Calm),
        }
    );
    assert_eq!(store.inner().len().await, 1);
    let stored = store.inner().get(&id).await.unwrap();
    assert_eq!(stored.mood_after.as_deref(), Some("calm"));
}

#[tokio::test(start_paused = true)]
async fn test_rebind_creates_a_new_record() {
    let store = FlakyStore::new(MemoryStore::new());
    let handle = spawn(&store);

    handle.draft_changed(draft(Mood::Anxious, "first session"));
    let first = handle.settle().await.bound_entry_id.unwrap();

    handle.rebind(draft(Mood::Calm, ""));
    let rebound = handle.settle().await;
    assert!(rebound.bound_entry_id.is_none());
    assert_eq!(rebound.status, SaveStatus::Idle);

    handle.draft_changed(draft(Mood::Calm, "second session"));
    let second = handle.settle().await.bound_entry_id.unwrap();

    assert_ne!(first, second);
    assert_eq!(store.inner().len().await, 2);
    assert!(store.calls().iter().all(|c| c.is_create()));
}

#[tokio::test(start_paused = true)]
async fn test_rebind_discards_unsaved_edits() {
    let store = FlakyStore::new(MemoryStore::new());
    let handle = spawn(&store);

    handle.draft_changed(draft(Mood::Sad, "never saved"));
    handle.rebind(draft(Mood::Happy, ""));
    let state = handle.settle().await;
    sleep(DELAY * 2).await;

    assert!(store.calls().is_empty());
    assert!(!state.dirty);
}

#[tokio::test(start_paused = true)]
async fn test_timer_during_write_is_deferred_not_concurrent() {
    let store = FlakyStore::new(MemoryStore::new()).with_latency(Duration::from_millis(5000));
    let handle = spawn(&store);

    // Create issued at 3s and resolves at 8s
    handle.draft_changed(draft(Mood::Anxious, "A"));
    sleep(Duration::from_millis(4000)).await;
    assert!(handle.state().in_flight);

    // Timer for this edit fires at 7s, while the create is still in flight
    handle.draft_changed(draft(Mood::Anxious, "A and B"));
    let state = handle.settle().await;

    let calls = store.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls[0].is_create());
    assert_eq!(calls[0].content(), "A");
    assert!(!calls[1].is_create());
    assert_eq!(calls[1].content(), "A and B");
    assert_eq!(store.max_in_flight(), 1);
    assert_eq!(store.inner().len().await, 1);
    assert!(!state.dirty);
}

#[tokio::test(start_paused = true)]
async fn test_failed_write_is_not_retried() {
    let store = FlakyStore::new(MemoryStore::new());
    store.set_failing(true);
    let handle = spawn(&store);

    handle.draft_changed(draft(Mood::Neutral, "offline"));
    let state = handle.settle().await;
    match &state.status {
        SaveStatus::NotSaved(e) => assert_eq!(e.operation, WriteOperation::Create),
        other => panic!("Expected NotSaved, got {:?}", other),
    }
    assert!(state.dirty);
    assert!(state.bound_entry_id.is_none());

    sleep(DELAY * 3).await;
    assert_eq!(store.calls().len(), 1);

    // The next edit starts a fresh cycle
    store.set_failing(false);
    handle.draft_changed(draft(Mood::Neutral, "back online"));
    let state = handle.settle().await;
    assert!(matches!(state.status, SaveStatus::Saved { .. }));
    assert_eq!(store.calls().len(), 2);
    assert_eq!(store.inner().len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_update_keeps_binding() {
    let store = FlakyStore::new(MemoryStore::new());
    let handle = spawn(&store);

    handle.draft_changed(draft(Mood::Happy, "saved"));
    let id = handle.settle().await.bound_entry_id.unwrap();

    store.set_failing(true);
    handle.draft_changed(draft(Mood::Happy, "saved, then lost"));
    let state = handle.settle().await;

    assert_eq!(state.bound_entry_id, Some(id));
    match &state.status {
        SaveStatus::NotSaved(e) => assert_eq!(e.operation, WriteOperation::Update),
        other => panic!("Expected NotSaved, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_stale_create_after_rebind_is_ignored() {
    let store = FlakyStore::new(MemoryStore::new()).with_latency(Duration::from_millis(5000));
    let handle = spawn(&store);

    handle.draft_changed(draft(Mood::Anxious, "old session"));
    sleep(Duration::from_millis(4000)).await;
    assert!(handle.state().in_flight);

    handle.rebind(draft(Mood::Calm, ""));
    handle.draft_changed(draft(Mood::Calm, "new session"));
    let state = handle.settle().await;

    let bound = state.bound_entry_id.unwrap();
    let stored = store.inner().get(&bound).await.unwrap();
    assert_eq!(stored.content, "new session");
    assert_eq!(store.inner().len().await, 2);
    assert_eq!(store.max_in_flight(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_teardown_discards_in_flight_result() {
    let store = FlakyStore::new(MemoryStore::new()).with_latency(Duration::from_millis(5000));
    let handle = spawn(&store);

    handle.draft_changed(draft(Mood::Sad, "mid-write"));
    sleep(Duration::from_millis(4000)).await;
    handle.teardown();

    let state = handle.settle().await;
    assert_eq!(state.status, SaveStatus::Closed);

    sleep(Duration::from_millis(5000)).await;
    // The write itself completed, but nothing observed it
    assert_eq!(store.inner().len().await, 1);
    let state = handle.state();
    assert_eq!(state.status, SaveStatus::Closed);
    assert!(state.bound_entry_id.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_changes_after_teardown_are_ignored() {
    let store = FlakyStore::new(MemoryStore::new());
    let handle = spawn(&store);

    handle.teardown();
    handle.settle().await;
    handle.draft_changed(draft(Mood::Calm, "too late"));
    sleep(DELAY * 2).await;

    assert!(store.calls().is_empty());
    assert!(handle.is_closed());
}
