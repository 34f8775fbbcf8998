use super::*;
use crate::autosave::SaveStatus;
use crate::capture::{ScriptedCapture, SpeechCapture};
use crate::feed::FeedStatus;
use crate::store::MemoryStore;

const DELAY: Duration = Duration::from_millis(3000);

fn check_in(store: &MemoryStore) -> CheckIn {
    CheckIn::new(Arc::new(store.clone()), OwnerId::from("alice"), DELAY)
}

#[tokio::test(start_paused = true)]
async fn test_editing_before_mood_is_rejected_and_not_saved() {
    let store = MemoryStore::new();
    let mut check_in = check_in(&store);

    assert_eq!(
        check_in.edit_content("hello"),
        Err(LifecycleError::NoMoodBefore)
    );
    let state = check_in.settle().await;
    assert_eq!(state.status, SaveStatus::Idle);
    assert!(store.is_empty().await);
}

#[tokio::test(start_paused = true)]
async fn test_check_in_saves_after_debounce() {
    let store = MemoryStore::new();
    let mut check_in = check_in(&store);

    check_in.select_mood_before(Mood::Sad);
    check_in.edit_content("a rough morning").unwrap();
    assert!(check_in.save_state().bound_entry_id.is_none());

    let state = check_in.settle().await;
    let id = state.bound_entry_id.unwrap();
    let stored = store.get(&id).await.unwrap();
    assert_eq!(stored.content, "a rough morning");
    assert_eq!(stored.mood_before.as_deref(), Some("sad"));
}

#[tokio::test(start_paused = true)]
async fn test_mood_after_is_saved_with_entry() {
    let store = MemoryStore::new();
    let mut check_in = check_in(&store);

    check_in.select_mood_before(Mood::Anxious);
    check_in.edit_content(&"w".repeat(60)).unwrap();
    assert_eq!(check_in.phase(), Phase::Revealed);
    check_in.select_mood_after(Mood::Calm).unwrap();

    let state = check_in.settle().await;
    let stored = store.get(&state.bound_entry_id.unwrap()).await.unwrap();
    assert_eq!(stored.mood_after.as_deref(), Some("calm"));
    assert_eq!(store.len().await, 1);
}

#[tokio::test(start_paused = true)]
async fn test_transcripts_append_and_save() {
    let store = MemoryStore::new();
    let mut check_in = check_in(&store);
    check_in.select_mood_before(Mood::Neutral);
    check_in.edit_content("typed").unwrap();

    let mut capture = ScriptedCapture::new(["spoken one", "spoken two"]);
    let (tx, mut rx) = mpsc::unbounded_channel();
    assert!(capture.start(tx));
    check_in.apply_transcripts(&mut rx).unwrap();
    capture.stop();

    assert_eq!(
        check_in.session().unwrap().content(),
        "typed spoken one spoken two"
    );
    let state = check_in.settle().await;
    let stored = store.get(&state.bound_entry_id.unwrap()).await.unwrap();
    assert_eq!(stored.content, "typed spoken one spoken two");
}

#[tokio::test(start_paused = true)]
async fn test_guidance_follows_mood_before() {
    let store = MemoryStore::new();
    let mut check_in = check_in(&store);
    assert!(check_in.guidance().is_none());

    check_in.select_mood_before(Mood::Happy);
    assert!(check_in.guidance().unwrap().contains("happy feelings"));
}

#[tokio::test(start_paused = true)]
async fn test_sign_out_tears_everything_down() {
    let store = MemoryStore::new();
    let mut session = JournalSession::start(Arc::new(store.clone()), OwnerId::from("alice"), DELAY);
    session.feed().wait_for(|s| s.status == FeedStatus::Live).await;

    session.check_in_mut().select_mood_before(Mood::Calm);
    session.check_in_mut().edit_content("unsaved words").unwrap();
    session.sign_out();

    assert!(session.is_signed_out());
    assert_eq!(session.feed().status(), FeedStatus::Cancelled);
    assert_eq!(session.check_in().phase(), Phase::Idle);
    assert_eq!(session.check_in().settle().await.status, SaveStatus::Closed);

    tokio::time::sleep(DELAY * 2).await;
    assert!(store.is_empty().await);
}
