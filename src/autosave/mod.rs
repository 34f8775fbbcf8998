//! Debounced persistence of the current draft.
//!
//! One engine task per check-in owns every piece of write-side state: the
//! latest draft, the entry id the session is bound to, the debounce deadline
//! and the write in flight. Callers talk to it through an [`AutosaveHandle`]
//! and observe it through a `watch` channel of [`AutosaveState`].
//!
//! Rules the engine keeps:
//!
//! - Every qualifying change re-arms the timer, so only the last change in a
//!   quiet period is written.
//! - The first successful write creates the entry and binds its id; every
//!   later write of the same session updates that id.
//! - At most one write is in flight. A timer that expires during a write is
//!   deferred until the write resolves, then issued with the latest draft.
//! - A failed write leaves the draft dirty and is not retried.
//! - [`AutosaveHandle::rebind`] starts a new session. Results of writes issued
//!   before it are ignored.

use crate::errors::{PersistenceError, StoreError, WriteOperation};
use crate::lifecycle::Draft;
use crate::model::{EntryId, EntryPatch, NewEntry, OwnerId, StoreTimestamp};
use crate::store::EntryStore;
use chrono::{DateTime, Local};
use std::future::pending;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const TARGET: &str = "autosave";

/// Save status shown next to the editor.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveStatus {
    /// Nothing written yet in this session.
    Idle,
    /// A change is waiting for the debounce timer.
    Pending,
    /// A write is in flight.
    Saving,
    /// The last write succeeded.
    Saved {
        entry_id: EntryId,
        at: DateTime<Local>,
    },
    /// The last write failed; the draft is still dirty.
    NotSaved(PersistenceError),
    /// The engine was torn down.
    Closed,
}

/// Snapshot of the engine published after every event it handles.
#[derive(Debug, Clone, PartialEq)]
pub struct AutosaveState {
    pub status: SaveStatus,
    pub bound_entry_id: Option<EntryId>,
    /// The draft has changes no successful write has covered yet.
    pub dirty: bool,
    /// The debounce timer is armed.
    pub pending: bool,
    pub in_flight: bool,
    pub last_saved: Option<DateTime<Local>>,
    acknowledged: u64,
}

impl Default for AutosaveState {
    fn default() -> Self {
        Self {
            status: SaveStatus::Idle,
            bound_entry_id: None,
            dirty: false,
            pending: false,
            in_flight: false,
            last_saved: None,
            acknowledged: 0,
        }
    }
}

impl AutosaveState {
    /// No timer armed and no write in flight.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, SaveStatus::Closed) || (!self.pending && !self.in_flight)
    }
}

#[derive(Debug)]
enum Command {
    Changed(Draft),
    Rebind(Draft),
}

enum WriteOutcome {
    Created(Result<EntryId, StoreError>),
    Updated(Result<(), StoreError>),
}

struct InFlight {
    handle: JoinHandle<WriteOutcome>,
    operation: WriteOperation,
    epoch: u64,
    revision: u64,
}

enum Event {
    Shutdown,
    Command(Command),
    WriteDone(Result<WriteOutcome, JoinError>),
    TimerFired,
}

struct AutosaveEngine {
    store: Arc<dyn EntryStore>,
    owner: OwnerId,
    delay: Duration,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
    state_tx: watch::Sender<AutosaveState>,

    draft: Draft,
    bound: Option<EntryId>,
    epoch: u64,
    revision: u64,
    saved_revision: u64,
    deadline: Option<Instant>,
    in_flight: Option<InFlight>,
    deferred: bool,
    outcome: SaveStatus,
    last_saved: Option<DateTime<Local>>,
    acknowledged: u64,
}

impl AutosaveEngine {
    async fn run(mut self) {
        info!(
            target: TARGET,
            owner = %self.owner,
            delay_ms = self.delay.as_millis() as u64,
            "Autosave started"
        );
        loop {
            match self.next_event().await {
                Event::Shutdown => break,
                Event::Command(command) => {
                    self.acknowledged += 1;
                    self.handle_command(command);
                }
                Event::WriteDone(result) => self.handle_write_done(result),
                Event::TimerFired => self.handle_timer(),
            }
            self.publish();
        }

        if self.in_flight.is_some() {
            debug!(target: TARGET, "Detaching in-flight write on teardown");
        }
        self.deadline = None;
        self.outcome = SaveStatus::Closed;
        self.publish();
        info!(target: TARGET, owner = %self.owner, "Autosave stopped");
    }

    async fn next_event(&mut self) -> Event {
        let deadline = self.deadline;
        let in_flight = &mut self.in_flight;
        let commands = &mut self.commands;

        tokio::select! {
            biased;
            _ = self.shutdown.cancelled() => Event::Shutdown,
            result = async {
                match in_flight {
                    Some(flight) => (&mut flight.handle).await,
                    None => pending().await,
                }
            } => Event::WriteDone(result),
            command = commands.recv() => match command {
                Some(command) => Event::Command(command),
                None => Event::Shutdown,
            },
            _ = async {
                match deadline {
                    Some(at) => sleep_until(at).await,
                    None => pending().await,
                }
            } => Event::TimerFired,
        }
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Changed(draft) => {
                self.draft = draft;
                // Only content that could be written makes the draft dirty
                if self.draft.qualifies().is_ok() {
                    self.revision += 1;
                }
                self.schedule();
            }
            Command::Rebind(draft) => {
                self.epoch += 1;
                self.bound = None;
                self.deferred = false;
                self.deadline = None;
                self.outcome = SaveStatus::Idle;
                self.draft = draft;
                self.revision += 1;
                self.saved_revision = self.revision;
                debug!(target: TARGET, epoch = self.epoch, "Started new draft session");
                // A rebind carrying content behaves like a first edit
                if self.draft.qualifies().is_ok() {
                    self.saved_revision = self.revision - 1;
                    self.schedule();
                }
            }
        }
    }

    fn schedule(&mut self) {
        match self.draft.qualifies() {
            Ok(_) => {
                self.deadline = Some(Instant::now() + self.delay);
                debug!(target: TARGET, revision = self.revision, "Debounce timer armed");
            }
            Err(reason) => {
                self.deferred = false;
                if self.deadline.take().is_some() {
                    debug!(target: TARGET, %reason, "Pending save cancelled");
                } else {
                    debug!(target: TARGET, %reason, "Change does not qualify for autosave");
                }
            }
        }
    }

    fn handle_timer(&mut self) {
        self.deadline = None;
        if self.in_flight.is_some() {
            debug!(target: TARGET, "Write in flight, deferring save");
            self.deferred = true;
            return;
        }
        if !self.is_dirty() {
            debug!(target: TARGET, "Nothing new since the last save");
            return;
        }
        self.issue_write();
    }

    fn issue_write(&mut self) {
        let mood_before = match self.draft.qualifies() {
            Ok(mood) => mood,
            Err(reason) => {
                debug!(target: TARGET, %reason, "Skipping write");
                return;
            }
        };
        let store = Arc::clone(&self.store);
        let now = StoreTimestamp::now();

        let (operation, handle) = match &self.bound {
            Some(id) => {
                let id = id.clone();
                let patch = EntryPatch {
                    content: self.draft.content.clone(),
                    mood_before,
                    mood_after: self.draft.mood_after,
                    updated_at: now,
                };
                debug!(target: TARGET, entry_id = %id, "Updating entry");
                let handle = tokio::spawn(async move {
                    WriteOutcome::Updated(store.update(&id, patch).await)
                });
                (WriteOperation::Update, handle)
            }
            None => {
                let entry = NewEntry {
                    owner_id: self.owner.clone(),
                    content: self.draft.content.clone(),
                    mood_before,
                    mood_after: self.draft.mood_after,
                    created_at: now,
                    updated_at: now,
                };
                debug!(target: TARGET, "Creating entry");
                let handle =
                    tokio::spawn(async move { WriteOutcome::Created(store.create(entry).await) });
                (WriteOperation::Create, handle)
            }
        };

        self.in_flight = Some(InFlight {
            handle,
            operation,
            epoch: self.epoch,
            revision: self.revision,
        });
    }

    fn handle_write_done(&mut self, result: Result<WriteOutcome, JoinError>) {
        let Some(flight) = self.in_flight.take() else {
            return;
        };

        if flight.epoch != self.epoch {
            debug!(
                target: TARGET,
                operation = %flight.operation,
                "Ignoring result from a previous session"
            );
        } else {
            self.apply_outcome(&flight, result);
        }

        if std::mem::take(&mut self.deferred) && self.is_dirty() {
            debug!(target: TARGET, "Issuing deferred save");
            self.issue_write();
        }
    }

    fn apply_outcome(&mut self, flight: &InFlight, result: Result<WriteOutcome, JoinError>) {
        let result = match result {
            Ok(WriteOutcome::Created(Ok(id))) => {
                info!(target: TARGET, entry_id = %id, "Entry created");
                self.bound = Some(id.clone());
                Ok(id)
            }
            Ok(WriteOutcome::Updated(Ok(()))) => match &self.bound {
                Some(id) => {
                    debug!(target: TARGET, entry_id = %id, "Entry updated");
                    Ok(id.clone())
                }
                None => Err("update finished without a bound entry".to_string()),
            },
            Ok(WriteOutcome::Created(Err(e))) | Ok(WriteOutcome::Updated(Err(e))) => {
                Err(e.to_string())
            }
            Err(e) => Err(format!("write task failed: {}", e)),
        };

        match result {
            Ok(entry_id) => {
                let at = Local::now();
                self.saved_revision = self.saved_revision.max(flight.revision);
                self.last_saved = Some(at);
                self.outcome = SaveStatus::Saved { entry_id, at };
            }
            Err(message) => {
                warn!(
                    target: TARGET,
                    operation = %flight.operation,
                    error = %message,
                    "Entry not saved"
                );
                self.outcome =
                    SaveStatus::NotSaved(PersistenceError::new(flight.operation, message));
            }
        }
    }

    fn is_dirty(&self) -> bool {
        self.revision != self.saved_revision
    }

    fn publish(&self) {
        let status = if matches!(self.outcome, SaveStatus::Closed) {
            SaveStatus::Closed
        } else if self.in_flight.is_some() {
            SaveStatus::Saving
        } else if self.deadline.is_some() {
            SaveStatus::Pending
        } else {
            self.outcome.clone()
        };

        let state = AutosaveState {
            status,
            bound_entry_id: self.bound.clone(),
            dirty: self.is_dirty(),
            pending: self.deadline.is_some(),
            in_flight: self.in_flight.is_some(),
            last_saved: self.last_saved,
            acknowledged: self.acknowledged,
        };
        self.state_tx.send_replace(state);
    }
}

/// Handle to a running autosave engine.
///
/// Dropping the handle tears the engine down.
pub struct AutosaveHandle {
    commands: mpsc::UnboundedSender<Command>,
    state: watch::Receiver<AutosaveState>,
    shutdown: CancellationToken,
    sent: AtomicU64,
}

impl AutosaveHandle {
    /// Starts an engine for `owner` on the current tokio runtime.
    pub fn spawn(store: Arc<dyn EntryStore>, owner: OwnerId, delay: Duration) -> Self {
        let (commands_tx, commands_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(AutosaveState::default());
        let shutdown = CancellationToken::new();

        let engine = AutosaveEngine {
            store,
            owner,
            delay,
            commands: commands_rx,
            shutdown: shutdown.clone(),
            state_tx,
            draft: Draft::default(),
            bound: None,
            epoch: 0,
            revision: 0,
            saved_revision: 0,
            deadline: None,
            in_flight: None,
            deferred: false,
            outcome: SaveStatus::Idle,
            last_saved: None,
            acknowledged: 0,
        };
        tokio::spawn(engine.run());

        Self {
            commands: commands_tx,
            state: state_rx,
            shutdown,
            sent: AtomicU64::new(0),
        }
    }

    /// Reports the latest draft. Schedules a save if it qualifies, cancels
    /// the pending one otherwise.
    pub fn draft_changed(&self, draft: Draft) {
        self.send(Command::Changed(draft));
    }

    /// Starts a new session: clears the bound id and discards unsaved edits
    /// of the previous one.
    pub fn rebind(&self, draft: Draft) {
        self.send(Command::Rebind(draft));
    }

    pub fn state(&self) -> AutosaveState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AutosaveState> {
        self.state.clone()
    }

    /// Waits until every command sent so far has been handled, no timer is
    /// armed and no write is in flight.
    pub async fn settle(&self) -> AutosaveState {
        let sent = self.sent.load(Ordering::SeqCst);
        let mut state = self.state.clone();
        let settled = state
            .wait_for(|s| {
                matches!(s.status, SaveStatus::Closed) || (s.acknowledged >= sent && s.is_settled())
            })
            .await
            .map(|s| s.clone());
        match settled {
            Ok(s) => s,
            Err(_) => self.state(),
        }
    }

    /// Stops the engine. A pending save is dropped; a write in flight runs to
    /// completion without touching session state.
    pub fn teardown(&self) {
        self.shutdown.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    fn send(&self, command: Command) {
        if self.commands.send(command).is_ok() {
            self.sent.fetch_add(1, Ordering::SeqCst);
        } else {
            debug!(target: TARGET, "Autosave engine is gone, dropping change");
        }
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mood::Mood;
    use crate::store::MemoryStore;

    const DELAY: Duration = Duration::from_millis(3000);

    fn draft(content: &str) -> Draft {
        Draft {
            content: content.to_string(),
            mood_before: Some(Mood::Anxious),
            mood_after: None,
        }
    }

    #[test]
    fn test_default_state_is_settled() {
        let state = AutosaveState::default();
        assert_eq!(state.status, SaveStatus::Idle);
        assert!(state.is_settled());
        assert!(!state.dirty);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_save_creates_and_binds() {
        let store = MemoryStore::new();
        let handle = AutosaveHandle::spawn(Arc::new(store.clone()), OwnerId::from("alice"), DELAY);

        handle.draft_changed(draft("I feel tense"));
        let state = handle.settle().await;

        let id = state.bound_entry_id.clone().unwrap();
        assert!(matches!(state.status, SaveStatus::Saved { ref entry_id, .. } if *entry_id == id));
        assert!(!state.dirty);
        let stored = store.get(&id).await.unwrap();
        assert_eq!(stored.content, "I feel tense");
        assert_eq!(stored.mood_before.as_deref(), Some("anxious"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_qualifying_change_does_not_schedule() {
        let store = MemoryStore::new();
        let handle = AutosaveHandle::spawn(Arc::new(store.clone()), OwnerId::from("alice"), DELAY);

        handle.draft_changed(draft(""));
        handle.draft_changed(Draft {
            content: "no mood yet".to_string(),
            mood_before: None,
            mood_after: None,
        });
        let state = handle.settle().await;

        assert_eq!(state.status, SaveStatus::Idle);
        assert!(state.bound_entry_id.is_none());
        assert!(store.is_empty().await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clearing_saved_draft_stays_clean() {
        let store = MemoryStore::new();
        let handle = AutosaveHandle::spawn(Arc::new(store.clone()), OwnerId::from("alice"), DELAY);

        handle.draft_changed(draft("Kept this one"));
        let saved = handle.settle().await;
        let id = saved.bound_entry_id.clone().unwrap();

        handle.draft_changed(draft(""));
        let state = handle.settle().await;
        assert!(!state.dirty);
        assert!(matches!(state.status, SaveStatus::Saved { ref entry_id, .. } if *entry_id == id));

        tokio::time::sleep(DELAY * 2).await;
        assert_eq!(store.len().await, 1);
        assert_eq!(store.get(&id).await.unwrap().content, "Kept this one");
    }

    #[tokio::test(start_paused = true)]
    async fn test_teardown_publishes_closed() {
        let store = MemoryStore::new();
        let handle = AutosaveHandle::spawn(Arc::new(store.clone()), OwnerId::from("alice"), DELAY);

        handle.draft_changed(draft("never written"));
        handle.teardown();
        let state = handle.settle().await;

        assert_eq!(state.status, SaveStatus::Closed);
        assert!(handle.is_closed());
        tokio::time::sleep(DELAY * 2).await;
        assert!(store.is_empty().await);
    }
}
