//! Live, owner-scoped view of persisted entries.
//!
//! The feed is the only way written data reaches the rest of the client: the
//! autosave engine writes to the store, the store pushes snapshots, and the
//! feed replaces its list wholesale on every push. Readers get an
//! `Arc<Vec<JournalEntry>>` they can hold without blocking updates.

use crate::errors::SubscriptionError;
use crate::model::{JournalEntry, OwnerId};
use crate::store::EntryStore;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

const TARGET: &str = "feed";

/// Health of the subscription behind a feed.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedStatus {
    /// Waiting for the first snapshot.
    Connecting,
    Live,
    /// The subscription failed; entries are the last good snapshot.
    Stale(SubscriptionError),
    Cancelled,
}

/// What a feed currently holds.
#[derive(Debug, Clone)]
pub struct FeedState {
    /// Entries newest first.
    pub entries: Arc<Vec<JournalEntry>>,
    pub status: FeedStatus,
    /// Number of snapshots received so far.
    pub revision: u64,
}

impl Default for FeedState {
    fn default() -> Self {
        Self {
            entries: Arc::new(Vec::new()),
            status: FeedStatus::Connecting,
            revision: 0,
        }
    }
}

/// A running subscription to one owner's entries.
///
/// Dropping the feed cancels it.
pub struct EntryFeed {
    owner: OwnerId,
    state: Arc<watch::Sender<FeedState>>,
    cancel: CancellationToken,
}

impl EntryFeed {
    /// Opens the subscription on the current tokio runtime.
    pub fn subscribe(store: Arc<dyn EntryStore>, owner: OwnerId) -> Self {
        let (state, _) = watch::channel(FeedState::default());
        let state = Arc::new(state);
        let cancel = CancellationToken::new();

        tokio::spawn(run_feed(
            store,
            owner.clone(),
            Arc::clone(&state),
            cancel.clone(),
        ));

        Self {
            owner,
            state,
            cancel,
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    /// The latest snapshot.
    pub fn snapshot(&self) -> Arc<Vec<JournalEntry>> {
        Arc::clone(&self.state.borrow().entries)
    }

    pub fn status(&self) -> FeedStatus {
        self.state.borrow().status.clone()
    }

    /// A receiver notified on every snapshot and status change.
    pub fn watch(&self) -> watch::Receiver<FeedState> {
        self.state.subscribe()
    }

    /// Waits until the feed state satisfies `predicate`.
    pub async fn wait_for(&self, predicate: impl FnMut(&FeedState) -> bool) -> FeedState {
        let mut rx = self.state.subscribe();
        let result = rx.wait_for(predicate).await.map(|state| state.clone());
        match result {
            Ok(state) => state,
            Err(_) => self.state.borrow().clone(),
        }
    }

    /// Stops further pushes. The held snapshot stays readable.
    pub fn cancel(&self) {
        if self.cancel.is_cancelled() {
            return;
        }
        self.cancel.cancel();
        self.state.send_modify(|state| state.status = FeedStatus::Cancelled);
        info!(target: TARGET, owner = %self.owner, "Feed cancelled");
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for EntryFeed {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run_feed(
    store: Arc<dyn EntryStore>,
    owner: OwnerId,
    state: Arc<watch::Sender<FeedState>>,
    cancel: CancellationToken,
) {
    let subscribed = tokio::select! {
        biased;
        _ = cancel.cancelled() => return,
        result = store.subscribe(&owner) => result,
    };

    let mut stream = match subscribed {
        Ok(stream) => stream,
        Err(e) => {
            warn!(target: TARGET, owner = %owner, error = %e, "Could not subscribe to entries");
            mark_stale(&state, &cancel, SubscriptionError::Establish(e.to_string()));
            return;
        }
    };
    debug!(target: TARGET, owner = %owner, "Subscription established");

    loop {
        let item = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            item = stream.next() => item,
        };

        match item {
            Some(Ok(snapshot)) => {
                let entries: Vec<JournalEntry> =
                    snapshot.into_iter().map(JournalEntry::from).collect();
                debug!(target: TARGET, owner = %owner, count = entries.len(), "Snapshot received");
                let entries = Arc::new(entries);
                state.send_if_modified(|current| {
                    if cancel.is_cancelled() {
                        return false;
                    }
                    current.entries = entries;
                    current.status = FeedStatus::Live;
                    current.revision += 1;
                    true
                });
            }
            Some(Err(e)) => {
                warn!(target: TARGET, owner = %owner, error = %e, "Entry feed interrupted");
                mark_stale(&state, &cancel, SubscriptionError::Interrupted(e.to_string()));
                break;
            }
            None => {
                warn!(target: TARGET, owner = %owner, "Entry feed closed by the store");
                mark_stale(&state, &cancel, SubscriptionError::Closed);
                break;
            }
        }
    }
    debug!(target: TARGET, owner = %owner, "Feed task finished");
}

fn mark_stale(
    state: &watch::Sender<FeedState>,
    cancel: &CancellationToken,
    error: SubscriptionError,
) {
    state.send_if_modified(|current| {
        if cancel.is_cancelled() {
            return false;
        }
        current.status = FeedStatus::Stale(error);
        true
    });
}
