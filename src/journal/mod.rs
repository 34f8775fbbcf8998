//! Check-ins for a signed-in user.
//!
//! This module ties the pure [`MoodLifecycle`] to a running autosave engine
//! and the owner's entry feed. The store is injected, so the same session
//! code runs against SQLite, the in-memory store or a test double.
//!
//! Every lifecycle operation that changes the draft forwards the new draft to
//! autosave; choosing a mood-before additionally rebinds autosave to a fresh
//! session so the next save creates a new entry.

#[cfg(test)]
mod tests;

use crate::autosave::{AutosaveHandle, AutosaveState};
use crate::errors::LifecycleError;
use crate::feed::EntryFeed;
use crate::guidance;
use crate::lifecycle::{Draft, DraftSession, MoodLifecycle, Phase, Transition};
use crate::model::OwnerId;
use crate::mood::Mood;
use crate::store::EntryStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info};

/// One user's check-in: the draft being written and its autosave engine.
pub struct CheckIn {
    lifecycle: MoodLifecycle,
    autosave: AutosaveHandle,
}

impl CheckIn {
    /// Starts an idle check-in. Must be called within a tokio runtime.
    pub fn new(store: Arc<dyn EntryStore>, owner: OwnerId, autosave_delay: Duration) -> Self {
        Self {
            lifecycle: MoodLifecycle::new(),
            autosave: AutosaveHandle::spawn(store, owner, autosave_delay),
        }
    }

    pub fn phase(&self) -> Phase {
        self.lifecycle.phase()
    }

    pub fn session(&self) -> Option<&DraftSession> {
        self.lifecycle.session()
    }

    pub fn draft(&self) -> Draft {
        self.lifecycle.draft()
    }

    /// Starts a new entry with `mood`, discarding the current draft.
    pub fn select_mood_before(&mut self, mood: Mood) -> Transition {
        let transition = self.lifecycle.select_mood_before(mood);
        self.autosave.rebind(self.lifecycle.draft());
        transition
    }

    pub fn edit_content(&mut self, text: &str) -> Result<Option<Transition>, LifecycleError> {
        let transition = self.lifecycle.edit_content(text)?;
        self.autosave.draft_changed(self.lifecycle.draft());
        Ok(transition)
    }

    pub fn append_transcript(&mut self, chunk: &str) -> Result<Option<Transition>, LifecycleError> {
        let transition = self.lifecycle.append_transcript(chunk)?;
        self.autosave.draft_changed(self.lifecycle.draft());
        Ok(transition)
    }

    pub fn select_mood_after(&mut self, mood: Mood) -> Result<(), LifecycleError> {
        self.lifecycle.select_mood_after(mood)?;
        self.autosave.draft_changed(self.lifecycle.draft());
        Ok(())
    }

    /// Appends every transcript chunk waiting in `transcripts`.
    ///
    /// Returns the reveal transition if one of the chunks caused it.
    pub fn apply_transcripts(
        &mut self,
        transcripts: &mut mpsc::UnboundedReceiver<String>,
    ) -> Result<Option<Transition>, LifecycleError> {
        let mut revealed = None;
        while let Ok(chunk) = transcripts.try_recv() {
            if let Some(transition) = self.append_transcript(&chunk)? {
                revealed = Some(transition);
            }
        }
        Ok(revealed)
    }

    /// Breathing guidance for the chosen mood-before.
    pub fn guidance(&self) -> Option<String> {
        self.lifecycle
            .session()
            .map(|session| guidance::meditation(session.mood_before()))
    }

    pub fn save_state(&self) -> AutosaveState {
        self.autosave.state()
    }

    pub fn watch_save_state(&self) -> watch::Receiver<AutosaveState> {
        self.autosave.subscribe()
    }

    /// Waits for pending and in-flight saves to finish.
    pub async fn settle(&self) -> AutosaveState {
        self.autosave.settle().await
    }

    /// Stops autosave and discards the draft.
    pub fn close(&mut self) {
        self.autosave.teardown();
        self.lifecycle.end();
        debug!("Check-in closed");
    }

    pub fn is_closed(&self) -> bool {
        self.autosave.is_closed()
    }
}

/// Everything that lives for the duration of one sign-in.
pub struct JournalSession {
    owner: OwnerId,
    feed: EntryFeed,
    check_in: CheckIn,
}

impl JournalSession {
    /// Opens the owner's feed and an idle check-in against `store`.
    pub fn start(store: Arc<dyn EntryStore>, owner: OwnerId, autosave_delay: Duration) -> Self {
        info!(owner = %owner, "Starting journal session");
        let feed = EntryFeed::subscribe(Arc::clone(&store), owner.clone());
        let check_in = CheckIn::new(store, owner.clone(), autosave_delay);
        Self {
            owner,
            feed,
            check_in,
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn feed(&self) -> &EntryFeed {
        &self.feed
    }

    pub fn check_in(&self) -> &CheckIn {
        &self.check_in
    }

    pub fn check_in_mut(&mut self) -> &mut CheckIn {
        &mut self.check_in
    }

    /// Tears the session down: cancels the feed, stops autosave and drops
    /// the draft. Writes already in flight finish without touching any
    /// session state.
    pub fn sign_out(&mut self) {
        self.feed.cancel();
        self.check_in.close();
        info!(owner = %self.owner, "Signed out");
    }

    pub fn is_signed_out(&self) -> bool {
        self.feed.is_cancelled() && self.check_in.is_closed()
    }
}
