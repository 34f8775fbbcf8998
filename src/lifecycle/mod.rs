//! The check-in workflow as a pure state machine.
//!
//! A check-in starts when a mood-before is chosen, lets the user write, and
//! reveals the mood-after selector once the entry is long enough. Nothing in
//! here performs I/O; the autosave engine is told about changes by the caller
//! (see [`crate::journal::CheckIn`]).
//!
//! ```
//! use moodtrail::lifecycle::{MoodLifecycle, Phase};
//! use moodtrail::Mood;
//!
//! let mut lifecycle = MoodLifecycle::new();
//! lifecycle.select_mood_before(Mood::Anxious);
//! assert_eq!(lifecycle.phase(), Phase::Active);
//!
//! lifecycle.edit_content(&"a".repeat(60)).unwrap();
//! assert_eq!(lifecycle.phase(), Phase::Revealed);
//! ```

use crate::constants::MOOD_AFTER_REVEAL_THRESHOLD;
use crate::errors::{LifecycleError, ValidationError};
use crate::mood::Mood;
use tracing::debug;

/// Where the check-in currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No mood-before chosen yet.
    Idle,
    /// Mood-before chosen, content editable, mood-after hidden.
    Active,
    /// Mood-after selector shown. Mood-before is still changeable.
    Revealed,
}

/// A phase change produced by a lifecycle operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Phase,
    pub to: Phase,
}

/// The user-facing half of a draft session.
///
/// The bound entry id, dirty flag and save timer belong to the autosave
/// engine and are not part of this struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftSession {
    content: String,
    mood_before: Mood,
    mood_after: Option<Mood>,
    revealed: bool,
}

impl DraftSession {
    fn start(mood_before: Mood) -> Self {
        Self {
            content: String::new(),
            mood_before,
            mood_after: None,
            revealed: false,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn mood_before(&self) -> Mood {
        self.mood_before
    }

    pub fn mood_after(&self) -> Option<Mood> {
        self.mood_after
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    /// Sets the reveal flag if the content just crossed the threshold.
    fn check_reveal(&mut self) -> bool {
        if !self.revealed && self.content.chars().count() > MOOD_AFTER_REVEAL_THRESHOLD {
            self.revealed = true;
            return true;
        }
        false
    }
}

/// Snapshot of the fields autosave cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Draft {
    pub content: String,
    pub mood_before: Option<Mood>,
    pub mood_after: Option<Mood>,
}

impl Draft {
    /// Whether this draft may be written to the store.
    pub fn qualifies(&self) -> Result<Mood, ValidationError> {
        let mood_before = self.mood_before.ok_or(ValidationError::MissingMoodBefore)?;
        if self.content.is_empty() {
            return Err(ValidationError::EmptyContent);
        }
        Ok(mood_before)
    }
}

impl From<&DraftSession> for Draft {
    fn from(session: &DraftSession) -> Self {
        Draft {
            content: session.content.clone(),
            mood_before: Some(session.mood_before),
            mood_after: session.mood_after,
        }
    }
}

/// State machine for one signed-in user's check-ins.
#[derive(Debug, Default)]
pub struct MoodLifecycle {
    session: Option<DraftSession>,
}

impl MoodLifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        match &self.session {
            None => Phase::Idle,
            Some(s) if s.revealed => Phase::Revealed,
            Some(_) => Phase::Active,
        }
    }

    pub fn session(&self) -> Option<&DraftSession> {
        self.session.as_ref()
    }

    /// The current draft, empty while idle.
    pub fn draft(&self) -> Draft {
        self.session.as_ref().map(Draft::from).unwrap_or_default()
    }

    /// Starts a logically new entry, from any phase.
    ///
    /// Content and mood-after are cleared and the mood-after selector is hidden
    /// again. Callers must also drop the bound entry id so the next save
    /// creates a fresh record.
    pub fn select_mood_before(&mut self, mood: Mood) -> Transition {
        let from = self.phase();
        debug!(from = ?from, mood = %mood, "Starting new check-in");
        self.session = Some(DraftSession::start(mood));
        Transition {
            from,
            to: Phase::Active,
        }
    }

    /// Replaces the content; reveals the mood-after selector once the text is
    /// longer than the threshold. The reveal is never undone within a session.
    pub fn edit_content(&mut self, text: &str) -> Result<Option<Transition>, LifecycleError> {
        let session = self.session.as_mut().ok_or(LifecycleError::NoMoodBefore)?;
        session.content = text.to_string();
        Ok(Self::reveal_transition(session))
    }

    /// Appends a dictated chunk, separated from existing text by one space.
    pub fn append_transcript(&mut self, chunk: &str) -> Result<Option<Transition>, LifecycleError> {
        let session = self.session.as_mut().ok_or(LifecycleError::NoMoodBefore)?;
        if session.content.is_empty() {
            session.content = chunk.to_string();
        } else {
            session.content.push(' ');
            session.content.push_str(chunk);
        }
        Ok(Self::reveal_transition(session))
    }

    pub fn select_mood_after(&mut self, mood: Mood) -> Result<(), LifecycleError> {
        let session = self.session.as_mut().ok_or(LifecycleError::NoMoodBefore)?;
        session.mood_after = Some(mood);
        Ok(())
    }

    /// Discards the draft (sign-out or session end).
    pub fn end(&mut self) {
        self.session = None;
    }

    fn reveal_transition(session: &mut DraftSession) -> Option<Transition> {
        if session.check_reveal() {
            debug!("Revealing mood-after selector");
            Some(Transition {
                from: Phase::Active,
                to: Phase::Revealed,
            })
        } else {
            None
        }
    }
}
