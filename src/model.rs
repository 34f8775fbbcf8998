//! Journal entry records as the store holds them and as the feed exposes them.

use crate::mood::Mood;
use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier assigned by the store on the first successful create.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque, stable identifier of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Store-native timestamp: seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StoreTimestamp {
    pub seconds: i64,
    pub nanos: u32,
}

impl StoreTimestamp {
    pub fn now() -> Self {
        Self::from(Utc::now())
    }

    /// Converts to a local date-time; `None` when out of chrono's range.
    pub fn to_local(self) -> Option<DateTime<Local>> {
        DateTime::from_timestamp(self.seconds, self.nanos).map(|utc| utc.with_timezone(&Local))
    }
}

impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for StoreTimestamp {
    fn from(dt: DateTime<Tz>) -> Self {
        Self {
            seconds: dt.timestamp(),
            nanos: dt.timestamp_subsec_nanos(),
        }
    }
}

/// An entry exactly as the store returns it.
///
/// Moods are raw strings and every field past `id` may be missing: the store
/// can hold records this client did not write.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub id: EntryId,
    pub owner_id: OwnerId,
    pub content: String,
    pub mood_before: Option<String>,
    pub mood_after: Option<String>,
    pub created_at: Option<StoreTimestamp>,
    pub updated_at: Option<StoreTimestamp>,
}

/// An entry as seen through the feed, with calendar-usable timestamps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: EntryId,
    pub owner_id: OwnerId,
    pub content: String,
    pub mood_before: Option<String>,
    pub mood_after: Option<String>,
    pub created_at: Option<DateTime<Local>>,
    pub updated_at: Option<DateTime<Local>>,
}

impl JournalEntry {
    /// The mood that best describes where the entry ended up: the
    /// mood-after when recorded, otherwise the mood-before.
    pub fn settled_mood(&self) -> Option<&str> {
        self.mood_after
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.mood_before.as_deref())
    }
}

impl From<StoredEntry> for JournalEntry {
    fn from(stored: StoredEntry) -> Self {
        JournalEntry {
            id: stored.id,
            owner_id: stored.owner_id,
            content: stored.content,
            mood_before: stored.mood_before,
            mood_after: stored.mood_after,
            created_at: stored.created_at.and_then(StoreTimestamp::to_local),
            updated_at: stored.updated_at.and_then(StoreTimestamp::to_local),
        }
    }
}

/// Payload for creating an entry.
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub owner_id: OwnerId,
    pub content: String,
    pub mood_before: Mood,
    pub mood_after: Option<Mood>,
    pub created_at: StoreTimestamp,
    pub updated_at: StoreTimestamp,
}

/// Payload for updating an entry bound to a draft session.
///
/// A `None` mood-after leaves any stored mood-after in place.
#[derive(Debug, Clone, PartialEq)]
pub struct EntryPatch {
    pub content: String,
    pub mood_before: Mood,
    pub mood_after: Option<Mood>,
    pub updated_at: StoreTimestamp,
}
