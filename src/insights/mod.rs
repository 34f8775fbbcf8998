//! Derived views over the entry feed: the mood trend series, the calendar
//! index and outcome moods.
//!
//! All views are computed from a feed snapshot and borrow from it. Entries
//! missing a mood-before or a creation time are left out of every view; this
//! is logged at debug level and is not an error.

pub mod calendar;
pub mod outcome;
pub mod series;

pub use calendar::{CalendarIndex, DayBucket};
pub use outcome::{
    history_rows, outcome_moods, HistoryRow, HistorySort, Outcome, SortDirection, SortField,
};
pub use series::{MoodPoint, MoodSeries};

use crate::model::JournalEntry;
use chrono::{DateTime, Local};
use std::fmt;
use tracing::debug;

/// Why an entry was left out of aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    MissingMoodBefore,
    MissingCreatedAt,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingMoodBefore => write!(f, "missing mood-before"),
            SkipReason::MissingCreatedAt => write!(f, "missing creation time"),
        }
    }
}

/// An entry that passed validation, with its creation time unwrapped.
#[derive(Debug, Clone, Copy)]
pub struct Dated<'a> {
    pub created_at: DateTime<Local>,
    pub entry: &'a JournalEntry,
}

/// Checks that `entry` can take part in aggregation. A blank mood-before
/// counts as missing.
pub fn validate(entry: &JournalEntry) -> Result<DateTime<Local>, SkipReason> {
    match (&entry.mood_before, entry.created_at) {
        (None, _) => Err(SkipReason::MissingMoodBefore),
        (Some(mood), _) if mood.trim().is_empty() => Err(SkipReason::MissingMoodBefore),
        (_, None) => Err(SkipReason::MissingCreatedAt),
        (Some(_), Some(created_at)) => Ok(created_at),
    }
}

/// Valid entries, oldest first.
///
/// `entries` is expected newest first, as the feed delivers them. Entries
/// created at the same instant come out in reverse feed order, so the last
/// element is always the first valid entry of the feed.
pub fn chronological(entries: &[JournalEntry]) -> Vec<Dated<'_>> {
    let mut dated: Vec<Dated<'_>> = entries
        .iter()
        .rev()
        .filter_map(|entry| match validate(entry) {
            Ok(created_at) => Some(Dated { created_at, entry }),
            Err(reason) => {
                debug!(entry_id = %entry.id, %reason, "Skipping entry in aggregation");
                None
            }
        })
        .collect();
    dated.sort_by_key(|d| d.created_at);
    dated
}
