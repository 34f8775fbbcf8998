//! Outcome moods and the sortable history table.
//!
//! An entry's outcome is where the user ended up: the mood-before of the next
//! entry they wrote. The most recent entry has no successor, so its own
//! mood-after stands in.

use super::chronological;
use crate::errors::AppError;
use crate::model::JournalEntry;
use chrono::{DateTime, Local};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// An entry paired with its outcome mood.
#[derive(Debug, Clone, Copy)]
pub struct Outcome<'a> {
    pub created_at: DateTime<Local>,
    pub entry: &'a JournalEntry,
    pub outcome: Option<&'a str>,
}

/// Outcome moods for the valid entries, oldest first.
///
/// ```
/// use moodtrail::insights::outcome_moods;
///
/// assert!(outcome_moods(&[]).is_empty());
/// ```
pub fn outcome_moods(entries: &[JournalEntry]) -> Vec<Outcome<'_>> {
    let ordered = chronological(entries);
    let mut outcomes = Vec::with_capacity(ordered.len());
    let mut iter = ordered.into_iter().peekable();

    while let Some(current) = iter.next() {
        let outcome = match iter.peek().map(|next| next.entry) {
            Some(next) => next.mood_before.as_deref(),
            None => current.entry.mood_after.as_deref(),
        };
        outcomes.push(Outcome {
            created_at: current.created_at,
            entry: current.entry,
            outcome,
        });
    }
    outcomes
}

/// Column a history table is sorted by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Created,
    MoodBefore,
    /// Sorts by the outcome mood shown in the "after" column.
    MoodAfter,
    Content,
}

impl FromStr for SortField {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "created" | "date" => Ok(SortField::Created),
            "before" | "mood-before" => Ok(SortField::MoodBefore),
            "after" | "mood-after" => Ok(SortField::MoodAfter),
            "content" => Ok(SortField::Content),
            other => Err(AppError::Input(format!(
                "unknown sort field '{}' (expected one of: created, before, after, content)",
                other
            ))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SortField::Created => "created",
            SortField::MoodBefore => "before",
            SortField::MoodAfter => "after",
            SortField::Content => "content",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortDirection {
    fn flipped(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

/// Sort order of a history table, newest first by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistorySort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl HistorySort {
    pub fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Applies a click on a column header: the same field flips the
    /// direction, another field sorts by it descending.
    pub fn toggle(&mut self, field: SortField) {
        if self.field == field {
            self.direction = self.direction.flipped();
        } else {
            self.field = field;
            self.direction = SortDirection::Descending;
        }
    }
}

/// One row of the history table.
pub type HistoryRow<'a> = Outcome<'a>;

/// Valid entries with their outcome moods, in `sort` order.
pub fn history_rows(entries: &[JournalEntry], sort: HistorySort) -> Vec<HistoryRow<'_>> {
    let mut rows = outcome_moods(entries);
    rows.sort_by(|a, b| {
        let ordering = compare(a, b, sort.field);
        match sort.direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
    rows
}

fn compare(a: &HistoryRow<'_>, b: &HistoryRow<'_>, field: SortField) -> Ordering {
    match field {
        SortField::Created => a.created_at.cmp(&b.created_at),
        SortField::MoodBefore => {
            text(a.entry.mood_before.as_deref()).cmp(&text(b.entry.mood_before.as_deref()))
        }
        SortField::MoodAfter => text(a.outcome).cmp(&text(b.outcome)),
        SortField::Content => {
            text(Some(a.entry.content.as_str())).cmp(&text(Some(b.entry.content.as_str())))
        }
    }
}

/// Case-insensitive sort key; missing values sort as empty.
fn text(value: Option<&str>) -> String {
    value.unwrap_or_default().to_lowercase()
}
