//! Calendar-day index of entries.

use super::{chronological, Dated};
use crate::model::JournalEntry;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Entries of one local calendar day.
#[derive(Debug, Clone)]
pub struct DayBucket<'a> {
    pub date: NaiveDate,
    /// Oldest first.
    entries: Vec<Dated<'a>>,
}

impl<'a> DayBucket<'a> {
    /// The settled mood of the most recently created entry of the day. On a
    /// tie, the entry listed first in the feed wins.
    pub fn representative_mood(&self) -> Option<&'a str> {
        self.entries.last().and_then(|d| d.entry.settled_mood())
    }

    pub fn entries(&self) -> impl Iterator<Item = &'a JournalEntry> + '_ {
        self.entries.iter().map(|d| d.entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Valid entries grouped by the local date of their creation time.
#[derive(Debug, Clone, Default)]
pub struct CalendarIndex<'a> {
    days: BTreeMap<NaiveDate, DayBucket<'a>>,
}

impl<'a> CalendarIndex<'a> {
    pub fn new(entries: &'a [JournalEntry]) -> Self {
        let mut days: BTreeMap<NaiveDate, DayBucket<'a>> = BTreeMap::new();
        for dated in chronological(entries) {
            let date = dated.created_at.date_naive();
            days.entry(date)
                .or_insert_with(|| DayBucket {
                    date,
                    entries: Vec::new(),
                })
                .entries
                .push(dated);
        }
        Self { days }
    }

    /// Representative mood for `date`, `None` for a day without entries.
    pub fn mood_for(&self, date: NaiveDate) -> Option<&'a str> {
        self.days.get(&date).and_then(DayBucket::representative_mood)
    }

    /// Entries created on `date`, oldest first.
    pub fn entries_on(&self, date: NaiveDate) -> Vec<&'a JournalEntry> {
        self.days
            .get(&date)
            .map(|bucket| bucket.entries().collect())
            .unwrap_or_default()
    }

    pub fn day(&self, date: NaiveDate) -> Option<&DayBucket<'a>> {
        self.days.get(&date)
    }

    /// All days with entries, in date order.
    pub fn days(&self) -> impl Iterator<Item = &DayBucket<'a>> + '_ {
        self.days.values()
    }

    /// Days with entries in the given month.
    pub fn month(&self, year: i32, month: u32) -> impl Iterator<Item = &DayBucket<'a>> + '_ {
        self.days
            .values()
            .filter(move |bucket| bucket.date.year() == year && bucket.date.month() == month)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}
