//! The chronological mood trend.

use super::{chronological, Dated};
use crate::constants::SERIES_LABEL_FORMAT;
use crate::model::JournalEntry;
use crate::mood::scale;
use chrono::{DateTime, Local};
use serde::Serialize;

/// One point of the trend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MoodPoint {
    pub timestamp: DateTime<Local>,
    /// Short axis label, e.g. `Jan 5, 02:30 PM`.
    pub label: String,
    /// 1..=5, from the settled mood of the entry.
    pub value: u8,
}

/// Trend over a feed snapshot, oldest entry first.
///
/// Points are computed on iteration; calling [`MoodSeries::iter`] again
/// restarts from the first entry.
///
/// ```
/// use moodtrail::insights::MoodSeries;
///
/// let series = MoodSeries::new(&[]);
/// assert!(series.is_empty());
/// assert_eq!(series.iter().count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MoodSeries<'a> {
    entries: Vec<Dated<'a>>,
}

impl<'a> MoodSeries<'a> {
    pub fn new(entries: &'a [JournalEntry]) -> Self {
        Self {
            entries: chronological(entries),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = MoodPoint> + '_ {
        self.entries.iter().map(|dated| MoodPoint {
            timestamp: dated.created_at,
            label: dated.created_at.format(SERIES_LABEL_FORMAT).to_string(),
            value: scale(dated.entry.settled_mood()),
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Mean scale value, `None` for an empty series.
    pub fn average(&self) -> Option<f64> {
        if self.entries.is_empty() {
            return None;
        }
        let total: u32 = self.iter().map(|p| u32::from(p.value)).sum();
        Some(f64::from(total) / self.entries.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::insights::test_support::entry_at;

    #[test]
    fn test_series_is_ascending_with_settled_values() {
        let entries = vec![
            entry_at("second", (2024, 1, 5, 14, 30), Some("sad"), None),
            entry_at("first", (2024, 1, 4, 9, 5), Some("anxious"), Some("calm")),
        ];

        let series = MoodSeries::new(&entries);
        let points: Vec<MoodPoint> = series.iter().collect();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].value, 4);
        assert_eq!(points[1].value, 2);
        assert!(points[0].timestamp < points[1].timestamp);
    }

    #[test]
    fn test_series_label_format() {
        let entries = vec![entry_at("a", (2024, 1, 5, 14, 30), Some("happy"), None)];
        let series = MoodSeries::new(&entries);
        let point = series.iter().next().unwrap();
        assert_eq!(point.label, "Jan 5, 02:30 PM");
    }

    #[test]
    fn test_series_is_restartable() {
        let entries = vec![
            entry_at("a", (2024, 2, 1, 8, 0), Some("happy"), None),
            entry_at("b", (2024, 2, 2, 8, 0), Some("neutral"), None),
        ];
        let series = MoodSeries::new(&entries);
        let first: Vec<u8> = series.iter().map(|p| p.value).collect();
        let second: Vec<u8> = series.iter().map(|p| p.value).collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![5, 3]);
    }

    #[test]
    fn test_series_unknown_mood_is_neutral() {
        let entries = vec![entry_at("a", (2024, 2, 1, 8, 0), Some("elated"), None)];
        let series = MoodSeries::new(&entries);
        assert_eq!(series.iter().next().unwrap().value, 3);
    }

    #[test]
    fn test_series_average() {
        let entries = vec![
            entry_at("a", (2024, 2, 1, 8, 0), Some("happy"), None),
            entry_at("b", (2024, 2, 2, 8, 0), Some("anxious"), None),
        ];
        assert_eq!(MoodSeries::new(&entries).average(), Some(3.0));
        assert_eq!(MoodSeries::new(&[]).average(), None);
    }
}
