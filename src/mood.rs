//! The fixed set of moods and the numeric scale used for trends.

use crate::constants::NEUTRAL_SCALE_VALUE;
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A self-reported mood.
///
/// Parsing is case-insensitive; the wire and display form is lowercase.
///
/// ```
/// use moodtrail::Mood;
///
/// let mood: Mood = "Happy".parse().unwrap();
/// assert_eq!(mood, Mood::Happy);
/// assert_eq!(mood.to_string(), "happy");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Calm,
    Neutral,
    Sad,
    Anxious,
}

impl Mood {
    /// All moods, from the top of the scale down.
    pub const ALL: [Mood; 5] = [
        Mood::Happy,
        Mood::Calm,
        Mood::Neutral,
        Mood::Sad,
        Mood::Anxious,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Happy => "happy",
            Mood::Calm => "calm",
            Mood::Neutral => "neutral",
            Mood::Sad => "sad",
            Mood::Anxious => "anxious",
        }
    }

    /// Position on the 1..=5 trend scale.
    pub fn scale_value(&self) -> u8 {
        match self {
            Mood::Happy => 5,
            Mood::Calm => 4,
            Mood::Neutral => 3,
            Mood::Sad => 2,
            Mood::Anxious => 1,
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "happy" => Ok(Mood::Happy),
            "calm" => Ok(Mood::Calm),
            "neutral" => Ok(Mood::Neutral),
            "sad" => Ok(Mood::Sad),
            "anxious" => Ok(Mood::Anxious),
            other => Err(AppError::Input(format!(
                "unknown mood '{}' (expected one of: happy, calm, neutral, sad, anxious)",
                other
            ))),
        }
    }
}

/// Maps a raw mood value to the trend scale.
///
/// Total over its input: anything unrecognized, and a missing value, map to
/// the neutral midpoint.
///
/// ```
/// use moodtrail::mood::scale;
///
/// assert_eq!(scale(Some("Happy")), 5);
/// assert_eq!(scale(Some("unknown")), 3);
/// assert_eq!(scale(None), 3);
/// ```
pub fn scale(mood: Option<&str>) -> u8 {
    mood.and_then(|m| m.parse::<Mood>().ok())
        .map(|m| m.scale_value())
        .unwrap_or(NEUTRAL_SCALE_VALUE)
}

/// Axis label for a scale value, `None` outside 1..=5.
pub fn scale_label(value: u8) -> Option<&'static str> {
    match value {
        5 => Some("Happy"),
        4 => Some("Calm"),
        3 => Some("Neutral"),
        2 => Some("Sad"),
        1 => Some("Anxious"),
        _ => None,
    }
}
