//! Greeting and breathing guidance shown around a check-in.

use crate::mood::Mood;
use chrono::{Datelike, NaiveDate};

const GREETINGS: [&str; 8] = [
    "Welcome back! Ready to reflect on your day?",
    "Take a moment to pause and check in with yourself.",
    "Your journey of self-discovery continues here.",
    "A new day brings new opportunities for growth.",
    "Your mental well-being matters. How are you today?",
    "Time to focus on you. How's your day going?",
    "Welcome to your safe space for reflection.",
    "Let's take a mindful moment together.",
];

/// Greeting for `date`. The same day always gets the same greeting.
///
/// ```
/// use chrono::NaiveDate;
/// use moodtrail::guidance::greeting_for;
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
/// assert_eq!(greeting_for(day), greeting_for(day));
/// ```
pub fn greeting_for(date: NaiveDate) -> &'static str {
    let index = date.num_days_from_ce().rem_euclid(GREETINGS.len() as i32) as usize;
    GREETINGS[index]
}

/// Short guided breathing exercise for the mood a check-in started with.
pub fn meditation(mood: Mood) -> String {
    format!(
        "Take a moment to acknowledge your {} feelings. \
         Find a comfortable position and follow these steps:\n\
         \n\
         1. Take 3 deep breaths, inhaling for 4 counts and exhaling for 6 counts\n\
         2. Notice any tension in your body and consciously release it\n\
         3. Focus on the present moment, accepting your emotions without judgment\n\
         4. Remember that all feelings are temporary and valid\n\
         \n\
         Continue this practice for a few minutes, being gentle with yourself.",
        mood
    )
}
