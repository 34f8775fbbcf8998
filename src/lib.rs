/*!
# moodtrail

moodtrail is a mood journal. Each check-in starts with how you feel, lets you
write (or dictate) an entry, and once you have written enough asks how you
feel afterwards. Drafts are saved automatically while you write, and past
entries are aggregated into a mood trend, a calendar of days and a history
table showing where each session actually ended up.

## Core Features

- Debounced autosave: one write per quiet period, never two writes in flight
- A mood lifecycle that reveals the mood-after selector past a content threshold
- A live, owner-scoped entry feed that replaces its snapshot on every push
- Mood aggregation: trend series, calendar index and outcome moods
- Pluggable entry stores: SQLite on disk, or in memory

## Architecture

- `lifecycle`: Pure check-in state machine (idle, active, revealed)
- `autosave`: Debounced persistence engine running as a tokio task
- `feed`: Live subscription to an owner's entries
- `insights`: Derived views over a feed snapshot
- `store`: The entry store boundary and its adapters
- `db`: SQLite schema and queries behind the on-disk store
- `journal`: Ties lifecycle, autosave and feed into a signed-in session
- `cli` and `config`: Command-line and environment configuration

## Usage Example

```rust,no_run
use moodtrail::journal::CheckIn;
use moodtrail::store::MemoryStore;
use moodtrail::{Config, Mood};
use std::sync::Arc;

#[tokio::main]
async fn main() -> moodtrail::AppResult<()> {
    let config = Config::load()?;
    let store = Arc::new(MemoryStore::new());

    let mut check_in = CheckIn::new(store, config.owner_id(), config.autosave_delay);
    check_in.select_mood_before(Mood::Anxious);
    check_in.edit_content("Big presentation today.")?;

    let state = check_in.settle().await;
    println!("{:?}", state.status);
    Ok(())
}
```
*/

/// Debounced persistence of the current draft
pub mod autosave;
/// Optional speech-to-text input
pub mod capture;
/// Command-line interface for parsing and handling user arguments
pub mod cli;
/// Configuration loading and management
pub mod config;
/// Application-wide constants
pub mod constants;
/// SQLite persistence for entries
pub mod db;
/// Error types and utilities for error handling
pub mod errors;
/// Live view of an owner's entries
pub mod feed;
/// Greeting and breathing guidance
pub mod guidance;
/// Mood trend, calendar and outcome views
pub mod insights;
/// Check-ins and signed-in sessions
pub mod journal;
/// The check-in state machine
pub mod lifecycle;
/// Entry records and identifiers
pub mod model;
/// Moods and the trend scale
pub mod mood;
/// The entry store boundary and its adapters
pub mod store;

// Re-export important types for convenience
pub use cli::CliArgs;
pub use config::Config;
pub use errors::{AppError, AppResult};
pub use mood::Mood;
