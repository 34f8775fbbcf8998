/*!
# moodtrail - A Mood Journal

moodtrail records short journal entries tagged with how you felt before
writing and, optionally, how you felt after. Entries are saved automatically
while you write, and past entries can be reviewed as a table, a mood trend or
a calendar of days.

This file contains the main application flow: it sets up logging, resolves
configuration, picks the entry store and dispatches to the chosen command.

## Usage

```
moodtrail [OPTIONS] <COMMAND>

Commands:
  write     Check in: pick a mood, write from stdin, optionally record how you feel after
  history   List past entries with their outcome mood
  trend     Show the mood trend over time
  calendar  Show one representative mood per day

Options:
      --log-format <LOG_FORMAT>  Log output format [default: text] [possible values: text, json]
  -v, --verbose                  Enable debug logging
      --db <PATH>                Entry database path (overrides MOODTRAIL_DB)
      --user <ID>                Owner id entries are written under (overrides MOODTRAIL_USER)
      --ephemeral                Keep entries in memory for this run only
  -h, --help                     Print help
  -V, --version                  Print version
```

## Configuration

The application can be configured with the following environment variables:
- `MOODTRAIL_DB`: The entry database (defaults to "~/.local/share/moodtrail/moodtrail.db")
- `MOODTRAIL_USER` or `USER`: The owner id entries are written under
- `MOODTRAIL_AUTOSAVE_MS`: Autosave debounce interval in milliseconds (defaults to 3000)
- `RUST_LOG`: Log filter (defaults to "info"; `--verbose` forces "debug")

Logs go to stderr; command output goes to stdout.
*/

use chrono::{Datelike, Local};
use moodtrail::autosave::SaveStatus;
use moodtrail::cli::{CliArgs, Command};
use moodtrail::config::Config;
use moodtrail::constants::{
    DEFAULT_LOG_LEVEL, HISTORY_TIME_FORMAT, MOOD_AFTER_REVEAL_THRESHOLD, TRACING_ROOT_SPAN_NAME,
    TRACING_SERVICE_NAME,
};
use moodtrail::db::Database;
use moodtrail::errors::{AppError, AppResult, StoreError};
use moodtrail::feed::{EntryFeed, FeedStatus};
use moodtrail::guidance;
use moodtrail::insights::{history_rows, CalendarIndex, HistorySort, MoodSeries};
use moodtrail::journal::CheckIn;
use moodtrail::lifecycle::Phase;
use moodtrail::model::JournalEntry;
use moodtrail::mood::{scale_label, Mood};
use moodtrail::store::{EntryStore, MemoryStore, SqliteStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info, info_span, warn, Instrument};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Width of the content column in history output.
const CONTENT_PREVIEW_CHARS: usize = 40;

/// The main entry point for the moodtrail application.
///
/// This function coordinates the overall application flow:
/// 1. Parses command-line arguments
/// 2. Initializes tracing
/// 3. Loads configuration and applies command-line overrides
/// 4. Opens the entry store
/// 5. Runs the chosen command on a tokio runtime
///
/// # Errors
///
/// This function can return various types of errors, including:
/// - Configuration errors (missing or invalid configuration)
/// - Database errors (unreadable or corrupt database file)
/// - Store errors (the entry feed could not be established)
/// - Persistence errors (the final autosave of a check-in failed)
fn main() -> AppResult<()> {
    let args = CliArgs::parse();
    init_tracing(&args)?;

    let invocation_id = Uuid::new_v4();
    let root_span = info_span!(
        TRACING_ROOT_SPAN_NAME,
        service_name = TRACING_SERVICE_NAME,
        correlation_id = %invocation_id,
    );

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run(args).instrument(root_span))
}

fn init_tracing(args: &CliArgs) -> AppResult<()> {
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
    };

    let registry = tracing_subscriber::registry().with(filter);
    let result = if args.json_logs() {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()
    };
    result.map_err(|e| AppError::Config(format!("Failed to initialize logging: {}", e)))
}

async fn run(args: CliArgs) -> AppResult<()> {
    info!("Starting moodtrail");
    debug!("CLI arguments: {:?}", args);

    let mut config = Config::load()?;
    if let Some(db) = &args.db {
        config.db_path = db.clone();
    }
    if let Some(user) = &args.user {
        config.owner = user.clone();
    }
    config.validate()?;
    debug!("Configuration: {:?}", config);

    let store = open_store(&config, args.ephemeral)?;

    match args.command.clone() {
        Command::Write { mood, after } => write(store, &config, mood, after).await,
        Command::History {
            date, sort, json, ..
        } => {
            let entries = load_entries(store, &config).await?;
            let sort = HistorySort::new(sort, args.command.sort_direction());
            print_history(&entries, date, sort, json)
        }
        Command::Trend { json } => {
            let entries = load_entries(store, &config).await?;
            print_trend(&entries, json)
        }
        Command::Calendar { month } => {
            let entries = load_entries(store, &config).await?;
            print_calendar(&entries, month.map(|m| (m.year(), m.month())));
            Ok(())
        }
    }
}

fn open_store(config: &Config, ephemeral: bool) -> AppResult<Arc<dyn EntryStore>> {
    if ephemeral {
        info!("Using in-memory entry store");
        return Ok(Arc::new(MemoryStore::new()));
    }
    let db = Database::open(&config.db_path)?;
    Ok(Arc::new(SqliteStore::new(db)?))
}

async fn write(
    store: Arc<dyn EntryStore>,
    config: &Config,
    mood: Mood,
    after: Option<Mood>,
) -> AppResult<()> {
    println!("{}", guidance::greeting_for(Local::now().date_naive()));

    let mut check_in = CheckIn::new(store, config.owner_id(), config.autosave_delay);
    check_in.select_mood_before(mood);
    if let Some(text) = check_in.guidance() {
        println!("\n{}\n", text);
    }
    eprintln!("Write your entry, then press Ctrl-D to finish.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut content = String::new();
    while let Some(line) = lines.next_line().await? {
        if !content.is_empty() {
            content.push('\n');
        }
        content.push_str(&line);

        if check_in.edit_content(&content)?.is_some() {
            debug!("Mood-after selector revealed");
        }
        let wants_after = check_in
            .session()
            .is_some_and(|session| session.mood_after().is_none());
        if let (Some(after), Phase::Revealed, true) = (after, check_in.phase(), wants_after) {
            check_in.select_mood_after(after)?;
        }
    }

    if after.is_some() && check_in.phase() != Phase::Revealed {
        warn!(
            threshold = MOOD_AFTER_REVEAL_THRESHOLD,
            "Entry too short to record a mood-after"
        );
        eprintln!(
            "Write more than {} characters to record how you feel afterwards.",
            MOOD_AFTER_REVEAL_THRESHOLD
        );
    }

    let state = check_in.settle().await;
    check_in.close();

    match state.status {
        SaveStatus::Saved { entry_id, at } => {
            println!("Saved entry {} at {}", entry_id, at.format(HISTORY_TIME_FORMAT));
            Ok(())
        }
        SaveStatus::NotSaved(e) => Err(e.into()),
        _ => {
            println!("Nothing written, no entry saved.");
            Ok(())
        }
    }
}

/// Opens the owner's feed and returns its first snapshot.
async fn load_entries(
    store: Arc<dyn EntryStore>,
    config: &Config,
) -> AppResult<Arc<Vec<JournalEntry>>> {
    let feed = EntryFeed::subscribe(store, config.owner_id());
    let state = feed
        .wait_for(|s| matches!(s.status, FeedStatus::Live | FeedStatus::Stale(_)))
        .await;
    feed.cancel();

    if let FeedStatus::Stale(e) = &state.status {
        if state.revision == 0 {
            return Err(StoreError::Unavailable(e.to_string()).into());
        }
        warn!(error = %e, "Showing entries from a stale feed");
    }
    debug!(count = state.entries.len(), "Loaded entries");
    Ok(state.entries)
}

fn print_history(
    entries: &[JournalEntry],
    date: Option<chrono::NaiveDate>,
    sort: HistorySort,
    json: bool,
) -> AppResult<()> {
    let rows: Vec<_> = history_rows(entries, sort)
        .into_iter()
        .filter(|row| date.map_or(true, |d| row.created_at.date_naive() == d))
        .collect();

    if json {
        let values: Vec<serde_json::Value> = rows
            .iter()
            .map(|row| {
                serde_json::json!({
                    "id": row.entry.id,
                    "created_at": row.created_at.to_rfc3339(),
                    "mood_before": row.entry.mood_before,
                    "outcome": row.outcome,
                    "content": row.entry.content,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&values)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    println!("{:<16}  {:<8}  {:<8}  Entry", "Created", "Before", "After");
    for row in &rows {
        println!(
            "{:<16}  {:<8}  {:<8}  {}",
            row.created_at.format(HISTORY_TIME_FORMAT),
            row.entry.mood_before.as_deref().unwrap_or("-"),
            row.outcome.unwrap_or("-"),
            preview(&row.entry.content),
        );
    }
    Ok(())
}

fn print_trend(entries: &[JournalEntry], json: bool) -> AppResult<()> {
    let series = MoodSeries::new(entries);

    if json {
        let points: Vec<_> = series.iter().collect();
        println!("{}", serde_json::to_string_pretty(&points)?);
        return Ok(());
    }

    if series.is_empty() {
        println!("No entries found.");
        return Ok(());
    }

    for point in series.iter() {
        println!(
            "{:<16}  {:<5}  {}",
            point.label,
            "#".repeat(usize::from(point.value)),
            scale_label(point.value).unwrap_or("?"),
        );
    }
    if let Some(average) = series.average() {
        println!("\nAverage: {:.1} over {} entries", average, series.len());
    }
    Ok(())
}

fn print_calendar(entries: &[JournalEntry], month: Option<(i32, u32)>) {
    let index = CalendarIndex::new(entries);
    let days: Vec<_> = match month {
        Some((year, month)) => index.month(year, month).collect(),
        None => index.days().collect(),
    };

    if days.is_empty() {
        println!("No entries found.");
        return;
    }

    for day in days {
        let count = day.len();
        println!(
            "{}  {:<8}  {} {}",
            day.date,
            day.representative_mood().unwrap_or("-"),
            count,
            if count == 1 { "entry" } else { "entries" },
        );
    }
}

fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or("");
    if line.chars().count() > CONTENT_PREVIEW_CHARS || content.lines().nth(1).is_some() {
        let cut: String = line.chars().take(CONTENT_PREVIEW_CHARS).collect();
        format!("{}...", cut.trim_end())
    } else {
        line.to_string()
    }
}
