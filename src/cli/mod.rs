//! Command-line interface for moodtrail.
//!
//! Global flags select logging and the entry store; each subcommand drives
//! one part of the library end to end.

use crate::constants::{
    APP_DESCRIPTION, APP_NAME, DATE_FORMAT_ISO, LOG_FORMAT_JSON, LOG_FORMAT_TEXT,
};
use crate::insights::{SortDirection, SortField};
use crate::mood::Mood;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// A mood journal that tracks how writing changes how you feel
#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = APP_DESCRIPTION)]
#[command(author, version, long_about = None)]
pub struct CliArgs {
    /// Log output format
    #[arg(long, default_value = LOG_FORMAT_TEXT, value_parser = [LOG_FORMAT_TEXT, LOG_FORMAT_JSON])]
    pub log_format: String,

    /// Enable debug logging
    #[arg(short = 'v', long)]
    pub verbose: bool,

    /// Entry database path (overrides MOODTRAIL_DB)
    #[arg(long, value_name = "PATH", conflicts_with = "ephemeral")]
    pub db: Option<PathBuf>,

    /// Owner id entries are written under (overrides MOODTRAIL_USER)
    #[arg(long, value_name = "ID")]
    pub user: Option<String>,

    /// Keep entries in memory for this run only
    #[arg(long)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Check in: pick a mood, write from stdin, optionally record how you feel after
    Write {
        /// How you feel before writing
        #[arg(short, long, value_parser = parse_mood)]
        mood: Mood,

        /// How you feel after writing (applied once enough has been written)
        #[arg(short, long, value_parser = parse_mood)]
        after: Option<Mood>,
    },

    /// List past entries with their outcome mood
    History {
        /// Only show entries from this day (YYYY-MM-DD)
        #[arg(short, long, value_parser = parse_date)]
        date: Option<NaiveDate>,

        /// Column to sort by: created, before, after or content
        #[arg(short, long, default_value = "created", value_parser = parse_sort_field)]
        sort: SortField,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the mood trend over time
    Trend {
        /// Print points as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one representative mood per day
    Calendar {
        /// Month to show (YYYY-MM); defaults to every recorded day
        #[arg(short, long, value_parser = parse_month)]
        month: Option<NaiveDate>,
    },
}

impl Command {
    /// Sort direction for `history`; other commands sort newest first.
    pub fn sort_direction(&self) -> SortDirection {
        match self {
            Command::History { asc: true, .. } => SortDirection::Ascending,
            _ => SortDirection::Descending,
        }
    }
}

impl CliArgs {
    /// Parse command-line arguments
    pub fn parse() -> Self {
        <CliArgs as Parser>::parse()
    }

    pub fn json_logs(&self) -> bool {
        self.log_format == LOG_FORMAT_JSON
    }
}

fn parse_mood(raw: &str) -> Result<Mood, String> {
    raw.parse::<Mood>().map_err(|e| e.to_string())
}

fn parse_sort_field(raw: &str) -> Result<SortField, String> {
    raw.parse::<SortField>().map_err(|e| e.to_string())
}

fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT_ISO)
        .map_err(|e| format!("expected YYYY-MM-DD, got '{}': {}", raw, e))
}

/// Parses `YYYY-MM` into the first day of that month.
fn parse_month(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(&format!("{}-01", raw.trim()), DATE_FORMAT_ISO)
        .map_err(|_| format!("expected YYYY-MM, got '{}'", raw))
}
