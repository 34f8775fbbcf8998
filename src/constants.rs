//! Constants used throughout the application.
//!
//! This module contains all constants used in moodtrail, organized into
//! logical groups. Having constants centralized makes them easier to find,
//! modify, and reference consistently.

// Application Metadata
/// The name of the application.
pub const APP_NAME: &str = "moodtrail";
/// The description of the application used in CLI help text.
pub const APP_DESCRIPTION: &str = "A mood journal that tracks how writing changes how you feel";

// CLI Arguments & Defaults
/// Log format identifier for plain text.
pub const LOG_FORMAT_TEXT: &str = "text";
/// Log format identifier for JSON.
pub const LOG_FORMAT_JSON: &str = "json";
/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

// Configuration Keys & Environment Variables
/// Environment variable for the entry database path.
pub const ENV_VAR_MOODTRAIL_DB: &str = "MOODTRAIL_DB";
/// Environment variable for the journal owner identifier.
pub const ENV_VAR_MOODTRAIL_USER: &str = "MOODTRAIL_USER";
/// Environment variable for the autosave debounce interval in milliseconds.
pub const ENV_VAR_MOODTRAIL_AUTOSAVE_MS: &str = "MOODTRAIL_AUTOSAVE_MS";
/// Standard environment variable for the login name, used as owner fallback.
pub const ENV_VAR_USER: &str = "USER";
/// Default database location, expanded with `shellexpand`.
pub const DEFAULT_DB_PATH: &str = "~/.local/share/moodtrail/moodtrail.db";
/// Owner used when neither `MOODTRAIL_USER` nor `USER` is set.
pub const DEFAULT_OWNER_ID: &str = "local";
/// Placeholder string for redacted information in debug output.
pub const REDACTED_PLACEHOLDER: &str = "[REDACTED]";

// Check-in Workflow
/// Quiet period after the last edit before a draft is written.
pub const DEFAULT_AUTOSAVE_DELAY_MS: u64 = 3000;
/// Content length (in characters) past which the mood-after selector is revealed.
pub const MOOD_AFTER_REVEAL_THRESHOLD: usize = 50;

// Mood Scale
/// Scale value for an unrecognized or missing mood.
pub const NEUTRAL_SCALE_VALUE: u8 = 3;

// Date/Time Logic
/// Date format string for ISO date format (YYYY-MM-DD).
pub const DATE_FORMAT_ISO: &str = "%Y-%m-%d";
/// Label format for trend points, e.g. "Jan 5, 02:30 PM".
pub const SERIES_LABEL_FORMAT: &str = "%b %-d, %I:%M %p";
/// Timestamp format used in history tables.
pub const HISTORY_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

// Logging Configuration
/// Service name used in tracing spans and structured logs.
pub const TRACING_SERVICE_NAME: &str = "moodtrail";
/// Name for the root tracing span covering an application invocation.
pub const TRACING_ROOT_SPAN_NAME: &str = "app_invocation";
