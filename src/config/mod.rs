//! Configuration management for the moodtrail application.
//!
//! This module handles loading and validating configuration settings from environment
//! variables, with sensible defaults. Command-line flags override what is loaded here.
//!
//! # Environment Variables
//!
//! - `MOODTRAIL_DB`: Path to the entry database (defaults to ~/.local/share/moodtrail/moodtrail.db)
//! - `MOODTRAIL_USER`: Owner id entries are written under
//! - `USER`: Fallback owner id if MOODTRAIL_USER is not set (defaults to "local")
//! - `MOODTRAIL_AUTOSAVE_MS`: Autosave debounce interval in milliseconds (defaults to 3000)

use crate::constants::{
    DEFAULT_AUTOSAVE_DELAY_MS, DEFAULT_DB_PATH, DEFAULT_OWNER_ID, ENV_VAR_MOODTRAIL_AUTOSAVE_MS,
    ENV_VAR_MOODTRAIL_DB, ENV_VAR_MOODTRAIL_USER, ENV_VAR_USER, REDACTED_PLACEHOLDER,
};
use crate::errors::{AppError, AppResult};
use crate::model::OwnerId;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the moodtrail application.
///
/// # Examples
///
/// Creating a configuration manually:
/// ```
/// use moodtrail::Config;
/// use std::path::PathBuf;
/// use std::time::Duration;
///
/// let config = Config {
///     db_path: PathBuf::from("/path/to/moodtrail.db"),
///     owner: "alice".to_string(),
///     autosave_delay: Duration::from_millis(3000),
/// };
/// assert!(config.validate().is_ok());
/// ```
///
/// Loading configuration from environment variables:
/// ```no_run
/// use moodtrail::Config;
/// use std::env;
///
/// env::set_var("MOODTRAIL_USER", "alice");
///
/// let config = Config::load().expect("Failed to load configuration");
/// assert_eq!(config.owner, "alice");
/// ```
#[derive(Clone, PartialEq)]
pub struct Config {
    /// SQLite database holding the entries.
    pub db_path: PathBuf,

    /// Identifier of the user entries belong to.
    ///
    /// Loaded in order of precedence from MOODTRAIL_USER, USER, then "local".
    pub owner: String,

    /// Quiet period after the last edit before a draft is written.
    pub autosave_delay: Duration,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("db_path", &REDACTED_PLACEHOLDER)
            .field("owner", &REDACTED_PLACEHOLDER)
            .field("autosave_delay", &self.autosave_delay)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from(""),
            owner: DEFAULT_OWNER_ID.to_string(),
            autosave_delay: Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
        }
    }
}

impl Config {
    /// Loads configuration from environment variables with sensible defaults.
    ///
    /// The database path is expanded with `shellexpand`, so `~` and
    /// environment variable references work.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if:
    /// - The database path expansion fails
    /// - MOODTRAIL_AUTOSAVE_MS is not a positive integer
    /// - The resulting configuration fails [`Config::validate`]
    pub fn load() -> AppResult<Self> {
        let db_raw =
            env::var(ENV_VAR_MOODTRAIL_DB).unwrap_or_else(|_| DEFAULT_DB_PATH.to_string());
        let db_path = expand_path(&db_raw)?;

        let owner = env::var(ENV_VAR_MOODTRAIL_USER)
            .or_else(|_| env::var(ENV_VAR_USER))
            .unwrap_or_else(|_| DEFAULT_OWNER_ID.to_string());

        let autosave_delay = match env::var(ENV_VAR_MOODTRAIL_AUTOSAVE_MS) {
            Ok(raw) => parse_delay(&raw)?,
            Err(_) => Duration::from_millis(DEFAULT_AUTOSAVE_DELAY_MS),
        };

        let config = Config {
            db_path,
            owner,
            autosave_delay,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validates that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` with one of the following messages:
    /// - "Database path is empty"
    /// - "Owner id is empty"
    /// - "Autosave delay must be greater than zero"
    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::Config("Database path is empty".to_string()));
        }

        if self.owner.trim().is_empty() {
            return Err(AppError::Config("Owner id is empty".to_string()));
        }

        if self.autosave_delay.is_zero() {
            return Err(AppError::Config(
                "Autosave delay must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn owner_id(&self) -> OwnerId {
        OwnerId::new(self.owner.trim())
    }
}

/// Expands `~` and environment variable references in a path.
pub fn expand_path(raw: &str) -> AppResult<PathBuf> {
    let expanded = shellexpand::full(raw)
        .map_err(|e| AppError::Config(format!("Failed to expand path: {}", e)))?;
    Ok(PathBuf::from(expanded.into_owned()))
}

fn parse_delay(raw: &str) -> AppResult<Duration> {
    let millis: u64 = raw.trim().parse().map_err(|_| {
        AppError::Config(format!(
            "{} must be a whole number of milliseconds, got '{}'",
            ENV_VAR_MOODTRAIL_AUTOSAVE_MS, raw
        ))
    })?;
    if millis == 0 {
        return Err(AppError::Config(
            "Autosave delay must be greater than zero".to_string(),
        ));
    }
    Ok(Duration::from_millis(millis))
}
