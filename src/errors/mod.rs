//! Error handling utilities for the moodtrail application.
//!
//! This module provides the central error type `AppError` which represents all
//! possible error conditions that might occur in the application, the
//! convenience type alias `AppResult`, and the domain errors that the autosave
//! engine and the entry feed turn into status values instead of propagating.

use crate::model::EntryId;
use std::fmt;
use thiserror::Error;

/// Represents specific error cases that can occur during database operations.
///
/// # Examples
///
/// ```
/// use moodtrail::errors::DatabaseError;
///
/// let error = DatabaseError::Custom("schema mismatch".to_string());
/// assert!(format!("{}", error).contains("schema mismatch"));
/// ```
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// SQLite database error.
    #[error("Database error: {0}\n\nIf you're seeing 'file is not a database', the file at MOODTRAIL_DB may be corrupted or belong to another program.")]
    Sqlite(#[from] rusqlite::Error),

    /// Connection pool error.
    #[error("Failed to get connection from pool: {0}\n\nThis may indicate database connection issues. Try closing other moodtrail instances.")]
    Pool(#[from] r2d2::Error),

    /// Custom database error with detailed message.
    #[error("Database error: {0}")]
    Custom(String),
}

/// Errors reported by an entry store adapter.
///
/// # Examples
///
/// ```
/// use moodtrail::errors::StoreError;
/// use moodtrail::model::EntryId;
///
/// let error = StoreError::NotFound(EntryId::from("abc"));
/// assert_eq!(format!("{}", error), "Entry not found: abc");
/// ```
#[derive(Debug, Error)]
pub enum StoreError {
    /// The entry addressed by an update does not exist.
    #[error("Entry not found: {0}")]
    NotFound(EntryId),

    /// The store could not be reached or refused the call.
    #[error("Entry store unavailable: {0}")]
    Unavailable(String),

    /// The backing database failed.
    #[error("Entry store database failure: {0}")]
    Database(#[from] DatabaseError),

    /// A blocking store task panicked or was cancelled.
    #[error("Entry store task failed: {0}")]
    Task(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(DatabaseError::Sqlite(e))
    }
}

impl From<r2d2::Error> for StoreError {
    fn from(e: r2d2::Error) -> Self {
        StoreError::Database(DatabaseError::Pool(e))
    }
}

/// Reasons a draft change does not qualify for autosave.
///
/// These are never shown to the user; autosave simply does not trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No mood-before has been chosen for the draft.
    #[error("no mood-before selected")]
    MissingMoodBefore,

    /// The draft has no content yet.
    #[error("content is empty")]
    EmptyContent,
}

/// The kind of store write the autosave engine issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOperation {
    Create,
    Update,
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WriteOperation::Create => write!(f, "create"),
            WriteOperation::Update => write!(f, "update"),
        }
    }
}

/// A failed autosave write, carried in the published save status.
///
/// The draft stays dirty after such a failure. Nothing retries on its own; the
/// next qualifying edit starts a fresh debounce cycle.
///
/// # Examples
///
/// ```
/// use moodtrail::errors::{PersistenceError, WriteOperation};
///
/// let error = PersistenceError::new(WriteOperation::Create, "connection reset");
/// assert_eq!(format!("{}", error), "Entry not saved (create failed): connection reset");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Entry not saved ({operation} failed): {message}")]
pub struct PersistenceError {
    /// Which write failed
    pub operation: WriteOperation,
    /// Rendered cause
    pub message: String,
}

impl PersistenceError {
    pub fn new(operation: WriteOperation, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

/// Failures of the live entry feed.
///
/// A feed carrying one of these is stale: the last good snapshot is kept but
/// no longer tracks the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubscriptionError {
    /// The subscription could not be established.
    #[error("Could not subscribe to entries: {0}")]
    Establish(String),

    /// The store reported an error after the subscription was live.
    #[error("Entry feed interrupted: {0}")]
    Interrupted(String),

    /// The store ended the subscription.
    #[error("Entry feed closed by the store")]
    Closed,
}

/// Misuse of the check-in workflow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifecycleError {
    /// Content and mood-after are only editable once a mood-before is chosen.
    #[error("Choose how you are feeling before writing")]
    NoMoodBefore,
}

/// Represents all possible errors that can occur in the moodtrail application.
///
/// # Examples
///
/// Creating a configuration error:
/// ```
/// use moodtrail::errors::AppError;
///
/// let error = AppError::Config("Owner id is empty".to_string());
/// assert_eq!(format!("{}", error), "Configuration error: Owner id is empty");
/// ```
///
/// Converting from an IO error:
/// ```
/// use moodtrail::errors::AppError;
/// use std::io::{self, ErrorKind};
///
/// let io_error = io::Error::new(ErrorKind::NotFound, "file not found");
/// let app_error: AppError = io_error.into();
///
/// match app_error {
///     AppError::Io(inner) => assert_eq!(inner.kind(), ErrorKind::NotFound),
///     _ => panic!("Expected Io variant"),
/// }
/// ```
#[derive(Debug, Error)]
pub enum AppError {
    /// Errors related to configuration loading or validation.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input/output errors from filesystem or terminal operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors related to database operations.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Errors reported by the entry store.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Check-in workflow misuse.
    #[error("Check-in error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// Invalid user input such as an unknown mood or malformed date.
    #[error("Invalid input: {0}")]
    Input(String),

    /// The final autosave of a check-in failed.
    #[error("{0}")]
    Persistence(#[from] PersistenceError),

    /// Command output could not be rendered as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A type alias for `Result<T, AppError>` to simplify function signatures.
///
/// # Examples
///
/// ```
/// use moodtrail::errors::{AppResult, AppError};
///
/// fn might_fail() -> AppResult<String> {
///     if false {
///         return Err(AppError::Input("unknown mood".to_string()));
///     }
///     Ok("Operation succeeded".to_string())
/// }
/// ```
pub type AppResult<T> = Result<T, AppError>;
