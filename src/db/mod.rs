//! SQLite persistence for journal entries.
//!
//! This module provides the on-disk backing for [`crate::store::SqliteStore`].
//! It uses connection pooling via r2d2 so blocking store calls can run on
//! several worker threads at once.
//!
//! # Module Structure
//!
//! - `schema`: Table definitions and schema initialization
//! - `entries`: Entry insert, update and owner-scoped queries
//!
//! # Example
//!
//! ```no_run
//! use moodtrail::db::Database;
//! use std::path::Path;
//!
//! let db = Database::open(Path::new("/tmp/moodtrail.db"))?;
//! db.initialize_schema()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod entries;
pub mod schema;

use crate::errors::DatabaseError;
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Type alias for a pooled SQLite connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Result of a database call.
pub type DbResult<T> = Result<T, DatabaseError>;

/// Database handle with connection pooling.
#[derive(Clone)]
pub struct Database {
    pool: Pool<SqliteConnectionManager>,
}

impl Database {
    /// Opens or creates the SQLite database at `db_path`.
    ///
    /// Missing parent directories are created.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The parent directory cannot be created
    /// - The file is not a SQLite database
    /// - The connection pool cannot be initialized
    pub fn open(db_path: &Path) -> DbResult<Self> {
        debug!("Opening database at: {:?}", db_path);

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    DatabaseError::Custom(format!(
                        "Failed to create database directory {:?}: {}",
                        parent, e
                    ))
                })?;
            }
        }

        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder()
            .max_size(5)
            .connection_customizer(Box::new(ConnectionPragmas))
            .build(manager)?;

        // Fail early on files that are not SQLite databases
        let conn = pool.get()?;
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })?;
        drop(conn);

        info!("Database opened successfully");
        Ok(Database { pool })
    }

    /// Gets a connection from the pool.
    ///
    /// # Errors
    ///
    /// Returns an error if no connection is available or the pool is exhausted.
    pub fn get_conn(&self) -> DbResult<PooledConnection> {
        Ok(self.pool.get()?)
    }

    /// Creates the tables and indexes if they don't exist.
    ///
    /// Idempotent.
    pub fn initialize_schema(&self) -> DbResult<()> {
        let conn = self.get_conn()?;
        schema::create_tables(&conn)?;
        info!("Database schema initialized");
        Ok(())
    }
}

/// Applies per-connection pragmas when the pool hands out a connection.
#[derive(Debug)]
struct ConnectionPragmas;

impl r2d2::CustomizeConnection<Connection, rusqlite::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut Connection) -> Result<(), rusqlite::Error> {
        // Concurrent writers from the autosave engine wait instead of failing
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(())
    }

    fn on_release(&self, _conn: Connection) {}
}
