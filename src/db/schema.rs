//! Database schema definitions and initialization.
//!
//! Every column past `id` and `owner_id` is nullable: rows written by other
//! clients may be incomplete and the aggregation layer skips them.

use crate::db::DbResult;
use crate::errors::DatabaseError;
use rusqlite::Connection;
use tracing::{debug, info};

/// Current schema version.
///
/// Increment this whenever schema changes are made to support future migrations.
pub const SCHEMA_VERSION: i32 = 1;

/// Creates all database tables and indexes.
///
/// Uses `CREATE TABLE IF NOT EXISTS`, so it is safe to call repeatedly.
///
/// # Tables
///
/// - `entries`: Journal entries, timestamps split into seconds and nanos
/// - `schema_version`: Applied schema versions
pub fn create_tables(conn: &Connection) -> DbResult<()> {
    debug!("Creating database tables");

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            owner_id TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            mood_before TEXT,
            mood_after TEXT,
            created_seconds INTEGER,
            created_nanos INTEGER,
            updated_seconds INTEGER,
            updated_nanos INTEGER
        );

        CREATE INDEX IF NOT EXISTS idx_entries_owner_created
            ON entries(owner_id, created_seconds DESC, created_nanos DESC);
        "#,
    )?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at DATETIME NOT NULL DEFAULT CURRENT_TIMESTAMP
        );
        "#,
    )?;

    let current_version = get_schema_version(conn)?;
    if current_version.is_none() {
        conn.execute(
            "INSERT INTO schema_version (version) VALUES (?)",
            [SCHEMA_VERSION],
        )?;
        info!("Initialized database schema version {}", SCHEMA_VERSION);
    } else {
        debug!("Schema version already recorded: {:?}", current_version);
    }

    debug!("Database tables created successfully");
    Ok(())
}

/// Gets the current schema version from the database.
///
/// Returns `None` if the schema_version table doesn't exist or is empty.
pub fn get_schema_version(conn: &Connection) -> DbResult<Option<i32>> {
    let result = conn.query_row(
        "SELECT version FROM schema_version ORDER BY applied_at DESC LIMIT 1",
        [],
        |row| row.get(0),
    );

    match result {
        Ok(version) => Ok(Some(version)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) if e.to_string().contains("no such table") => Ok(None),
        Err(e) => Err(DatabaseError::Sqlite(e)),
    }
}
