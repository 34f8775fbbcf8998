//! Entry insert, update and query operations.

use crate::db::DbResult;
use crate::model::{EntryId, EntryPatch, NewEntry, OwnerId, StoreTimestamp, StoredEntry};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

const SELECT_COLUMNS: &str = r#"
    SELECT id, owner_id, content, mood_before, mood_after,
           created_seconds, created_nanos, updated_seconds, updated_nanos
    FROM entries
"#;

/// Inserts a new entry under `id`.
///
/// # Errors
///
/// Returns an error if the database operation fails, including a duplicate id.
pub fn insert_entry(conn: &Connection, id: &EntryId, entry: &NewEntry) -> DbResult<()> {
    debug!("Inserting entry {} for owner {}", id, entry.owner_id);

    conn.execute(
        r#"
        INSERT INTO entries (
            id, owner_id, content, mood_before, mood_after,
            created_seconds, created_nanos, updated_seconds, updated_nanos
        )
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
        params![
            id.as_str(),
            entry.owner_id.as_str(),
            entry.content,
            entry.mood_before.as_str(),
            entry.mood_after.map(|m| m.as_str()),
            entry.created_at.seconds,
            entry.created_at.nanos,
            entry.updated_at.seconds,
            entry.updated_at.nanos,
        ],
    )?;

    Ok(())
}

/// Applies `patch` to the entry `id`.
///
/// A patch without a mood-after leaves the stored one untouched. Returns
/// `false` when no entry has that id.
pub fn update_entry(conn: &Connection, id: &EntryId, patch: &EntryPatch) -> DbResult<bool> {
    debug!("Updating entry {}", id);

    let changed = conn.execute(
        r#"
        UPDATE entries SET
            content = ?2,
            mood_before = ?3,
            mood_after = COALESCE(?4, mood_after),
            updated_seconds = ?5,
            updated_nanos = ?6
        WHERE id = ?1
        "#,
        params![
            id.as_str(),
            patch.content,
            patch.mood_before.as_str(),
            patch.mood_after.map(|m| m.as_str()),
            patch.updated_at.seconds,
            patch.updated_at.nanos,
        ],
    )?;

    Ok(changed > 0)
}

/// Retrieves one entry by id.
pub fn get_entry(conn: &Connection, id: &EntryId) -> DbResult<Option<StoredEntry>> {
    let sql = format!("{} WHERE id = ?1", SELECT_COLUMNS);
    let entry = conn
        .query_row(&sql, params![id.as_str()], row_to_entry)
        .optional()?;
    Ok(entry)
}

/// Lists an owner's entries, newest first.
///
/// Entries without a creation time sort last.
pub fn list_entries_for_owner(conn: &Connection, owner: &OwnerId) -> DbResult<Vec<StoredEntry>> {
    debug!("Listing entries for owner {}", owner);

    let sql = format!(
        "{} WHERE owner_id = ?1 \
         ORDER BY created_seconds IS NULL, created_seconds DESC, created_nanos DESC",
        SELECT_COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let entries = stmt
        .query_map(params![owner.as_str()], row_to_entry)?
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Found {} entries for owner {}", entries.len(), owner);
    Ok(entries)
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<StoredEntry> {
    Ok(StoredEntry {
        id: EntryId::new(row.get::<_, String>(0)?),
        owner_id: OwnerId::new(row.get::<_, String>(1)?),
        content: row.get(2)?,
        mood_before: row.get(3)?,
        mood_after: row.get(4)?,
        created_at: timestamp(row.get(5)?, row.get(6)?),
        updated_at: timestamp(row.get(7)?, row.get(8)?),
    })
}

fn timestamp(seconds: Option<i64>, nanos: Option<u32>) -> Option<StoreTimestamp> {
    seconds.map(|seconds| StoreTimestamp {
        seconds,
        nanos: nanos.unwrap_or(0),
    })
}
