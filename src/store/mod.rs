//! The entry store boundary.
//!
//! The autosave engine writes through [`EntryStore::create`] and
//! [`EntryStore::update`]; the entry feed reads through
//! [`EntryStore::subscribe`]. Two adapters ship with the crate:
//!
//! - [`MemoryStore`]: process-local, used for `--ephemeral` runs and tests
//! - [`SqliteStore`]: backed by [`crate::db::Database`]
//!
//! Every snapshot a subscription yields is the owner's complete entry list,
//! newest first. Consumers replace their view wholesale on each push.

pub mod memory;
pub mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use crate::errors::StoreError;
use crate::model::{EntryId, EntryPatch, NewEntry, OwnerId, StoredEntry};
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::cmp::Reverse;

/// A live sequence of full, owner-scoped snapshots.
pub type SnapshotStream = BoxStream<'static, Result<Vec<StoredEntry>, StoreError>>;

/// A remote-ish document store holding journal entries.
#[async_trait]
pub trait EntryStore: Send + Sync {
    /// Stores a new entry and returns the id the store assigned.
    async fn create(&self, entry: NewEntry) -> Result<EntryId, StoreError>;

    /// Overwrites content, mood-before and timestamp of an existing entry.
    ///
    /// The mood-after is only written when the patch carries one.
    async fn update(&self, id: &EntryId, patch: EntryPatch) -> Result<(), StoreError>;

    /// Opens a subscription to `owner`'s entries.
    ///
    /// The first item is the current snapshot; later items follow every
    /// change to the owner's entries.
    async fn subscribe(&self, owner: &OwnerId) -> Result<SnapshotStream, StoreError>;
}

/// Builds an owner's snapshot: owner filter, newest first, undated last.
pub(crate) fn owner_snapshot<'a>(
    entries: impl IntoIterator<Item = &'a StoredEntry>,
    owner: &OwnerId,
) -> Vec<StoredEntry> {
    let mut snapshot: Vec<StoredEntry> = entries
        .into_iter()
        .filter(|e| &e.owner_id == owner)
        .cloned()
        .collect();
    snapshot.sort_by_key(|e| (e.created_at.is_none(), Reverse(e.created_at)));
    snapshot
}
