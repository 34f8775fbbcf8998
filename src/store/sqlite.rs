//! Entry store backed by the local SQLite database.
//!
//! Blocking database calls run on tokio's blocking pool. Subscriptions see
//! writes made through the same `SqliteStore` (or its clones); writes by
//! other processes show up on the next local change.

use super::{EntryStore, SnapshotStream};
use crate::db::{entries, Database};
use crate::errors::StoreError;
use crate::model::{EntryId, EntryPatch, NewEntry, OwnerId, StoredEntry};
use async_trait::async_trait;
use futures::StreamExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;
use uuid::Uuid;

#[derive(Clone)]
pub struct SqliteStore {
    db: Database,
    changes: Arc<watch::Sender<u64>>,
}

impl SqliteStore {
    /// Wraps an opened database, initializing its schema.
    pub fn new(db: Database) -> Result<Self, StoreError> {
        db.initialize_schema()?;
        let (changes, _) = watch::channel(0);
        Ok(Self {
            db,
            changes: Arc::new(changes),
        })
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

fn join_error(e: task::JoinError) -> StoreError {
    StoreError::Task(format!("Failed to run blocking store task: {}", e))
}

#[async_trait]
impl EntryStore for SqliteStore {
    async fn create(&self, entry: NewEntry) -> Result<EntryId, StoreError> {
        let db = self.db.clone();
        let id = EntryId::new(Uuid::new_v4().to_string());
        let assigned = id.clone();

        task::spawn_blocking(move || -> Result<(), StoreError> {
            let conn = db.get_conn()?;
            entries::insert_entry(&conn, &assigned, &entry)?;
            Ok(())
        })
        .await
        .map_err(join_error)??;

        debug!("Created entry {}", id);
        self.notify();
        Ok(id)
    }

    async fn update(&self, id: &EntryId, patch: EntryPatch) -> Result<(), StoreError> {
        let db = self.db.clone();
        let target = id.clone();

        let found = task::spawn_blocking(move || -> Result<bool, StoreError> {
            let conn = db.get_conn()?;
            Ok(entries::update_entry(&conn, &target, &patch)?)
        })
        .await
        .map_err(join_error)??;

        if !found {
            return Err(StoreError::NotFound(id.clone()));
        }
        debug!("Updated entry {}", id);
        self.notify();
        Ok(())
    }

    async fn subscribe(&self, owner: &OwnerId) -> Result<SnapshotStream, StoreError> {
        let db = self.db.clone();
        let owner = owner.clone();
        debug!("Opening SQLite subscription for owner {}", owner);

        let stream = WatchStream::new(self.changes.subscribe()).then(move |_| {
            let db = db.clone();
            let owner = owner.clone();
            async move {
                task::spawn_blocking(move || -> Result<Vec<StoredEntry>, StoreError> {
                    let conn = db.get_conn()?;
                    Ok(entries::list_entries_for_owner(&conn, &owner)?)
                })
                .await
                .map_err(join_error)?
            }
        });
        Ok(stream.boxed())
    }
}
