//! Process-local entry store.

use super::{owner_snapshot, EntryStore, SnapshotStream};
use crate::errors::StoreError;
use crate::model::{EntryId, EntryPatch, NewEntry, OwnerId, StoredEntry};
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio_stream::wrappers::WatchStream;
use tracing::debug;
use uuid::Uuid;

/// Entries held in memory, shared between clones.
///
/// Subscriptions are driven by a change counter: every write bumps it and
/// each subscriber re-reads its owner's entries.
#[derive(Clone)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<EntryId, StoredEntry>>>,
    changes: Arc<watch::Sender<u64>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            changes: Arc::new(changes),
        }
    }

    /// Inserts a record as-is, bypassing validation.
    ///
    /// Useful for seeding records written by other clients, which may lack
    /// moods or timestamps.
    pub async fn insert_raw(&self, entry: StoredEntry) {
        self.entries.write().await.insert(entry.id.clone(), entry);
        self.notify();
    }

    /// Reads one entry back.
    pub async fn get(&self, id: &EntryId) -> Option<StoredEntry> {
        self.entries.read().await.get(id).cloned()
    }

    /// Number of entries across all owners.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn create(&self, entry: NewEntry) -> Result<EntryId, StoreError> {
        let id = EntryId::new(Uuid::new_v4().to_string());
        let stored = StoredEntry {
            id: id.clone(),
            owner_id: entry.owner_id,
            content: entry.content,
            mood_before: Some(entry.mood_before.to_string()),
            mood_after: entry.mood_after.map(|m| m.to_string()),
            created_at: Some(entry.created_at),
            updated_at: Some(entry.updated_at),
        };
        self.entries.write().await.insert(id.clone(), stored);
        debug!("Created entry {}", id);
        self.notify();
        Ok(id)
    }

    async fn update(&self, id: &EntryId, patch: EntryPatch) -> Result<(), StoreError> {
        {
            let mut entries = self.entries.write().await;
            let stored = entries
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.clone()))?;
            stored.content = patch.content;
            stored.mood_before = Some(patch.mood_before.to_string());
            if let Some(mood_after) = patch.mood_after {
                stored.mood_after = Some(mood_after.to_string());
            }
            stored.updated_at = Some(patch.updated_at);
        }
        debug!("Updated entry {}", id);
        self.notify();
        Ok(())
    }

    async fn subscribe(&self, owner: &OwnerId) -> Result<SnapshotStream, StoreError> {
        let entries = Arc::clone(&self.entries);
        let owner = owner.clone();
        debug!("Opening in-memory subscription for owner {}", owner);

        let stream = WatchStream::new(self.changes.subscribe()).then(move |_| {
            let entries = Arc::clone(&entries);
            let owner = owner.clone();
            async move {
                let guard = entries.read().await;
                Ok::<_, StoreError>(owner_snapshot(guard.values(), &owner))
            }
        });
        Ok(stream.boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoreTimestamp;
    use crate::mood::Mood;

    fn new_entry(owner: &str, content: &str) -> NewEntry {
        let now = StoreTimestamp::now();
        NewEntry {
            owner_id: OwnerId::from(owner),
            content: content.to_string(),
            mood_before: Mood::Neutral,
            mood_after: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_unique_ids() {
        let store = MemoryStore::new();
        let a = store.create(new_entry("alice", "one")).await.unwrap();
        let b = store.create(new_entry("alice", "two")).await.unwrap();
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_update_missing_entry_is_not_found() {
        let store = MemoryStore::new();
        let patch = EntryPatch {
            content: "x".to_string(),
            mood_before: Mood::Sad,
            mood_after: None,
            updated_at: StoreTimestamp::now(),
        };
        let err = store.update(&EntryId::from("ghost"), patch).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_keeps_mood_after_when_absent() {
        let store = MemoryStore::new();
        let mut entry = new_entry("alice", "one");
        entry.mood_after = Some(Mood::Happy);
        let id = store.create(entry).await.unwrap();

        let patch = EntryPatch {
            content: "edited".to_string(),
            mood_before: Mood::Calm,
            mood_after: None,
            updated_at: StoreTimestamp::now(),
        };
        store.update(&id, patch).await.unwrap();

        let stored = store.get(&id).await.unwrap();
        assert_eq!(stored.content, "edited");
        assert_eq!(stored.mood_before.as_deref(), Some("calm"));
        assert_eq!(stored.mood_after.as_deref(), Some("happy"));
    }

    #[tokio::test]
    async fn test_subscribe_yields_current_then_changes() {
        let store = MemoryStore::new();
        store.create(new_entry("alice", "first")).await.unwrap();

        let mut stream = store.subscribe(&OwnerId::from("alice")).await.unwrap();
        let first = stream.next().await.unwrap().unwrap();
        assert_eq!(first.len(), 1);

        store.create(new_entry("bob", "not alice")).await.unwrap();
        let second = stream.next().await.unwrap().unwrap();
        assert_eq!(second.len(), 1);

        store.create(new_entry("alice", "second")).await.unwrap();
        let third = stream.next().await.unwrap().unwrap();
        assert_eq!(third.len(), 2);
        assert!(third.iter().all(|e| e.owner_id == OwnerId::from("alice")));
    }
}
