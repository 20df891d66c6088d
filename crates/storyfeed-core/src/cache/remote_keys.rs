//! Remote key store.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{RemoteKey, StoryId};

/// Remote keys by story id. Pure key-value semantics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<RemoteKey>", into = "Vec<RemoteKey>")]
pub struct RemoteKeyTable {
    keys: HashMap<StoryId, RemoteKey>,
}

impl RemoteKeyTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the key recorded for a story.
    pub fn get(&self, id: &StoryId) -> Option<&RemoteKey> {
        self.keys.get(id)
    }

    /// Upsert keys by story id.
    pub fn insert_all(&mut self, keys: impl IntoIterator<Item = RemoteKey>) {
        for key in keys {
            self.keys.insert(key.id.clone(), key);
        }
    }

    /// Remove every key.
    pub fn delete_all(&mut self) {
        self.keys.clear();
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RemoteKey> {
        self.keys.values()
    }
}

impl From<Vec<RemoteKey>> for RemoteKeyTable {
    fn from(keys: Vec<RemoteKey>) -> Self {
        let mut table = RemoteKeyTable::new();
        table.insert_all(keys);
        table
    }
}

impl From<RemoteKeyTable> for Vec<RemoteKey> {
    fn from(table: RemoteKeyTable) -> Self {
        // Sorted so snapshots on disk are stable between commits.
        let mut keys: Vec<_> = table.keys.into_values().collect();
        keys.sort_by(|a, b| a.id.cmp(&b.id));
        keys
    }
}
