//! The two local tables behind the story feed.
//!
//! [`StoryTable`] is the ordered, de-duplicated story cache and
//! [`RemoteKeyTable`] maps each cached story to the page markers it was
//! fetched with. Both are plain in-memory structures; durability and
//! atomic commits are the job of a [`FeedStore`](crate::FeedStore)
//! implementation, which hands a [`FeedTables`] to each transaction.

mod remote_keys;
mod stories;

pub use remote_keys::RemoteKeyTable;
pub use stories::StoryTable;

use serde::{Deserialize, Serialize};

/// Both tables, committed together.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedTables {
    pub stories: StoryTable,
    pub remote_keys: RemoteKeyTable,
    /// Page size the remote keys were recorded with.
    #[serde(default)]
    pub page_size: Option<u32>,
}

impl FeedTables {
    /// Create empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both tables.
    pub fn clear(&mut self) {
        self.remote_keys.delete_all();
        self.stories.clear_all();
        self.page_size = None;
    }

    /// Returns true if every cached story has a remote key and no key is
    /// orphaned.
    pub fn is_consistent(&self) -> bool {
        self.stories.len() == self.remote_keys.len()
            && self
                .stories
                .iter()
                .all(|story| self.remote_keys.get(&story.id).is_some())
    }
}
