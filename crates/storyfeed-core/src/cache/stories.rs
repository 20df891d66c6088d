//! Ordered story cache.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{Story, StoryId};

/// Stories in feed order, unique by id.
///
/// New ids are appended in the order they are inserted. Re-inserting an id
/// that is already cached replaces the record but keeps its position, so a
/// re-fetched page never reorders the feed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<Story>", into = "Vec<Story>")]
pub struct StoryTable {
    rows: Vec<Story>,
    index: HashMap<StoryId, usize>,
}

impl StoryTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Upsert stories by id.
    pub fn insert_or_replace(&mut self, stories: impl IntoIterator<Item = Story>) {
        for story in stories {
            match self.index.get(&story.id) {
                Some(&pos) => self.rows[pos] = story,
                None => {
                    self.index.insert(story.id.clone(), self.rows.len());
                    self.rows.push(story);
                }
            }
        }
    }

    /// Remove every story.
    pub fn clear_all(&mut self) {
        self.rows.clear();
        self.index.clear();
    }

    /// Look up a story by id.
    pub fn get(&self, id: &StoryId) -> Option<&Story> {
        self.index.get(id).map(|&pos| &self.rows[pos])
    }

    /// Position of a story in feed order.
    pub fn position(&self, id: &StoryId) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate in feed order.
    pub fn iter(&self) -> impl Iterator<Item = &Story> {
        self.rows.iter()
    }

    /// Returns the stories in feed order as a slice.
    pub fn as_slice(&self) -> &[Story] {
        &self.rows
    }
}

impl From<Vec<Story>> for StoryTable {
    fn from(stories: Vec<Story>) -> Self {
        let mut table = StoryTable::new();
        table.insert_or_replace(stories);
        table
    }
}

impl From<StoryTable> for Vec<Story> {
    fn from(table: StoryTable) -> Self {
        table.rows
    }
}
