//! Feed snapshots and the diff between two of them.

use std::collections::{HashMap, HashSet};

use storyfeed_core::{Story, StoryId};

use crate::state::LoadStates;

/// What a feed shows at one moment: its stories and boundary states.
#[derive(Debug, Clone, Default)]
pub struct FeedSnapshot {
    pub items: Vec<Story>,
    pub load_states: LoadStates,
}

impl FeedSnapshot {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Changes needed to turn `previous` into this snapshot.
    pub fn diff(&self, previous: &FeedSnapshot) -> FeedDiff {
        let before: HashMap<&StoryId, &Story> =
            previous.items.iter().map(|s| (&s.id, s)).collect();
        let now: HashSet<&StoryId> = self.items.iter().map(|s| &s.id).collect();

        let mut diff = FeedDiff::default();
        for story in &self.items {
            match before.get(&story.id) {
                None => diff.inserted.push(story.id.clone()),
                Some(old) if *old != story => diff.changed.push(story.id.clone()),
                Some(_) => {}
            }
        }
        diff.removed = previous
            .items
            .iter()
            .filter(|s| !now.contains(&s.id))
            .map(|s| s.id.clone())
            .collect();
        diff
    }
}

/// Story ids inserted, removed or changed between two snapshots.
///
/// `inserted` and `changed` follow the newer order, `removed` the older.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedDiff {
    pub inserted: Vec<StoryId>,
    pub removed: Vec<StoryId>,
    pub changed: Vec<StoryId>,
}

impl FeedDiff {
    pub fn is_empty(&self) -> bool {
        self.inserted.is_empty() && self.removed.is_empty() && self.changed.is_empty()
    }
}

/// Keep the first occurrence of every story id.
pub(crate) fn dedupe_by_id(stories: impl IntoIterator<Item = Story>) -> Vec<Story> {
    let mut seen = HashSet::new();
    stories
        .into_iter()
        .filter(|story| seen.insert(story.id.clone()))
        .collect()
}
