//! In-memory story API used by the engine tests.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use storyfeed_core::error::NetworkError;
use storyfeed_core::{PageToken, Result, Story, StoryApi, StoryId};

pub(crate) fn story(id: &str) -> Story {
    Story {
        id: StoryId::new(id).unwrap(),
        name: format!("author of {id}"),
        description: format!("story {id}"),
        photo_url: format!("https://example.com/{id}.jpg"),
        created_at: "2024-01-01T00:00:00Z".to_string(),
        lat: None,
        lon: None,
    }
}

pub(crate) fn ids(stories: &[Story]) -> Vec<&str> {
    stories.iter().map(|s| s.id.as_str()).collect()
}

/// Serves `story-1..=story-N` in pages, newest first.
pub(crate) struct FakeApi {
    stories: Mutex<Vec<Story>>,
    failing: AtomicBool,
    calls: Mutex<Vec<(u32, u32)>>,
}

impl FakeApi {
    pub(crate) fn with_stories(count: usize) -> Self {
        let stories = (1..=count).map(|n| story(&format!("story-{n}"))).collect();
        Self {
            stories: Mutex::new(stories),
            failing: AtomicBool::new(false),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Replace the remote collection.
    pub(crate) fn set_stories(&self, stories: Vec<Story>) {
        *self.stories.lock().unwrap() = stories;
    }

    /// Every `(page, size)` requested so far.
    pub(crate) fn calls(&self) -> Vec<(u32, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl StoryApi for FakeApi {
    async fn stories(&self, page: PageToken, size: u32) -> Result<Vec<Story>> {
        self.calls.lock().unwrap().push((page.get(), size));
        if self.failing.load(Ordering::SeqCst) {
            return Err(NetworkError::Connection {
                message: "simulated outage".to_string(),
            }
            .into());
        }

        let stories = self.stories.lock().unwrap();
        let start = ((page.get() - 1) * size) as usize;
        let end = (start + size as usize).min(stories.len());
        Ok(stories.get(start..end).map(<[Story]>::to_vec).unwrap_or_default())
    }

    async fn stories_with_location(&self) -> Result<Vec<Story>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NetworkError::Connection {
                message: "simulated outage".to_string(),
            }
            .into());
        }
        let stories = self.stories.lock().unwrap();
        Ok(stories
            .iter()
            .filter(|s| s.location().is_some())
            .cloned()
            .collect())
    }
}
