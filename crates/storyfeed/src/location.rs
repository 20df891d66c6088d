//! The unpaged feed of stories that carry a location.

use std::sync::Arc;

use futures_util::Stream;
use tracing::{debug, warn};

use storyfeed_core::{Error, Story, StoryApi};

/// A value that is loading, loaded, or failed to load.
#[derive(Debug, Clone)]
pub enum Resource<T> {
    Loading,
    Success(T),
    Error(Arc<Error>),
}

impl<T> Resource<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Resource::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            Resource::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_result(self) -> Option<Result<T, Arc<Error>>> {
        match self {
            Resource::Loading => None,
            Resource::Success(value) => Some(Ok(value)),
            Resource::Error(e) => Some(Err(e)),
        }
    }
}

/// Fetch every geo-tagged story once: `Loading`, then `Success` or `Error`.
pub fn stories_with_location<A>(api: A) -> impl Stream<Item = Resource<Vec<Story>>> + Send
where
    A: StoryApi + 'static,
{
    async_stream::stream! {
        yield Resource::Loading;
        match api.stories_with_location().await {
            Ok(stories) => {
                debug!(count = stories.len(), "Loaded stories with location");
                yield Resource::Success(stories);
            }
            Err(e) => {
                warn!(error = %e, "Failed to load stories with location");
                yield Resource::Error(Arc::new(e));
            }
        }
    }
}
