//! Remote story endpoint trait.

use std::sync::Arc;

use async_trait::async_trait;

use crate::types::{PageToken, Story};
use crate::Result;

/// The remote story list, as consumed by the paging core.
///
/// Implementations do their own transport and decoding and report every
/// failure through the returned [`Result`]; they never touch the local
/// cache.
#[async_trait]
pub trait StoryApi: Send + Sync {
    /// Fetch one page of stories, newest first.
    ///
    /// An empty list is a successful answer meaning `page` lies past the
    /// end of the remote data.
    async fn stories(&self, page: PageToken, size: u32) -> Result<Vec<Story>>;

    /// Fetch every story that carries a location, unpaged.
    async fn stories_with_location(&self) -> Result<Vec<Story>>;
}

#[async_trait]
impl<T> StoryApi for Arc<T>
where
    T: StoryApi + ?Sized,
{
    async fn stories(&self, page: PageToken, size: u32) -> Result<Vec<Story>> {
        (**self).stories(page, size).await
    }

    async fn stories_with_location(&self) -> Result<Vec<Story>> {
        (**self).stories_with_location().await
    }
}
