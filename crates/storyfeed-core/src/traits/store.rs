//! Transactional local store trait.

use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use futures_core::Stream;

use crate::cache::FeedTables;
use crate::types::{RemoteKey, Story, StoryId};
use crate::Result;

/// A restartable stream of the cached stories in feed order.
///
/// The current contents are yielded first, then again after every commit.
pub type StoryStream = Pin<Box<dyn Stream<Item = Result<Vec<Story>>> + Send>>;

/// The local cache: the story table and the remote key table, mutated
/// only through atomic transactions.
///
/// Readers observe either the state before a transaction or the state
/// after it, never anything in between. A failed transaction leaves the
/// previous contents untouched.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Look up the remote key recorded for a story.
    async fn remote_key(&self, id: &StoryId) -> Result<Option<RemoteKey>>;

    /// The cached stories in feed order.
    async fn stories(&self) -> Result<Vec<Story>>;

    /// The page size the cached remote keys were recorded with, if any.
    async fn page_size(&self) -> Result<Option<u32>>;

    /// Observe the cached stories.
    fn observe(&self) -> StoryStream;

    /// Run `f` against a staged copy of both tables and commit the result
    /// atomically. If `f` or the commit fails, nothing is published.
    async fn transaction<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut FeedTables) -> Result<R> + Send + 'static,
        R: Send + 'static;
}

#[async_trait]
impl<T> FeedStore for Arc<T>
where
    T: FeedStore + ?Sized,
{
    async fn remote_key(&self, id: &StoryId) -> Result<Option<RemoteKey>> {
        (**self).remote_key(id).await
    }

    async fn stories(&self) -> Result<Vec<Story>> {
        (**self).stories().await
    }

    async fn page_size(&self) -> Result<Option<u32>> {
        (**self).page_size().await
    }

    fn observe(&self) -> StoryStream {
        (**self).observe()
    }

    async fn transaction<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut FeedTables) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        (**self).transaction(f).await
    }
}
