//! The two ways a feed can get its pages.

use async_trait::async_trait;
use tracing::debug;

use storyfeed_core::{FeedStore, PageToken, Result, Story, StoryApi, StoryStream};

use crate::config::PagingConfig;
use crate::mediator::{InitializeAction, LoadOutcome, RemoteMediator};
use crate::snapshot::dedupe_by_id;
use crate::source::StoryPagingSource;
use crate::state::{LoadType, Page, PagingState};

#[async_trait]
pub(crate) trait PageLoader: Send + Sync {
    async fn initialize(&self) -> Result<InitializeAction>;

    /// Run one load with the reader at `anchor`.
    async fn load(&mut self, load_type: LoadType, anchor: Option<usize>) -> Result<LoadOutcome>;

    /// Everything loaded so far, in feed order.
    async fn items(&self) -> Result<Vec<Story>>;

    /// Changes made to the backing store by any writer.
    fn observe(&self) -> Option<StoryStream>;
}

/// Reads the local store and fills it through a [`RemoteMediator`].
pub(crate) struct CachedLoader<A, S> {
    mediator: RemoteMediator<A, S>,
}

impl<A, S> CachedLoader<A, S>
where
    A: StoryApi,
    S: FeedStore,
{
    pub(crate) fn new(config: PagingConfig, api: A, store: S) -> Self {
        Self {
            mediator: RemoteMediator::new(api, store, config),
        }
    }
}

#[async_trait]
impl<A, S> PageLoader for CachedLoader<A, S>
where
    A: StoryApi + 'static,
    S: FeedStore + 'static,
{
    async fn initialize(&self) -> Result<InitializeAction> {
        self.mediator.initialize().await
    }

    async fn load(&mut self, load_type: LoadType, anchor: Option<usize>) -> Result<LoadOutcome> {
        // Page keys live in the remote key store, so the cached feed is
        // handed over as a single page.
        let items = self.mediator.store().stories().await?;
        let state = PagingState::new(
            vec![Page {
                items,
                prev_key: None,
                next_key: None,
            }],
            anchor,
        );
        self.mediator.load(load_type, &state).await
    }

    async fn items(&self) -> Result<Vec<Story>> {
        self.mediator.store().stories().await
    }

    fn observe(&self) -> Option<StoryStream> {
        Some(self.mediator.store().observe())
    }
}

/// Fetches straight from the API and keeps pages for this session only.
pub(crate) struct MemoryLoader<A> {
    source: StoryPagingSource<A>,
    config: PagingConfig,
    pages: Vec<Page>,
}

impl<A: StoryApi> MemoryLoader<A> {
    pub(crate) fn new(config: PagingConfig, api: A) -> Self {
        Self {
            source: StoryPagingSource::new(api),
            config,
            pages: Vec::new(),
        }
    }
}

#[async_trait]
impl<A> PageLoader for MemoryLoader<A>
where
    A: StoryApi + 'static,
{
    async fn initialize(&self) -> Result<InitializeAction> {
        Ok(InitializeAction::LaunchInitialRefresh)
    }

    async fn load(&mut self, load_type: LoadType, anchor: Option<usize>) -> Result<LoadOutcome> {
        let state = PagingState::new(self.pages.clone(), anchor);

        let page = match load_type {
            LoadType::Refresh => {
                // The initial load spans several pages; its tokens stay in
                // page-size units so appends continue after it.
                let first = self.source.refresh_key(&state).unwrap_or(PageToken::FIRST);
                self.source
                    .load_span(
                        first,
                        self.config.page_size(),
                        self.config.initial_load_pages(),
                    )
                    .await?
            }
            LoadType::Prepend => {
                let Some(first) = self.pages.first() else {
                    return Ok(LoadOutcome::Unresolved);
                };
                let Some(prev) = first.prev_key else {
                    return Ok(end_reached());
                };
                self.source.load(Some(prev), self.config.page_size()).await?
            }
            LoadType::Append => {
                let Some(last) = self.pages.last() else {
                    return Ok(LoadOutcome::Unresolved);
                };
                let Some(next) = last.next_key else {
                    return Ok(end_reached());
                };
                self.source.load(Some(next), self.config.page_size()).await?
            }
        };

        let end_of_pagination_reached = page.items.is_empty();

        match load_type {
            LoadType::Refresh => self.pages = vec![page],
            // An empty page only tells us where the data ends.
            _ if end_of_pagination_reached => {}
            LoadType::Prepend => self.pages.insert(0, page),
            LoadType::Append => self.pages.push(page),
        }
        debug!(pages = self.pages.len(), "Memory feed updated");

        Ok(LoadOutcome::Complete {
            end_of_pagination_reached,
        })
    }

    async fn items(&self) -> Result<Vec<Story>> {
        Ok(dedupe_by_id(
            self.pages.iter().flat_map(|page| page.items.iter().cloned()),
        ))
    }

    fn observe(&self) -> Option<StoryStream> {
        None
    }
}

fn end_reached() -> LoadOutcome {
    LoadOutcome::Complete {
        end_of_pagination_reached: true,
    }
}
