//! Stateless page fetcher.

use tracing::{debug, instrument};

use storyfeed_core::{PageToken, Result, StoryApi};

use crate::state::{Page, PagingState};

/// Fetches one page from a [`StoryApi`] and links it to its neighbours.
///
/// Has no side effects: nothing fetched here touches the local cache.
#[derive(Debug, Clone)]
pub struct StoryPagingSource<A> {
    api: A,
}

impl<A: StoryApi> StoryPagingSource<A> {
    pub fn new(api: A) -> Self {
        Self { api }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Fetch `token` (page 1 when `None`) with `size` items per page.
    #[instrument(skip(self))]
    pub async fn load(&self, token: Option<PageToken>, size: u32) -> Result<Page> {
        let page = token.unwrap_or(PageToken::FIRST);
        let items = self.api.stories(page, size).await?;
        debug!(%page, count = items.len(), "Loaded page");
        Ok(Page::fetched(page, items))
    }

    /// Fetch `pages` consecutive pages of `page_size` items in one request.
    ///
    /// The request is aligned down to a multiple of `pages`, so the block
    /// holding `first` is loaded and its tokens stay in `page_size` units.
    #[instrument(skip(self))]
    pub async fn load_span(&self, first: PageToken, page_size: u32, pages: u32) -> Result<Page> {
        let pages = pages.max(1);
        let block = (first.get() - 1) / pages;
        let start = PageToken::FIRST.skip(block * pages);
        let items = self
            .api
            .stories(PageToken::FIRST.skip(block), page_size.saturating_mul(pages))
            .await?;
        debug!(%start, pages, count = items.len(), "Loaded page span");
        Ok(Page::spanning(start, pages, items))
    }

    /// Page to reload so the reader stays near the anchor.
    ///
    /// The page after the anchor page's previous page, else the page before
    /// its next page.
    pub fn refresh_key(&self, state: &PagingState) -> Option<PageToken> {
        let anchor = state.anchor_position?;
        let page = state.closest_page_to_position(anchor)?;
        page.prev_key
            .map(PageToken::next)
            .or_else(|| page.next_key.and_then(PageToken::prev))
    }
}
