//! Remote mediator: fills the local cache from the remote story list.
//!
//! Every successful load writes the fetched stories and their remote keys
//! in one store transaction. A refresh clears both tables inside that same
//! transaction, so readers see either the old feed or the new one.

use tracing::{debug, info, instrument};

use storyfeed_core::{FeedStore, PageToken, RemoteKey, Result, Story, StoryApi};

use crate::config::PagingConfig;
use crate::source::StoryPagingSource;
use crate::state::{LoadType, PagingState};

/// Whether a cache-backed feed should refresh before showing cached data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitializeAction {
    LaunchInitialRefresh,
    SkipInitialRefresh,
}

/// Result of one successful mediator load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The boundary was resolved, with or without a fetch.
    Complete { end_of_pagination_reached: bool },
    /// The anchor story has no remote key, so the page to fetch is
    /// unknown. Nothing was fetched and the boundary is not known to end.
    Unresolved,
}

impl LoadOutcome {
    pub fn end_of_pagination_reached(&self) -> bool {
        matches!(
            self,
            LoadOutcome::Complete {
                end_of_pagination_reached: true
            }
        )
    }
}

/// Decides which page a load needs, fetches it and commits it.
///
/// The mediator never retries; a failed fetch or commit is returned to the
/// caller and leaves the cache as it was.
#[derive(Debug)]
pub struct RemoteMediator<A, S> {
    source: StoryPagingSource<A>,
    store: S,
    config: PagingConfig,
}

impl<A, S> RemoteMediator<A, S>
where
    A: StoryApi,
    S: FeedStore,
{
    pub fn new(api: A, store: S, config: PagingConfig) -> Self {
        Self {
            source: StoryPagingSource::new(api),
            store,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Refresh first when asked to, or when the cached keys were recorded
    /// with another page size and no longer name the right pages.
    pub async fn initialize(&self) -> Result<InitializeAction> {
        if self.config.initial_refresh() {
            return Ok(InitializeAction::LaunchInitialRefresh);
        }

        match self.store.page_size().await? {
            Some(recorded) if recorded != self.config.page_size() => {
                debug!(
                    recorded,
                    configured = self.config.page_size(),
                    "Cached keys use another page size"
                );
                Ok(InitializeAction::LaunchInitialRefresh)
            }
            _ => Ok(InitializeAction::SkipInitialRefresh),
        }
    }

    /// Run one load against `state`, the cached feed as the reader sees it.
    #[instrument(skip(self, state), fields(loaded = state.pages.iter().map(|p| p.items.len()).sum::<usize>()))]
    pub async fn load(&self, load_type: LoadType, state: &PagingState) -> Result<LoadOutcome> {
        let page = match load_type {
            LoadType::Refresh => self
                .key_closest_to_anchor(state)
                .await?
                .and_then(|key| key.next_key)
                .and_then(PageToken::prev)
                .unwrap_or(PageToken::FIRST),
            LoadType::Prepend => {
                let Some(key) = self.key_for(state.first_item_or_none()).await? else {
                    debug!("No remote key for first story");
                    return Ok(LoadOutcome::Unresolved);
                };
                match key.prev_key {
                    Some(prev) => prev,
                    None => return Ok(end_reached()),
                }
            }
            LoadType::Append => {
                let Some(key) = self.key_for(state.last_item_or_none()).await? else {
                    debug!("No remote key for last story");
                    return Ok(LoadOutcome::Unresolved);
                };
                match key.next_key {
                    Some(next) => next,
                    None => return Ok(end_reached()),
                }
            }
        };

        let fetched = self
            .source
            .load(Some(page), self.config.page_size())
            .await?;
        let end_of_pagination_reached = fetched.items.is_empty();
        let count = fetched.items.len();

        self.commit(load_type, page, fetched.items, end_of_pagination_reached)
            .await?;

        if load_type == LoadType::Refresh {
            info!(%page, count, "Refreshed feed");
        } else {
            debug!(%page, count, end_of_pagination_reached, "Loaded page into cache");
        }

        Ok(LoadOutcome::Complete {
            end_of_pagination_reached,
        })
    }

    async fn commit(
        &self,
        load_type: LoadType,
        page: PageToken,
        stories: Vec<Story>,
        end_of_pagination_reached: bool,
    ) -> Result<()> {
        let clear = load_type == LoadType::Refresh;
        let page_size = self.config.page_size();
        self.store
            .transaction(move |tables| {
                if clear {
                    tables.remote_keys.delete_all();
                    tables.stories.clear_all();
                }
                tables.page_size = Some(page_size);
                let keys: Vec<RemoteKey> = stories
                    .iter()
                    .map(|story| {
                        RemoteKey::for_page(story.id.clone(), page, end_of_pagination_reached)
                    })
                    .collect();
                tables.remote_keys.insert_all(keys);
                tables.stories.insert_or_replace(stories);
                Ok(())
            })
            .await
    }

    async fn key_for(&self, story: Option<&Story>) -> Result<Option<RemoteKey>> {
        match story {
            Some(story) => self.store.remote_key(&story.id).await,
            None => Ok(None),
        }
    }

    async fn key_closest_to_anchor(&self, state: &PagingState) -> Result<Option<RemoteKey>> {
        let story = state
            .anchor_position
            .and_then(|position| state.closest_item_to_position(position));
        self.key_for(story).await
    }
}

fn end_reached() -> LoadOutcome {
    LoadOutcome::Complete {
        end_of_pagination_reached: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use storyfeed_core::{Error, StoryId};
    use storyfeed_store::LocalStore;

    use crate::state::Page;
    use crate::testing::{FakeApi, ids, story};

    struct Harness {
        api: Arc<FakeApi>,
        store: LocalStore,
        mediator: RemoteMediator<Arc<FakeApi>, LocalStore>,
    }

    impl Harness {
        fn new(remote: usize) -> Self {
            let api = Arc::new(FakeApi::with_stories(remote));
            let store = LocalStore::in_memory();
            let mediator =
                RemoteMediator::new(Arc::clone(&api), store.clone(), PagingConfig::default());
            Self {
                api,
                store,
                mediator,
            }
        }

        /// The cached feed as one page, anchored at `anchor`.
        async fn state(&self, anchor: Option<usize>) -> PagingState {
            let items = self.store.stories().await.unwrap();
            PagingState::new(
                vec![Page {
                    items,
                    prev_key: None,
                    next_key: None,
                }],
                anchor,
            )
        }

        async fn load(&self, load_type: LoadType) -> Result<LoadOutcome> {
            let state = self.state(None).await;
            self.mediator.load(load_type, &state).await
        }

        async fn cached(&self) -> Vec<Story> {
            self.store.stories().await.unwrap()
        }

        async fn key(&self, id: &str) -> Option<RemoteKey> {
            self.store
                .remote_key(&StoryId::new(id).unwrap())
                .await
                .unwrap()
        }
    }

    fn complete(end: bool) -> LoadOutcome {
        LoadOutcome::Complete {
            end_of_pagination_reached: end,
        }
    }

    #[tokio::test]
    async fn initialize_follows_config() {
        let api = Arc::new(FakeApi::with_stories(0));
        let store = LocalStore::in_memory();

        let mediator = RemoteMediator::new(Arc::clone(&api), store.clone(), PagingConfig::default());
        assert_eq!(
            mediator.initialize().await.unwrap(),
            InitializeAction::LaunchInitialRefresh
        );

        let config = PagingConfig::default().with_initial_refresh(false);
        let mediator = RemoteMediator::new(api, store, config);
        assert_eq!(
            mediator.initialize().await.unwrap(),
            InitializeAction::SkipInitialRefresh
        );
    }

    #[tokio::test]
    async fn initialize_refreshes_when_page_size_changed() {
        let api = Arc::new(FakeApi::with_stories(12));
        let store = LocalStore::in_memory();
        let mediator = RemoteMediator::new(Arc::clone(&api), store.clone(), PagingConfig::default());
        mediator
            .load(LoadType::Refresh, &PagingState::default())
            .await
            .unwrap();
        assert_eq!(store.page_size().await.unwrap(), Some(5));

        let same = PagingConfig::default().with_initial_refresh(false);
        let mediator = RemoteMediator::new(Arc::clone(&api), store.clone(), same);
        assert_eq!(
            mediator.initialize().await.unwrap(),
            InitializeAction::SkipInitialRefresh
        );

        let resized = PagingConfig::new(4).unwrap().with_initial_refresh(false);
        let mediator = RemoteMediator::new(api, store, resized);
        assert_eq!(
            mediator.initialize().await.unwrap(),
            InitializeAction::LaunchInitialRefresh
        );
    }

    #[tokio::test]
    async fn appends_walk_to_end_of_data() {
        let h = Harness::new(12);

        assert_eq!(h.load(LoadType::Refresh).await.unwrap(), complete(false));
        assert_eq!(h.load(LoadType::Append).await.unwrap(), complete(false));
        assert_eq!(h.load(LoadType::Append).await.unwrap(), complete(false));
        assert_eq!(h.cached().await.len(), 12);

        assert_eq!(h.load(LoadType::Append).await.unwrap(), complete(true));
        assert_eq!(h.cached().await.len(), 12);
        assert_eq!(h.api.calls(), vec![(1, 5), (2, 5), (3, 5), (4, 5)]);

        let expected: Vec<String> = (1..=12).map(|n| format!("story-{n}")).collect();
        assert_eq!(ids(&h.cached().await), expected);
    }

    #[tokio::test]
    async fn appended_pages_match_one_combined_fetch() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();
        h.load(LoadType::Append).await.unwrap();

        let combined = h.api.stories(PageToken::FIRST, 10).await.unwrap();
        assert_eq!(ids(&h.cached().await), ids(&combined));
    }

    #[tokio::test]
    async fn remote_keys_match_cached_stories() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();
        h.load(LoadType::Append).await.unwrap();

        let tables = h.store.tables().unwrap();
        assert!(tables.is_consistent());
        assert_eq!(tables.remote_keys.len(), 10);

        let key = h.key("story-7").await.unwrap();
        assert_eq!(key.prev_key, Some(PageToken::FIRST));
        assert_eq!(key.next_key, Some(PageToken::new(3).unwrap()));
    }

    #[tokio::test]
    async fn refresh_replaces_whole_cache() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();
        h.load(LoadType::Append).await.unwrap();
        h.load(LoadType::Append).await.unwrap();
        assert_eq!(h.cached().await.len(), 12);

        h.load(LoadType::Refresh).await.unwrap();

        assert_eq!(h.cached().await.len(), 5);
        let tables = h.store.tables().unwrap();
        assert!(tables.is_consistent());
        assert_eq!(tables.remote_keys.len(), 5);
        assert!(h.key("story-6").await.is_none());
    }

    #[tokio::test]
    async fn refresh_reloads_page_around_anchor() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();
        h.load(LoadType::Append).await.unwrap();

        // story-8 sits on page 2.
        let state = h.state(Some(7)).await;
        h.mediator.load(LoadType::Refresh, &state).await.unwrap();

        assert_eq!(h.api.calls().last(), Some(&(2, 5)));
        let expected: Vec<String> = (6..=10).map(|n| format!("story-{n}")).collect();
        assert_eq!(ids(&h.cached().await), expected);
    }

    #[tokio::test]
    async fn failed_append_keeps_cache_and_retry_succeeds() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();
        let before = h.cached().await;
        let version = h.store.version();

        h.api.set_failing(true);
        let err = h.load(LoadType::Append).await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));
        assert_eq!(h.cached().await, before);
        assert_eq!(h.store.version(), version);

        h.api.set_failing(false);
        assert_eq!(h.load(LoadType::Append).await.unwrap(), complete(false));
        assert_eq!(h.cached().await.len(), 10);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_previous_feed() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();
        h.load(LoadType::Append).await.unwrap();

        h.api.set_failing(true);
        assert!(h.load(LoadType::Refresh).await.is_err());
        assert_eq!(h.cached().await.len(), 10);
    }

    #[tokio::test]
    async fn prepend_at_first_page_needs_no_fetch() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();
        let calls = h.api.calls().len();

        assert_eq!(h.load(LoadType::Prepend).await.unwrap(), complete(true));
        assert_eq!(h.load(LoadType::Prepend).await.unwrap(), complete(true));
        assert_eq!(h.api.calls().len(), calls);
    }

    #[tokio::test]
    async fn prepend_from_later_page_fetches_previous_page() {
        let h = Harness::new(12);
        // Seed the cache with page 2 only.
        h.store
            .transaction(|tables| {
                tables.clear();
                let page = PageToken::new(2).unwrap();
                let stories: Vec<Story> = (6..=10).map(|n| story(&format!("story-{n}"))).collect();
                tables.remote_keys.insert_all(
                    stories
                        .iter()
                        .map(|s| RemoteKey::for_page(s.id.clone(), page, false))
                        .collect::<Vec<_>>(),
                );
                tables.stories.insert_or_replace(stories);
                Ok(())
            })
            .await
            .unwrap();

        assert_eq!(h.load(LoadType::Prepend).await.unwrap(), complete(false));
        assert_eq!(h.api.calls(), vec![(1, 5)]);
        assert_eq!(h.cached().await.len(), 10);
        assert!(h.store.tables().unwrap().is_consistent());
    }

    #[tokio::test]
    async fn missing_remote_key_is_unresolved() {
        let h = Harness::new(12);

        // Nothing cached yet.
        assert_eq!(h.load(LoadType::Append).await.unwrap(), LoadOutcome::Unresolved);
        assert_eq!(h.load(LoadType::Prepend).await.unwrap(), LoadOutcome::Unresolved);

        // A story with no key at all.
        h.store
            .transaction(|tables| {
                tables.stories.insert_or_replace(vec![story("orphan")]);
                Ok(())
            })
            .await
            .unwrap();
        let outcome = h.load(LoadType::Append).await.unwrap();
        assert_eq!(outcome, LoadOutcome::Unresolved);
        assert!(!outcome.end_of_pagination_reached());
        assert!(h.api.calls().is_empty());
    }

    #[tokio::test]
    async fn empty_refresh_clears_cache() {
        let h = Harness::new(12);
        h.load(LoadType::Refresh).await.unwrap();

        h.api.set_stories(Vec::new());
        assert_eq!(h.load(LoadType::Refresh).await.unwrap(), complete(true));
        assert!(h.cached().await.is_empty());
        assert!(h.store.tables().unwrap().remote_keys.is_empty());
    }
}
