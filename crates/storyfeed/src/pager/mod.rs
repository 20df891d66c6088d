//! The paged feed a front end consumes.
//!
//! A [`Pager`] owns one feed subscription: its load states, its anchor and
//! the items it currently shows. It runs in one of two configurations:
//!
//! - **cache-backed** ([`Pager::cached`]): the feed is the local store,
//!   filled by a [`RemoteMediator`](crate::RemoteMediator) and persisted
//!   across restarts;
//! - **memory-only** ([`Pager::memory`]): pages come straight from the API
//!   and live for the session only.
//!
//! Every state change is published as a [`FeedSnapshot`] on a watch
//! channel. Load methods take `&mut self`, so a subscription never has two
//! loads in flight.
//!
//! # Example
//!
//! ```no_run
//! use storyfeed::{LocalStore, PagingConfig, Pager, StoryService, ClientConfig};
//! use storyfeed_core::ApiUrl;
//!
//! # async fn example() -> storyfeed_core::Result<()> {
//! let api = StoryService::new(ClientConfig::new(ApiUrl::new("https://story-api.dicoding.dev/v1")?))?;
//! let store = LocalStore::open("/var/lib/storyfeed")?;
//!
//! let mut pager = Pager::cached(PagingConfig::default(), api, store);
//! pager.start().await;
//! pager.append().await;
//!
//! for story in &pager.snapshot().items {
//!     println!("{}: {}", story.name, story.description);
//! }
//! # Ok(())
//! # }
//! ```

mod handle;
mod loader;

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, instrument, warn};

use storyfeed_core::{Error, FeedStore, Result, Story, StoryApi, StoryStream};

use crate::config::PagingConfig;
use crate::mediator::{InitializeAction, LoadOutcome};
use crate::snapshot::{FeedSnapshot, dedupe_by_id};
use crate::state::{LoadState, LoadStates, LoadType};

pub use handle::{FeedClosed, FeedHandle};
use loader::{CachedLoader, MemoryLoader, PageLoader};

/// Which configuration a [`Pager`] runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedMode {
    Cached,
    Memory,
}

/// The paged feed controller for one subscription.
pub struct Pager {
    loader: Box<dyn PageLoader>,
    mode: FeedMode,
    config: PagingConfig,
    items: Vec<Story>,
    load_states: LoadStates,
    anchor: Option<usize>,
    last_failed: Option<LoadType>,
    updates: watch::Sender<FeedSnapshot>,
}

impl Pager {
    /// A feed backed by `store` and filled from `api`.
    pub fn cached<A, S>(config: PagingConfig, api: A, store: S) -> Self
    where
        A: StoryApi + 'static,
        S: FeedStore + 'static,
    {
        Self::with_loader(
            Box::new(CachedLoader::new(config, api, store)),
            FeedMode::Cached,
            config,
        )
    }

    /// A feed that keeps fetched pages in memory only.
    pub fn memory<A>(config: PagingConfig, api: A) -> Self
    where
        A: StoryApi + 'static,
    {
        Self::with_loader(
            Box::new(MemoryLoader::new(config, api)),
            FeedMode::Memory,
            config,
        )
    }

    fn with_loader(loader: Box<dyn PageLoader>, mode: FeedMode, config: PagingConfig) -> Self {
        let (updates, _) = watch::channel(FeedSnapshot::default());
        Self {
            loader,
            mode,
            config,
            items: Vec::new(),
            load_states: LoadStates::default(),
            anchor: None,
            last_failed: None,
            updates,
        }
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    pub fn config(&self) -> &PagingConfig {
        &self.config
    }

    pub fn items(&self) -> &[Story] {
        &self.items
    }

    pub fn load_states(&self) -> &LoadStates {
        &self.load_states
    }

    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// The load a [`retry`](Self::retry) would re-issue.
    pub fn last_failed(&self) -> Option<LoadType> {
        self.last_failed
    }

    pub fn snapshot(&self) -> FeedSnapshot {
        FeedSnapshot {
            items: self.items.clone(),
            load_states: self.load_states.clone(),
        }
    }

    /// Receive a snapshot after every change.
    pub fn subscribe(&self) -> watch::Receiver<FeedSnapshot> {
        self.updates.subscribe()
    }

    /// Show what is already loaded, then refresh unless the loader says
    /// cached data may be shown as is.
    pub async fn start(&mut self) -> LoadState {
        let action = match self.loader.initialize().await {
            Ok(action) => action,
            Err(e) => {
                self.fail(LoadType::Refresh, e);
                self.publish();
                return self.load_states.refresh.clone();
            }
        };

        match action {
            InitializeAction::LaunchInitialRefresh => self.refresh().await,
            InitializeAction::SkipInitialRefresh => {
                debug!("Skipping initial refresh");
                if let Err(e) = self.reload_items().await {
                    self.fail(LoadType::Refresh, e);
                }
                self.publish();
                self.load_states.refresh.clone()
            }
        }
    }

    pub async fn refresh(&mut self) -> LoadState {
        self.load(LoadType::Refresh).await
    }

    pub async fn prepend(&mut self) -> LoadState {
        self.load(LoadType::Prepend).await
    }

    pub async fn append(&mut self) -> LoadState {
        self.load(LoadType::Append).await
    }

    /// Re-issue the last failed load. `None` if nothing has failed.
    ///
    /// The anchor is left where it is.
    pub async fn retry(&mut self) -> Option<LoadState> {
        let load_type = self.last_failed?;
        debug!(%load_type, "Retrying failed load");
        Some(self.load(load_type).await)
    }

    /// Move the anchor to the item at `index`.
    pub fn set_anchor(&mut self, index: usize) {
        self.anchor = Some(index);
    }

    /// Move the anchor and prefetch if it came within the prefetch
    /// distance of either edge.
    pub async fn scrolled_to(&mut self, index: usize) {
        self.set_anchor(index);
        if self.items.is_empty() {
            return;
        }

        let distance = self.config.prefetch_distance() as usize;
        if index.saturating_add(distance) >= self.items.len() - 1 {
            self.append().await;
        }
        if index < distance {
            self.prepend().await;
        }
    }

    /// Run one load and publish the result.
    ///
    /// A prepend or append for a boundary already known to have ended is
    /// answered from state until the next refresh.
    #[instrument(skip(self), fields(mode = ?self.mode))]
    pub async fn load(&mut self, load_type: LoadType) -> LoadState {
        let current = self.load_states.get(load_type);
        if load_type != LoadType::Refresh && current.end_of_pagination_reached() {
            debug!("Boundary already ended");
            return current.clone();
        }

        self.load_states.set(load_type, LoadState::Loading);
        self.publish();

        match self.run(load_type).await {
            Ok(outcome) => self.succeed(load_type, outcome),
            Err(e) => self.fail(load_type, e),
        }

        self.publish();
        self.load_states.get(load_type).clone()
    }

    async fn run(&mut self, load_type: LoadType) -> Result<LoadOutcome> {
        let outcome = self.loader.load(load_type, self.anchor).await?;
        self.reload_items().await?;
        Ok(outcome)
    }

    async fn reload_items(&mut self) -> Result<()> {
        self.items = dedupe_by_id(self.loader.items().await?);
        Ok(())
    }

    fn succeed(&mut self, load_type: LoadType, outcome: LoadOutcome) {
        if outcome == LoadOutcome::Unresolved {
            debug!(%load_type, "Boundary unresolved; left idle");
        }
        let state = LoadState::Loaded {
            end_of_pagination_reached: outcome.end_of_pagination_reached(),
        };

        if load_type == LoadType::Refresh {
            // A new first page: both boundaries start over.
            self.load_states = LoadStates {
                refresh: state.clone(),
                prepend: LoadState::IDLE,
                append: state,
            };
            self.last_failed = None;
        } else {
            self.load_states.set(load_type, state);
            if self.last_failed == Some(load_type) {
                self.last_failed = None;
            }
        }
    }

    fn fail(&mut self, load_type: LoadType, error: Error) {
        warn!(%load_type, error = %error, "Load failed");
        self.load_states
            .set(load_type, LoadState::Error(Arc::new(error)));
        self.last_failed = Some(load_type);
    }

    /// Replace the items with a list read from the store.
    pub(crate) fn apply_store_change(&mut self, stories: Vec<Story>) {
        self.items = dedupe_by_id(stories);
        self.publish();
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    pub(crate) fn observe_store(&self) -> Option<StoryStream> {
        self.loader.observe()
    }
}

impl std::fmt::Debug for Pager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pager")
            .field("mode", &self.mode)
            .field("items", &self.items.len())
            .field("load_states", &self.load_states)
            .field("anchor", &self.anchor)
            .finish()
    }
}
