//! storyfeed - a cached, paged story feed.
//!
//! Keeps a local, ordered story feed in step with a paged remote API. The
//! pieces, leaves first:
//!
//! - [`StoryPagingSource`] fetches one page and links it to its neighbours;
//! - [`RemoteMediator`] decides which page a load needs and commits it to
//!   the store together with its remote keys;
//! - [`Pager`] is the feed a front end consumes, cache-backed or
//!   memory-only, publishing a [`FeedSnapshot`] after every change.
//!
//! [`LocalStore`] and [`StoryService`] are re-exported so one dependency is
//! enough to wire a feed together.

pub mod config;
pub mod location;
pub mod mediator;
pub mod pager;
pub mod snapshot;
pub mod source;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use config::PagingConfig;
pub use location::{Resource, stories_with_location};
pub use mediator::{InitializeAction, LoadOutcome, RemoteMediator};
pub use pager::{FeedClosed, FeedHandle, FeedMode, Pager};
pub use snapshot::{FeedDiff, FeedSnapshot};
pub use source::StoryPagingSource;
pub use state::{LoadState, LoadStates, LoadType, Page, PagingState};

pub use storyfeed_http::{ClientConfig, DEFAULT_API_URL, LoginResult, NewStory, Photo, StoryService};
pub use storyfeed_store::LocalStore;
