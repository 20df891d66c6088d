//! storyfeed-core - Core types and traits for the story feed.
//!
//! This crate holds the data model shared by every other storyfeed crate:
//! the [`Story`] record, per-story [`RemoteKey`] page markers, the unified
//! [`Error`] type, and the two seams the paging engine is written against,
//! [`StoryApi`] (the remote endpoint) and [`FeedStore`] (the transactional
//! local cache).

pub mod cache;
pub mod credentials;
pub mod error;
pub mod tokens;
pub mod traits;
pub mod types;

pub use cache::{FeedTables, RemoteKeyTable, StoryTable};
pub use credentials::Credentials;
pub use error::Error;
pub use tokens::AccessToken;
pub use traits::{FeedStore, StoryApi, StoryStream};
pub use types::{ApiUrl, PageToken, RemoteKey, Story, StoryId};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
