//! Core traits: the remote story endpoint and the local feed store.

mod api;
mod store;

pub use api::StoryApi;
pub use store::{FeedStore, StoryStream};
