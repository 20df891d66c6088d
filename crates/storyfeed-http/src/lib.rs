//! storyfeed-http - HTTP client for the story API.
//!
//! [`StoryService`] speaks the story API's JSON endpoints and implements
//! [`StoryApi`](storyfeed_core::StoryApi), so it can be handed straight to
//! the paging engine.

mod client;
mod endpoints;
mod service;

pub use client::{ClientConfig, DEFAULT_API_URL};
pub use service::{LoginResult, NewStory, Photo, StoryService};
