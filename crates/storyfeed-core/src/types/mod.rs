//! Core storyfeed types.
//!
//! These types enforce their invariants at construction time, so a story
//! id is never empty and a page token is never zero.

mod api_url;
mod page_token;
mod remote_key;
mod story;

pub use api_url::ApiUrl;
pub use page_token::PageToken;
pub use remote_key::RemoteKey;
pub use story::{Story, StoryId};
