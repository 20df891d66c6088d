//! Remote key type.

use serde::{Deserialize, Serialize};

use super::{PageToken, StoryId};

/// The page markers recorded for a story the last time its page was fetched.
///
/// A remote key exists only while its story is cached; both are written in
/// the same transaction and both are cleared together on refresh.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteKey {
    /// The story this key belongs to.
    pub id: StoryId,
    /// The page before the one that contained the story, if any.
    pub prev_key: Option<PageToken>,
    /// The page after the one that contained the story, if any.
    pub next_key: Option<PageToken>,
}

impl RemoteKey {
    /// Build the key for a story fetched on `page`.
    ///
    /// `prev_key` is `None` on the first page and `next_key` is `None` when
    /// the page came back empty, which marks the end of the remote list.
    pub fn for_page(id: StoryId, page: PageToken, end_of_pagination_reached: bool) -> Self {
        Self {
            id,
            prev_key: page.prev(),
            next_key: if end_of_pagination_reached {
                None
            } else {
                Some(page.next())
            },
        }
    }
}
