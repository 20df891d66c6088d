//! Load requests, load states and the paging state handed to loaders.

use std::fmt;
use std::sync::Arc;

use storyfeed_core::{Error, PageToken, Story};

/// The direction a feed is extended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoadType {
    /// Discard everything and reload around the anchor.
    Refresh,
    /// Load the page before the first loaded story.
    Prepend,
    /// Load the page after the last loaded story.
    Append,
}

impl fmt::Display for LoadType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadType::Refresh => "refresh",
            LoadType::Prepend => "prepend",
            LoadType::Append => "append",
        };
        f.write_str(name)
    }
}

/// State of one load boundary.
#[derive(Debug, Clone)]
pub enum LoadState {
    /// A load for this boundary is in flight.
    Loading,
    /// Idle. `end_of_pagination_reached` means there is nothing more in
    /// this direction until the next refresh.
    Loaded { end_of_pagination_reached: bool },
    /// The last load for this boundary failed.
    Error(Arc<Error>),
}

impl LoadState {
    pub const IDLE: LoadState = LoadState::Loaded {
        end_of_pagination_reached: false,
    };

    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, LoadState::Error(_))
    }

    pub fn end_of_pagination_reached(&self) -> bool {
        matches!(
            self,
            LoadState::Loaded {
                end_of_pagination_reached: true
            }
        )
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            LoadState::Error(cause) => Some(cause),
            _ => None,
        }
    }
}

impl Default for LoadState {
    fn default() -> Self {
        Self::IDLE
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadState::Loading => f.write_str("loading"),
            LoadState::Loaded {
                end_of_pagination_reached: true,
            } => f.write_str("end"),
            LoadState::Loaded { .. } => f.write_str("idle"),
            LoadState::Error(cause) => write!(f, "error: {cause}"),
        }
    }
}

/// Load state of every boundary of a feed.
#[derive(Debug, Clone, Default)]
pub struct LoadStates {
    pub refresh: LoadState,
    pub prepend: LoadState,
    pub append: LoadState,
}

impl LoadStates {
    pub fn get(&self, load_type: LoadType) -> &LoadState {
        match load_type {
            LoadType::Refresh => &self.refresh,
            LoadType::Prepend => &self.prepend,
            LoadType::Append => &self.append,
        }
    }

    pub(crate) fn set(&mut self, load_type: LoadType, state: LoadState) {
        match load_type {
            LoadType::Refresh => self.refresh = state,
            LoadType::Prepend => self.prepend = state,
            LoadType::Append => self.append = state,
        }
    }

    /// True while any boundary is loading.
    pub fn is_loading(&self) -> bool {
        self.refresh.is_loading() || self.prepend.is_loading() || self.append.is_loading()
    }
}

/// One fetched page and the tokens of its neighbours.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Story>,
    pub prev_key: Option<PageToken>,
    pub next_key: Option<PageToken>,
}

impl Page {
    /// Tokens for `items` fetched from `page`.
    ///
    /// The first page has no previous page; an empty page has no next.
    pub fn fetched(page: PageToken, items: Vec<Story>) -> Self {
        Self::spanning(page, 1, items)
    }

    /// Tokens for `items` covering `pages` pages starting at `first`.
    pub fn spanning(first: PageToken, pages: u32, items: Vec<Story>) -> Self {
        let next_key = if items.is_empty() {
            None
        } else {
            Some(first.skip(pages))
        };
        Self {
            items,
            prev_key: first.prev(),
            next_key,
        }
    }
}

/// The pages a feed currently holds and where the reader is.
#[derive(Debug, Clone, Default)]
pub struct PagingState {
    pub pages: Vec<Page>,
    /// Index of the item closest to the reader, across all pages.
    pub anchor_position: Option<usize>,
}

impl PagingState {
    pub fn new(pages: Vec<Page>, anchor_position: Option<usize>) -> Self {
        Self {
            pages,
            anchor_position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pages.iter().all(|page| page.items.is_empty())
    }

    /// The page holding `position`, or the last page if it lies past the end.
    pub fn closest_page_to_position(&self, position: usize) -> Option<&Page> {
        let mut start = 0;
        for page in &self.pages {
            let end = start + page.items.len();
            if position < end {
                return Some(page);
            }
            start = end;
        }
        self.pages.last()
    }

    /// The item at `position`, clamped to the loaded range.
    pub fn closest_item_to_position(&self, position: usize) -> Option<&Story> {
        let total: usize = self.pages.iter().map(|page| page.items.len()).sum();
        if total == 0 {
            return None;
        }
        let mut position = position.min(total - 1);
        for page in &self.pages {
            if position < page.items.len() {
                return page.items.get(position);
            }
            position -= page.items.len();
        }
        None
    }

    pub fn first_item_or_none(&self) -> Option<&Story> {
        self.pages.iter().find_map(|page| page.items.first())
    }

    pub fn last_item_or_none(&self) -> Option<&Story> {
        self.pages.iter().rev().find_map(|page| page.items.last())
    }
}
