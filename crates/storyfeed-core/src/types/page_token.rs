//! Page token type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, InvalidInputError};

/// A 1-based page index used as the cursor into the remote story list.
///
/// # Example
///
/// ```
/// use storyfeed_core::PageToken;
///
/// let first = PageToken::FIRST;
/// assert_eq!(first.prev(), None);
/// assert_eq!(first.next().get(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct PageToken(u32);

impl PageToken {
    /// The first page of the remote list.
    pub const FIRST: PageToken = PageToken(1);

    /// Create a page token, rejecting zero.
    pub fn new(page: u32) -> Result<Self, Error> {
        if page == 0 {
            return Err(InvalidInputError::Other {
                message: "page tokens are 1-based".to_string(),
            }
            .into());
        }
        Ok(Self(page))
    }

    /// Returns the page index.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Returns true for the first page.
    pub fn is_first(self) -> bool {
        self.0 == 1
    }

    /// The page before this one, or `None` on the first page.
    pub fn prev(self) -> Option<PageToken> {
        if self.is_first() {
            None
        } else {
            Some(PageToken(self.0 - 1))
        }
    }

    /// The page after this one.
    pub fn next(self) -> PageToken {
        self.skip(1)
    }

    /// The page `pages` after this one.
    pub fn skip(self, pages: u32) -> PageToken {
        PageToken(self.0.saturating_add(pages))
    }
}

impl fmt::Display for PageToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<u32> for PageToken {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PageToken> for u32 {
    fn from(value: PageToken) -> Self {
        value.0
    }
}
