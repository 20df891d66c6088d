//! Story record and its identifier.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Error, InvalidInputError};

/// A validated story identifier.
///
/// Ids are assigned by the server, are globally unique, and stay stable
/// across fetches.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StoryId(String);

impl StoryId {
    /// Create a story id, rejecting empty or blank strings.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(InvalidInputError::StoryId {
                value: s,
                reason: "cannot be empty".to_string(),
            }
            .into());
        }
        Ok(Self(s))
    }

    /// Returns the id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StoryId {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StoryId> for String {
    fn from(value: StoryId) -> Self {
        value.0
    }
}

impl AsRef<str> for StoryId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A single story as served by the story API.
///
/// Stories are immutable: a later fetch of the same id replaces the cached
/// record as a whole.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Story {
    pub id: StoryId,
    /// Display name of the author.
    pub name: String,
    pub description: String,
    /// URL of the uploaded photo.
    pub photo_url: String,
    /// Creation timestamp, kept exactly as the server formats it.
    pub created_at: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl Story {
    /// Returns the coordinates if the story was posted with a location.
    pub fn location(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}
