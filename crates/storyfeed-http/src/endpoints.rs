//! Story API endpoint paths and request/response types.

use serde::{Deserialize, Serialize};

use storyfeed_core::Result;
use storyfeed_core::error::DeserializationError;
use storyfeed_core::types::{Story, StoryId};

// ============================================================================
// Endpoint Paths
// ============================================================================

pub(crate) const REGISTER: &str = "register";

pub(crate) const LOGIN: &str = "login";

/// Listing (GET) and upload (POST) share this path.
pub(crate) const STORIES: &str = "stories";

// ============================================================================
// Request Types
// ============================================================================

/// Form body for register.
#[derive(Debug, Serialize)]
pub(crate) struct RegisterForm<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Form body for login.
#[derive(Debug, Serialize)]
pub(crate) struct LoginForm<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Query parameters for a paged story listing.
#[derive(Debug, Serialize)]
pub(crate) struct StoriesQuery {
    pub page: u32,
    pub size: u32,
}

/// Query parameters for the location listing.
#[derive(Debug, Serialize)]
pub(crate) struct LocationQuery {
    pub location: u8,
}

// ============================================================================
// Response Types
// ============================================================================

/// Every response carries an error flag and a message.
pub(crate) trait Envelope {
    fn is_error(&self) -> bool;
    fn message(&self) -> &str;
}

/// Response with nothing beyond the envelope (register, upload, errors).
#[derive(Debug, Deserialize)]
pub(crate) struct MessageResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
}

/// Response from login.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub login_result: Option<LoginResultBody>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LoginResultBody {
    pub user_id: String,
    pub name: String,
    pub token: String,
}

/// Response from a story listing.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoriesResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub list_story: Vec<StoryItem>,
}

/// A single story as it appears on the wire.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StoryItem {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
}

impl StoryItem {
    pub(crate) fn into_story(self) -> Result<Story> {
        let id = StoryId::new(self.id).map_err(|e| DeserializationError::new(e.to_string()))?;
        Ok(Story {
            id,
            name: self.name,
            description: self.description,
            photo_url: self.photo_url,
            created_at: self.created_at,
            lat: self.lat,
            lon: self.lon,
        })
    }
}

macro_rules! impl_envelope {
    ($($ty:ty),*) => {
        $(
            impl Envelope for $ty {
                fn is_error(&self) -> bool {
                    self.error
                }

                fn message(&self) -> &str {
                    &self.message
                }
            }
        )*
    };
}

impl_envelope!(MessageResponse, LoginResponse, StoriesResponse);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn stories_response_decodes_wire_shape() {
        let response: StoriesResponse = serde_json::from_value(json!({
            "error": false,
            "message": "Stories fetched successfully",
            "listStory": [{
                "id": "story-FvU4u0Vp2S3PMsFg",
                "name": "Dimas",
                "description": "Lorem Ipsum",
                "photoUrl": "https://story-api.dicoding.dev/images/stories/photos-1641623658595_dummy-pic.png",
                "createdAt": "2022-01-08T06:34:18.598Z",
                "lat": -10.212,
                "lon": -16.002
            }]
        }))
        .unwrap();

        assert!(!response.is_error());
        let story = response
            .list_story
            .into_iter()
            .next()
            .unwrap()
            .into_story()
            .unwrap();
        assert_eq!(story.name, "Dimas");
        assert_eq!(story.lon, Some(-16.002));
    }

    #[test]
    fn blank_story_id_is_a_decode_error() {
        let item = StoryItem {
            id: String::new(),
            name: String::new(),
            description: String::new(),
            photo_url: String::new(),
            created_at: String::new(),
            lat: None,
            lon: None,
        };
        assert!(matches!(
            item.into_story(),
            Err(storyfeed_core::Error::Deserialization(_))
        ));
    }
}
