//! Story API operations.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use tracing::{debug, info, instrument};

use storyfeed_core::error::{DeserializationError, InvalidInputError};
use storyfeed_core::{AccessToken, ApiUrl, Credentials, PageToken, Result, Story, StoryApi};

use crate::client::{ApiClient, ClientConfig};
use crate::endpoints::{
    self, LocationQuery, LoginForm, LoginResponse, MessageResponse, RegisterForm, StoriesQuery,
    StoriesResponse,
};

/// The account returned by a successful login.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user_id: String,
    pub name: String,
    pub token: AccessToken,
}

/// A photo to attach to a new story.
#[derive(Clone)]
pub struct Photo {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Photo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Photo")
            .field("file_name", &self.file_name)
            .field("mime_type", &self.mime_type)
            .field("bytes", &self.bytes.len())
            .finish()
    }
}

/// A story to upload.
#[derive(Debug, Clone)]
pub struct NewStory {
    pub description: String,
    pub photo: Photo,
    pub location: Option<(f64, f64)>,
}

/// Client for the story API.
///
/// Listing stories needs a token; register and login do not. Use
/// [`with_token`](Self::with_token) once a token is known.
///
/// # Example
///
/// ```no_run
/// use storyfeed_core::{ApiUrl, Credentials, PageToken, StoryApi};
/// use storyfeed_http::{ClientConfig, StoryService};
///
/// # async fn example() -> storyfeed_core::Result<()> {
/// let config = ClientConfig::new(ApiUrl::new("https://story-api.dicoding.dev/v1")?);
/// let service = StoryService::new(config)?;
/// let login = service.login(&Credentials::new("me@example.com", "secret123")).await?;
///
/// let service = service.with_token(login.token);
/// let first = service.stories(PageToken::FIRST, 5).await?;
/// println!("{} stories", first.len());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct StoryService {
    client: ApiClient,
    token: Option<AccessToken>,
}

impl StoryService {
    /// Create an unauthenticated service.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            client: ApiClient::new(config)?,
            token: None,
        })
    }

    /// Attach the bearer token sent with story requests.
    pub fn with_token(mut self, token: AccessToken) -> Self {
        self.token = Some(token);
        self
    }

    pub fn api_url(&self) -> &ApiUrl {
        self.client.base_url()
    }

    pub fn token(&self) -> Option<&AccessToken> {
        self.token.as_ref()
    }

    /// Create an account. Returns the server's confirmation message.
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<String> {
        let form = RegisterForm {
            name,
            email,
            password,
        };
        let response: MessageResponse = self.client.post_form(endpoints::REGISTER, &form).await?;

        info!("Registered account");
        Ok(response.message)
    }

    /// Exchange credentials for an access token.
    #[instrument(skip(self, credentials), fields(email = %credentials.email()))]
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResult> {
        let form = LoginForm {
            email: credentials.email(),
            password: credentials.password(),
        };
        let response: LoginResponse = self.client.post_form(endpoints::LOGIN, &form).await?;

        let body = response
            .login_result
            .ok_or_else(|| DeserializationError::new("login response has no loginResult"))?;

        info!(user_id = %body.user_id, "Logged in");
        Ok(LoginResult {
            user_id: body.user_id,
            name: body.name,
            token: AccessToken::new(body.token),
        })
    }

    /// Upload a story with a photo. Returns the server's confirmation message.
    #[instrument(skip(self, story), fields(photo = %story.photo.file_name))]
    pub async fn add_story(&self, story: NewStory) -> Result<String> {
        let photo = Part::bytes(story.photo.bytes)
            .file_name(story.photo.file_name)
            .mime_str(&story.photo.mime_type)
            .map_err(|e| InvalidInputError::Other {
                message: format!("invalid photo mime type: {e}"),
            })?;

        let mut form = Form::new()
            .text("description", story.description)
            .part("photo", photo);
        if let Some((lat, lon)) = story.location {
            form = form.text("lat", lat.to_string()).text("lon", lon.to_string());
        }

        let response: MessageResponse = self
            .client
            .post_multipart(endpoints::STORIES, form, self.token.as_ref())
            .await?;

        info!("Uploaded story");
        Ok(response.message)
    }
}

#[async_trait]
impl StoryApi for StoryService {
    #[instrument(skip(self))]
    async fn stories(&self, page: PageToken, size: u32) -> Result<Vec<Story>> {
        let query = StoriesQuery {
            page: page.get(),
            size,
        };
        let response: StoriesResponse = self
            .client
            .get(endpoints::STORIES, &query, self.token.as_ref())
            .await?;

        let stories = decode_stories(response)?;
        debug!(count = stories.len(), "Fetched story page");
        Ok(stories)
    }

    #[instrument(skip(self))]
    async fn stories_with_location(&self) -> Result<Vec<Story>> {
        let query = LocationQuery { location: 1 };
        let response: StoriesResponse = self
            .client
            .get(endpoints::STORIES, &query, self.token.as_ref())
            .await?;

        let stories = decode_stories(response)?;
        debug!(count = stories.len(), "Fetched stories with location");
        Ok(stories)
    }
}

fn decode_stories(response: StoriesResponse) -> Result<Vec<Story>> {
    response
        .list_story
        .into_iter()
        .map(|item| item.into_story())
        .collect()
}
