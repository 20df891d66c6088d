//! HTTP client for the story API.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::Form;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use storyfeed_core::error::{
    DeserializationError, Error, InvalidInputError, NetworkError, ServerError,
};
use storyfeed_core::{AccessToken, ApiUrl, Result};

use crate::endpoints::{Envelope, MessageResponse};

/// The public story API.
pub const DEFAULT_API_URL: &str = "https://story-api.dicoding.dev/v1";

/// Transport settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every endpoint path is joined onto.
    pub base_url: ApiUrl,
    /// Whole-request timeout.
    pub timeout: Duration,
    /// Value of the `User-Agent` header.
    pub user_agent: String,
}

impl ClientConfig {
    /// Default settings against `base_url`.
    pub fn new(base_url: ApiUrl) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            user_agent: concat!("storyfeed/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }

    /// Override the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin wrapper over `reqwest` that knows the story API's envelope.
#[derive(Debug, Clone)]
pub(crate) struct ApiClient {
    client: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    pub(crate) fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|e| NetworkError::Http {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self { client, config })
    }

    pub(crate) fn base_url(&self) -> &ApiUrl {
        &self.config.base_url
    }

    /// GET with query parameters.
    #[instrument(skip(self, token), fields(api = %self.config.base_url))]
    pub(crate) async fn get<Q, R>(
        &self,
        path: &str,
        params: &Q,
        token: Option<&AccessToken>,
    ) -> Result<R>
    where
        Q: Serialize + std::fmt::Debug,
        R: DeserializeOwned + Envelope,
    {
        let url = self.config.base_url.endpoint(path);
        debug!(path, "GET");
        trace!(?params, "query parameters");

        let response = self
            .client
            .get(&url)
            .query(params)
            .headers(auth_headers(token)?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// POST an urlencoded form.
    #[instrument(skip(self, form), fields(api = %self.config.base_url))]
    pub(crate) async fn post_form<B, R>(&self, path: &str, form: &B) -> Result<R>
    where
        B: Serialize,
        R: DeserializeOwned + Envelope,
    {
        let url = self.config.base_url.endpoint(path);
        debug!(path, "POST form");

        let response = self
            .client
            .post(&url)
            .form(form)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// POST a multipart body.
    #[instrument(skip(self, form, token), fields(api = %self.config.base_url))]
    pub(crate) async fn post_multipart<R>(
        &self,
        path: &str,
        form: Form,
        token: Option<&AccessToken>,
    ) -> Result<R>
    where
        R: DeserializeOwned + Envelope,
    {
        let url = self.config.base_url.endpoint(path);
        debug!(path, "POST multipart");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .headers(auth_headers(token)?)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        self.handle_response(response).await
    }

    /// Decode a response, turning non-2xx and `error: true` into `ServerError`.
    async fn handle_response<R>(&self, response: reqwest::Response) -> Result<R>
    where
        R: DeserializeOwned + Envelope,
    {
        let status = response.status();
        trace!(status = %status, "response");

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let message = serde_json::from_slice::<MessageResponse>(&body)
                .ok()
                .map(|b| b.message)
                .filter(|m| !m.is_empty());
            return Err(ServerError::new(status.as_u16(), message).into());
        }

        let decoded: R = serde_json::from_slice(&body).map_err(DeserializationError::from)?;
        if decoded.is_error() {
            let message = Some(decoded.message().to_string()).filter(|m| !m.is_empty());
            return Err(ServerError::new(status.as_u16(), message).into());
        }

        Ok(decoded)
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            NetworkError::Timeout {
                duration_ms: self.config.timeout.as_millis() as u64,
            }
            .into()
        } else if err.is_connect() {
            NetworkError::Connection {
                message: err.to_string(),
            }
            .into()
        } else if err.is_decode() {
            DeserializationError::new(err.to_string()).into()
        } else {
            NetworkError::Http {
                message: err.to_string(),
            }
            .into()
        }
    }
}

/// Bearer header for authenticated requests.
fn auth_headers(token: Option<&AccessToken>) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token.as_str())).map_err(|e| {
            InvalidInputError::Token {
                reason: e.to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}
