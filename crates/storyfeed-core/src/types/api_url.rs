//! API base URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};

/// A validated base URL of the story API.
///
/// Network URLs must use HTTPS, or HTTP for localhost. A trailing slash on
/// the base path is ignored when building endpoint URLs.
///
/// # Example
///
/// ```
/// use storyfeed_core::ApiUrl;
///
/// let api = ApiUrl::new("https://story-api.dicoding.dev/v1/").unwrap();
/// assert_eq!(api.endpoint("stories"), "https://story-api.dicoding.dev/v1/stories");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApiUrl(Url);

impl ApiUrl {
    /// Parse and validate a base URL.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let s = s.as_ref();
        let invalid = |reason: String| InvalidInputError::ApiUrl {
            value: s.to_string(),
            reason,
        };

        let url = Url::parse(s).map_err(|e| invalid(e.to_string()))?;
        match rejection(&url) {
            Some(reason) => Err(invalid(reason.to_string()).into()),
            None => Ok(Self(url)),
        }
    }

    /// Returns the full URL for an endpoint path relative to the base.
    pub fn endpoint(&self, path: &str) -> String {
        let base = self.0.as_str().trim_end_matches('/');
        format!("{}/{}", base, path.trim_start_matches('/'))
    }

    /// Returns the base URL as a string.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the host string.
    pub fn host(&self) -> Option<&str> {
        self.0.host_str()
    }
}

/// Why `url` cannot serve as the API base, if it cannot.
fn rejection(url: &Url) -> Option<&'static str> {
    if url.cannot_be_a_base() {
        return Some("must be an absolute URL");
    }

    let Some(host) = url.host_str() else {
        return Some("must have a host");
    };

    match url.scheme() {
        "https" => None,
        "http" if matches!(host, "localhost" | "127.0.0.1" | "[::1]") => None,
        _ => Some("must use HTTPS (HTTP allowed only for localhost)"),
    }
}

impl fmt::Display for ApiUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ApiUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl Serialize for ApiUrl {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.0.as_str())
    }
}

impl<'de> Deserialize<'de> for ApiUrl {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ApiUrl::new(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_https_url() {
        let api = ApiUrl::new("https://story-api.dicoding.dev/v1").unwrap();
        assert_eq!(api.host(), Some("story-api.dicoding.dev"));
    }

    #[test]
    fn valid_localhost_http() {
        let api = ApiUrl::new("http://127.0.0.1:8080").unwrap();
        assert_eq!(api.endpoint("/login"), "http://127.0.0.1:8080/login");
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let with = ApiUrl::new("https://story-api.dicoding.dev/v1/").unwrap();
        let without = ApiUrl::new("https://story-api.dicoding.dev/v1").unwrap();
        assert_eq!(with.endpoint("stories"), without.endpoint("stories"));
    }

    #[test]
    fn invalid_http_non_localhost() {
        assert!(ApiUrl::new("http://story-api.dicoding.dev").is_err());
    }

    #[test]
    fn invalid_relative_url() {
        assert!(ApiUrl::new("/v1/stories").is_err());
    }

    #[test]
    fn file_url_rejected() {
        assert!(ApiUrl::new("file:///tmp/stories").is_err());
    }
}
