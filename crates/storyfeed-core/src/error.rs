//! Error types for storyfeed.
//!
//! One error type covers every failure the paging core can surface. The
//! variants follow where the failure happened: the transport, the server,
//! the response body, or the local store.

use std::fmt;
use thiserror::Error;

/// The unified error type for storyfeed operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout).
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The server answered, but with a failure (non-2xx or `error: true`).
    #[error("server error: {0}")]
    Server(#[from] ServerError),

    /// The response body could not be decoded.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] DeserializationError),

    /// The local store failed to read or commit.
    #[error("local store error: {0}")]
    LocalStore(#[from] StoreError),

    /// Input validation errors (bad URL, bad token, bad config).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true if retrying the same request later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Server(err) => err.status >= 500,
            _ => false,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Any other transport failure.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A failure reported by the server.
#[derive(Debug)]
pub struct ServerError {
    /// HTTP status code.
    pub status: u16,
    /// Message from the response body, if one was present.
    pub message: Option<String>,
}

impl ServerError {
    /// Create a new server error.
    pub fn new(status: u16, message: Option<String>) -> Self {
        Self { status, message }
    }

    /// Check if the server rejected the bearer token.
    pub fn is_auth_error(&self) -> bool {
        self.status == 401 || self.status == 403
    }
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ServerError {}

/// A response body that did not match the expected shape.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct DeserializationError {
    pub message: String,
}

impl DeserializationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for DeserializationError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Local store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Reading or writing the snapshot failed.
    #[error("I/O error: {message}")]
    Io { message: String },

    /// The persisted snapshot could not be parsed.
    #[error("corrupt snapshot at {path}: {message}")]
    Corrupt { path: String, message: String },

    /// A previous writer panicked while holding the store lock.
    #[error("store lock poisoned")]
    Poisoned,

    /// The background commit task did not complete.
    #[error("commit task failed: {message}")]
    Worker { message: String },
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io {
            message: err.to_string(),
        }
    }
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid story id.
    #[error("invalid story id '{value}': {reason}")]
    StoryId { value: String, reason: String },

    /// Token cannot be sent as a header value.
    #[error("invalid access token: {reason}")]
    Token { reason: String },

    /// Invalid paging configuration.
    #[error("invalid paging config: {reason}")]
    PagingConfig { reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
