//! Error types for the feed client.

use thiserror::Error;

/// Errors that can occur while streaming from the realtime database.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse an event.
    #[error("Failed to parse event: {0}")]
    Parse(String),

    /// The database rejected the credentials.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for the server.
    #[error("Request timed out")]
    Timeout,

    /// The server cancelled the subscription (e.g. security rules changed).
    #[error("Subscription cancelled by the server")]
    Cancelled,

    /// The auth token expired or was revoked.
    #[error("Authentication revoked by the server")]
    AuthRevoked,

    /// The dashboard stopped listening.
    #[error("Receiver dropped")]
    Closed,
}

impl FeedError {
    /// Whether reconnecting could help.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            FeedError::Auth(_) | FeedError::Cancelled | FeedError::AuthRevoked | FeedError::Closed
        )
    }
}

impl From<reqwest::Error> for FeedError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else if err.is_connect() {
            FeedError::Connection(err.to_string())
        } else {
            FeedError::Http(err.to_string())
        }
    }
}
