//! # Sink Errors
//!
//! Configuration and remote failure types.

use thiserror::Error;

/// Missing or invalid configuration, detected before any work starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The token variable is not set.
    #[error("API token not found: set {var}")]
    MissingToken {
        /// Environment variable name.
        var: &'static str,
    },

    /// The token variable is set but blank.
    #[error("API token in {var} is empty")]
    EmptyToken {
        /// Environment variable name.
        var: &'static str,
    },

    /// The server URL is not an http(s) URL.
    #[error("invalid server url '{url}'")]
    InvalidServerUrl {
        /// Rejected URL.
        url: String,
    },
}

/// Failure while sending objects or creating a commit.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Transport-level HTTP failure.
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Request URL.
        url: String,
        /// Response body, possibly truncated.
        body: String,
    },

    /// The token was rejected.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The GraphQL API returned errors.
    #[error("graphql error: {0}")]
    GraphQl(String),

    /// The response did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    /// An object could not be serialized.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The sink refused the request.
    #[error("rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// TESTS
// =============================================================================
