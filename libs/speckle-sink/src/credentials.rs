//! # Credentials and Settings
//!
//! The bearer token comes from the environment; everything else defaults to
//! the constants in `config`.

use crate::error::ConfigError;
use config::constants::{
    API_TOKEN_ENV_VAR, DEFAULT_BRANCH_NAME, DEFAULT_SERVER_URL, DEFAULT_STREAM_ID,
    MAX_BATCH_BYTES, REQUEST_TIMEOUT_SECS, SOURCE_APPLICATION,
};
use std::fmt;
use std::time::Duration;

// =============================================================================
// CREDENTIALS
// =============================================================================

/// A Speckle personal access token.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    token: String,
}

impl Credentials {
    /// Wrap a token, rejecting blank ones.
    pub fn new(token: impl Into<String>) -> Result<Self, ConfigError> {
        let token = token.into();
        if token.trim().is_empty() {
            return Err(ConfigError::EmptyToken {
                var: API_TOKEN_ENV_VAR,
            });
        }
        Ok(Self { token })
    }

    /// Read the token from `SPECKLE_API_TOKEN`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the token through `lookup`, which maps a variable name to its
    /// value.
    ///
    /// ```rust
    /// use speckle_sink::{ConfigError, Credentials};
    ///
    /// let missing = Credentials::from_lookup(|_| None);
    /// assert!(matches!(missing, Err(ConfigError::MissingToken { .. })));
    /// ```
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(API_TOKEN_ENV_VAR) {
            Some(token) => Self::new(token),
            None => Err(ConfigError::MissingToken {
                var: API_TOKEN_ENV_VAR,
            }),
        }
    }

    /// The raw token, for the `Authorization` header.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials").field("token", &"<redacted>").finish()
    }
}

// =============================================================================
// SINK CONFIG
// =============================================================================

/// Where and how a [`ServerSink`](crate::ServerSink) uploads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkConfig {
    /// Server base URL without trailing slash.
    pub server_url: String,
    /// Stream (project) id.
    pub stream_id: String,
    /// Branch (model) name.
    pub branch_name: String,
    /// Application name recorded on commits.
    pub source_application: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Upper bound on one upload batch.
    pub max_batch_bytes: usize,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            stream_id: DEFAULT_STREAM_ID.to_string(),
            branch_name: DEFAULT_BRANCH_NAME.to_string(),
            source_application: SOURCE_APPLICATION.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
            max_batch_bytes: MAX_BATCH_BYTES,
        }
    }
}

impl SinkConfig {
    /// Use another server, normalizing the trailing slash.
    pub fn with_server_url(mut self, url: &str) -> Result<Self, ConfigError> {
        if !(url.starts_with("https://") || url.starts_with("http://")) {
            return Err(ConfigError::InvalidServerUrl {
                url: url.to_string(),
            });
        }
        self.server_url = url.trim_end_matches('/').to_string();
        Ok(self)
    }

    /// Use another stream.
    pub fn with_stream(mut self, stream_id: impl Into<String>) -> Self {
        self.stream_id = stream_id.into();
        self
    }

    /// GraphQL endpoint.
    pub fn graphql_url(&self) -> String {
        format!("{}/graphql", self.server_url)
    }

    /// Endpoint reporting which object ids the server already has.
    pub fn diff_url(&self) -> String {
        format!("{}/api/diff/{}", self.server_url, self.stream_id)
    }

    /// Object upload endpoint.
    pub fn objects_url(&self) -> String {
        format!("{}/objects/{}", self.server_url, self.stream_id)
    }
}

// =============================================================================
// TESTS
// =============================================================================
