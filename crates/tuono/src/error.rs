use std::error::Error as StdError;

use thiserror::Error;
use tuono_router::TreeError;

/// Failure talking to the remote data endpoint
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("data endpoint responded with status {0}")]
    Status(u16),

    #[error("malformed data response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid data endpoint url: {0}")]
    Url(#[from] url::ParseError),
}

/// Misuse of the one-shot server payload handoff
#[derive(Debug, Error)]
pub enum HandoffError {
    #[error("server payload was already published")]
    AlreadyPublished,

    #[error("server payload was never published")]
    NotPublished,

    #[error("server payload was already consumed")]
    AlreadyConsumed,

    #[error("server payload is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Runtime error taxonomy of the client router
#[derive(Debug, Error)]
pub enum RouterError {
    #[error("route configuration error: {0}")]
    Configuration(#[from] TreeError),

    #[error("failed to load data for `{pathname}`")]
    DataFetch {
        pathname: String,
        #[source]
        source: FetchError,
    },

    #[error("invalid navigation target `{target}`")]
    InvalidLocation {
        target: String,
        #[source]
        source: url::ParseError,
    },

    #[error("`{target}` is on another origin")]
    CrossOrigin { target: String },

    #[error(transparent)]
    Handoff(#[from] HandoffError),

    #[error("failed to preload `{route_id}`: {reason}")]
    Preload { route_id: String, reason: String },

    #[error("too many redirects while navigating to `{pathname}`")]
    RedirectLoop { pathname: String },
}

impl RouterError {
    /// Build-time errors, only ever shown to developers
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }

    /// This error followed by each of its sources
    pub fn chain(&self) -> Vec<String> {
        let mut messages = vec![self.to_string()];
        let mut source = self.source();
        while let Some(err) = source {
            messages.push(err.to_string());
            source = err.source();
        }
        messages
    }
}
