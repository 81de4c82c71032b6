use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum OnlineError {
    /// Caller passed a uri, ttl or timeout that cannot be used.
    /// Never cached.
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The HTTP client failed in a way that is neither a transport failure
    /// nor an answer from the server (undecodable response, internal error).
    #[error("probe of {uri} failed: {source}")]
    Probe {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("xdg error: {message}")]
    Xdg { message: String },
}

impl OnlineError {
    pub fn invalid(message: impl Into<String>) -> Self {
        OnlineError::InvalidArgument {
            message: message.into(),
        }
    }

    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, OnlineError::InvalidArgument { .. })
    }
}

pub type Result<T> = std::result::Result<T, OnlineError>;
