//! NowDB Client Library
//!
//! HTTP client for the NowDB document service. Every operation is a single
//! form-encoded POST to `<base-url>/<operation>` carrying the stored
//! credentials and collection plus the call's own parameters.

mod client;

pub use client::Client;
pub use nowdb_core::{ClientConfig, DecodePolicy, Operation, ParamValue, Params, Response, SelectOptions};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Connection error: {0}")]
    Connection(#[source] reqwest::Error),

    #[error("Request timeout: {0}")]
    Timeout(#[source] reqwest::Error),

    #[error("Invalid HTTP response: {status} - {message}")]
    Protocol { status: u16, message: String },

    #[error("Malformed HTTP exchange: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("Invalid JSON response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Invalid client configuration: {0}")]
    Config(#[source] reqwest::Error),

    #[error("Invalid base URL {url}: {message}")]
    InvalidBaseUrl { url: String, message: String },
}

/// Failure class of a [`ClientError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Timeout,
    Protocol,
    Decode,
    Config,
}

impl ClientError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Connection(_) => ErrorKind::Connection,
            ClientError::Timeout(_) => ErrorKind::Timeout,
            ClientError::Protocol { .. } | ClientError::Transport(_) => ErrorKind::Protocol,
            ClientError::Decode(_) => ErrorKind::Decode,
            ClientError::Config(_) | ClientError::InvalidBaseUrl { .. } => ErrorKind::Config,
        }
    }

    /// HTTP status for errors raised from a non-success response
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout(err)
        } else if err.is_connect() {
            ClientError::Connection(err)
        } else if err.is_builder() {
            ClientError::Config(err)
        } else {
            ClientError::Transport(err)
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
