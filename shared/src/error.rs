//! Error types for the event links Lambda.

use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while updating the event links document.
#[derive(Error, Debug)]
pub enum Error {
    /// Inbound payload is not JSON or has no `days` array
    #[error("Invalid request body: {0}")]
    MalformedRequest(String),

    /// Reading the stored document failed
    #[error("GitHub GET failed: {detail}")]
    RemoteRead {
        /// HTTP status, when the remote answered at all
        status: Option<u16>,
        detail: String,
    },

    /// Writing the document back was rejected or never arrived
    #[error("GitHub PUT failed: {body}")]
    RemoteWrite {
        /// HTTP status, when the remote answered at all
        status: Option<u16>,
        body: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Secrets Manager error
    #[error("Secrets error: {0}")]
    Secrets(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// A read that got a non-success status back.
    pub fn read_status(status: u16) -> Self {
        Error::RemoteRead {
            status: Some(status),
            detail: status.to_string(),
        }
    }

    /// HTTP status reported by the remote store, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Error::RemoteRead { status, .. } | Error::RemoteWrite { status, .. } => *status,
            _ => None,
        }
    }
}
