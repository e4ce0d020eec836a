use std::error::Error as StdError;

use thiserror::Error;

/// Soloist's crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Soloist's crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
///
/// `Device` and `Recognition` are the two failure classes callers are expected to match on:
/// - `Device` means the audio input became unavailable or was interrupted; it is surfaced
///   to the caller and never retried internally.
/// - `Recognition` means the downstream speech-to-text collaborator could not interpret an
///   isolated recording; the session reports it as a pass outcome rather than failing.
#[derive(Debug, Error)]
pub enum Error {
    #[error("audio input failed: {0}")]
    Device(String),

    #[error("speech recognition failed: {0}")]
    Recognition(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn device(message: impl Into<String>) -> Self {
        Self::Device(message.into())
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<hound::Error> for Error {
    fn from(err: hound::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
