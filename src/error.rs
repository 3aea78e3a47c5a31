use std::{io, sync::Arc};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by chunks and cursors.
///
/// End-of-data is never an error: `Cursor::seek` reports it as `Ok(None)`
/// and `Cursor::read` as a short result.
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// The byte source reported a failure while a chunk was attached to it.
    ///
    /// Every observer of the same link receives the same `Arc`.
    #[error("byte source failed: {0}")]
    Source(#[source] Arc<io::Error>),
    /// A seek or read was asked to move by a negative amount.
    #[error("byte amount must not be negative, got {0}")]
    NegativeAmount(i64),
    /// A size expression such as `"4mb"` could not be parsed.
    #[error("invalid size expression: {0:?}")]
    InvalidSize(String),
}

impl Error {
    /// Returns `true` for errors caused by caller misuse rather than by the source.
    pub fn is_precondition(&self) -> bool {
        matches!(self, Error::NegativeAmount(_) | Error::InvalidSize(_))
    }

    /// The underlying source failure, if this is one.
    pub fn source_error(&self) -> Option<&Arc<io::Error>> {
        match self {
            Error::Source(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Source(Arc::new(e))
    }
}
