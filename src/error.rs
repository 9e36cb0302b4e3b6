use std::error::Error as StdError;

use thiserror::Error;

/// The crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// The crate-wide error type.
///
/// Malformed sync strings, footnote markup and caption tracks never surface here;
/// those degrade to empty or partial output. Only contract violations and I/O or
/// document-level failures are reported.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Message(String),

    /// Sync pairs must be strictly increasing by line and non-decreasing by seconds.
    #[error(
        "sync pair {index} ({line}, {seconds}s) is out of order after ({prev_line}, {prev_seconds}s)"
    )]
    UnorderedSync {
        index: usize,
        line: usize,
        seconds: u64,
        prev_line: usize,
        prev_seconds: u64,
    },

    /// A non-empty sync map must start at line 0, second 0.
    #[error("sync map must start at (0, 0), found ({line}, {seconds}s)")]
    MissingSyncOrigin { line: usize, seconds: u64 },

    #[error("index point {ordinal} has a negative time ({value})")]
    NegativeTime { ordinal: usize, value: String },

    #[error("invalid record: {0}")]
    InvalidRecord(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
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

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
