//! Error taxonomy shared by the retrieval, tool and reasoning layers.
//!
//! Plumbing failures (I/O, SQLite, HTTP) travel as [`anyhow::Error`] inside
//! [`Error::Other`]. The remaining variants are the outcomes callers have to
//! tell apart: a missing index aborts the request, a malformed tool call is
//! fed back to the reasoning loop, and the iteration cap ends the turn.
//! A retrieval miss is not an error at all.

use std::path::PathBuf;

use thiserror::Error;

use crate::index::types::ContentClass;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no {class} index at {}; run `edutor index build --class {class}` first", path.display())]
    MissingIndex { class: ContentClass, path: PathBuf },

    #[error("index at {} holds {found} content, expected {expected}", path.display())]
    ClassMismatch {
        expected: ContentClass,
        found: String,
        path: PathBuf,
    },

    #[error("malformed tool call: {0}")]
    MalformedToolCall(String),

    #[error("agent stopped after {0} iterations without an answer")]
    IterationLimit(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Whether the reasoning loop can recover by observing this error.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MalformedToolCall(_))
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Self::Other(err.into())
    }
}
