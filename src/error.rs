//! Error types for periscope.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    // Wrapping variants carry the cause in their message only, so a
    // reported chain names each cause once.
    #[error("failed to get a client: {0}")]
    Connect(Box<Error>),

    #[error("failed to list prowjobs: {0}")]
    List(Box<Error>),

    #[error("failed to persist {id}: {cause}")]
    Persist { id: String, cause: Box<Error> },

    #[error("{operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("worker failed: {0}")]
    Worker(String),

    #[error("errors updating database: {0}")]
    Cycle(CycleErrors),

    #[error("api returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Every per-item failure collected from one polling cycle.
#[derive(Debug)]
pub struct CycleErrors(pub Vec<Error>);

impl CycleErrors {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Error> {
        self.0.iter()
    }
}

impl fmt::Display for CycleErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, err) in self.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{err}")?;
        }
        write!(f, "]")
    }
}
