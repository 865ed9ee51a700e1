//! Custom error types and result handling for book-organizer operations.
//!
//! All fallible operations return a [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`. Classification problems (unsupported
//! extensions, ambiguous covers) are never errors: they are reported as
//! [`SkipReason`](crate::types::SkipReason) or [`Notice`](crate::types::Notice)
//! values instead. Only structural impossibilities surface here.
//!
use std::path::PathBuf;

/// Type alias for Results with book-organizer errors.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for all book-organizer operations.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O errors from the standard library
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Regular expression parsing errors
    #[error(transparent)]
    Regex(#[from] regex::Error),
    /// ZIP file operation errors
    #[error(transparent)]
    Zip(#[from] zip::result::ZipError),
    #[error(transparent)]
    OrganizerBuilder(#[from] crate::organizer::OrganizerConfigBuilderError),
    /// Two plan entries claim the same target name, or one source appears twice.
    /// Fatal to planning: no partial plan is produced.
    #[error("Planning collision on '{target}': claimed by {sources:?}")]
    PlanningCollision {
        target: String,
        sources: Vec<String>,
    },
    /// Error for invalid file or directory paths
    #[error("The given path '{0:?}' is invalid: {1}")]
    InvalidPath(PathBuf, String),
    /// Error for failed asynchronous tasks
    #[error("Asynchronous task failed: {0}")]
    AsyncTaskError(String),
    /// Error for unsupported operations or formats
    #[error("Unsupported: {0}")]
    Unsupported(String),
    /// Error for resources that couldn't be found (e.g., target directory)
    #[error("Not found: {0}")]
    NotFound(String),
    /// Other errors that don't fit into specific categories
    #[error("Other error: {0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(error: String) -> Self {
        Error::Other(error)
    }
}

impl From<&str> for Error {
    fn from(error: &str) -> Self {
        Error::Other(error.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}
