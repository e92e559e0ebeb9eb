//! Error types shared by the backends, mutators, and the environment.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Convenience alias used throughout the library
pub type Result<T, E = RapidsError> = std::result::Result<T, E>;

/// Errors raised by the storage and mutation core
#[derive(Debug, Error)]
pub enum RapidsError {
    #[error("Not found: {0}")]
    NotFound(PathBuf),

    #[error("Already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Cannot store file at {path}, a file with hash {hash} already exists in this environment")]
    DuplicateContent { path: PathBuf, hash: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Failed to {operation} {path}: {source}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode MIDI: {0}")]
    Decode(String),

    #[error("Failed to encode MIDI: {0}")]
    Encode(String),
}

impl RapidsError {
    /// Build a `map_err` adapter that tags an I/O error with its operation and path
    pub fn io<'a>(
        operation: &'static str,
        path: &'a Path,
    ) -> impl FnOnce(std::io::Error) -> RapidsError + 'a {
        move |source| RapidsError::Io {
            operation,
            path: path.to_path_buf(),
            source,
        }
    }
}
