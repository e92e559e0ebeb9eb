//! Storage backends for stored MIDI files.
//!
//! A backend owns a subtree with two areas: `unprocessed/` for content that
//! has been stored but not yet mutated, and `processed/` for mutation output.
//!
//! # Storage Layout
//!
//! ```text
//! <root>/
//! ├── unprocessed/
//! │   └── <sha1>.mid        # content-addressed, written by `store`
//! └── processed/
//!     └── <sha1>.mid        # same filename, written by `save`
//! ```

pub mod local;

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::io::AsyncRead;

use crate::error::Result;

pub use local::{LocalFileBackend, LocalEntries};

/// Name of the area holding mutation output
pub const PROCESSED_DIRECTORY: &str = "processed";

/// Name of the area holding stored, not yet mutated files
pub const UNPROCESSED_DIRECTORY: &str = "unprocessed";

/// Extension used when the caller does not supply one
pub const DEFAULT_EXTENSION: &str = "mid";

/// One file yielded while walking the unprocessed area
pub struct RetrievedFile {
    /// Open byte stream over the file's content
    pub reader: Box<dyn AsyncRead + Send + Unpin>,

    /// File name, without any subdirectory of the unprocessed area
    pub filename: String,

    /// Full path the reader was opened from
    pub path: PathBuf,
}

impl std::fmt::Debug for RetrievedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievedFile")
            .field("filename", &self.filename)
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// Lazy sequence of unprocessed files, opened one at a time
#[async_trait]
pub trait Entries: Send {
    /// Open and return the next file, or `None` once the walk is exhausted
    async fn next_entry(&mut self) -> Result<Option<RetrievedFile>>;
}

/// Trait for storage backends
#[async_trait]
pub trait Backend: Send + Sync {
    /// Sequence type produced by `retrieve_all`
    type Entries: Entries;

    /// Create the processed and unprocessed areas if they are missing
    async fn initialize(&self) -> Result<()>;

    /// Store content under its hash in the unprocessed area
    async fn store(&self, bytes: &[u8], extension: &str) -> Result<PathBuf>;

    /// Start a fresh walk over the unprocessed area
    async fn retrieve_all(&self) -> Result<Self::Entries>;

    /// Write mutated content into the processed area under `filename`
    async fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf>;

    /// Root of the backend's subtree
    fn path(&self) -> &Path;

    /// Location of the processed area
    fn processed_path(&self) -> PathBuf;

    /// Location of the unprocessed area
    fn unprocessed_path(&self) -> PathBuf;
}
