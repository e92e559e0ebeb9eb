//! Local filesystem backend.
//!
//! Stores files under `<root>/unprocessed/<sha1>.<ext>` and writes mutation
//! output to `<root>/processed/<filename>`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use sha1::{Digest, Sha1};
use tokio::fs::{self, File, ReadDir};
use tracing::{debug, warn};

use super::{Backend, Entries, RetrievedFile, PROCESSED_DIRECTORY, UNPROCESSED_DIRECTORY};
use crate::error::{RapidsError, Result};

/// Backend rooted at a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalFileBackend {
    /// Root of the environment
    root_path: PathBuf,
}

impl LocalFileBackend {
    /// Create a backend for `root_path`. Nothing is touched on disk until
    /// `initialize` is called.
    pub fn new(root_path: impl Into<PathBuf>) -> Self {
        Self {
            root_path: root_path.into(),
        }
    }

    /// Create `dir` unless a directory is already there
    async fn ensure_area(dir: &Path) -> Result<()> {
        match fs::metadata(dir).await {
            Ok(metadata) if metadata.is_dir() => return Ok(()),
            Ok(_) => return Err(RapidsError::AlreadyExists(dir.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(RapidsError::io("inspect", dir)(e)),
        }

        fs::create_dir(dir)
            .await
            .map_err(RapidsError::io("create directory", dir))?;
        debug!(path = %dir.display(), "Created storage area");

        Ok(())
    }
}

#[async_trait]
impl Backend for LocalFileBackend {
    type Entries = LocalEntries;

    async fn initialize(&self) -> Result<()> {
        Self::ensure_area(&self.processed_path()).await?;
        Self::ensure_area(&self.unprocessed_path()).await?;
        Ok(())
    }

    async fn store(&self, bytes: &[u8], extension: &str) -> Result<PathBuf> {
        validate_component("extension", extension)?;

        let hash = content_hash(bytes);
        let target = self
            .unprocessed_path()
            .join(format!("{}.{}", hash, extension));

        let occupied = fs::try_exists(&target)
            .await
            .map_err(RapidsError::io("inspect", &target))?;

        if occupied {
            let existing = fs::read(&target)
                .await
                .map_err(RapidsError::io("read", &target))?;

            if content_hash(&existing) == hash {
                return Err(RapidsError::DuplicateContent { path: target, hash });
            }

            // Differing content at a hash-derived name means the entry was damaged
            warn!(path = %target.display(), "Replacing stored file whose content no longer matches its hash");
        }

        fs::write(&target, bytes)
            .await
            .map_err(RapidsError::io("write", &target))?;
        debug!(path = %target.display(), size = bytes.len(), "Stored file");

        Ok(target)
    }

    async fn retrieve_all(&self) -> Result<Self::Entries> {
        Ok(LocalEntries::new(self.unprocessed_path()))
    }

    async fn save(&self, bytes: &[u8], filename: &str) -> Result<PathBuf> {
        validate_component("filename", filename)?;

        let target = self.processed_path().join(filename);
        fs::write(&target, bytes)
            .await
            .map_err(RapidsError::io("write", &target))?;
        debug!(path = %target.display(), size = bytes.len(), "Saved processed file");

        Ok(target)
    }

    fn path(&self) -> &Path {
        &self.root_path
    }

    fn processed_path(&self) -> PathBuf {
        self.root_path.join(PROCESSED_DIRECTORY)
    }

    fn unprocessed_path(&self) -> PathBuf {
        self.root_path.join(UNPROCESSED_DIRECTORY)
    }
}

/// Recursive walk over the unprocessed area.
///
/// Directories are read lazily and each file is opened only when it is
/// yielded, so at most one file handle is held by the walk at a time.
pub struct LocalEntries {
    /// Directories discovered but not yet read
    pending: Vec<PathBuf>,

    /// Directory currently being listed
    current: Option<(PathBuf, ReadDir)>,
}

impl LocalEntries {
    fn new(root: PathBuf) -> Self {
        Self {
            pending: vec![root],
            current: None,
        }
    }
}

#[async_trait]
impl Entries for LocalEntries {
    async fn next_entry(&mut self) -> Result<Option<RetrievedFile>> {
        loop {
            if self.current.is_none() {
                match self.pending.pop() {
                    Some(dir) => {
                        let listing = fs::read_dir(&dir)
                            .await
                            .map_err(RapidsError::io("read directory", &dir))?;
                        self.current = Some((dir, listing));
                    }
                    None => return Ok(None),
                }
            }

            let Some((dir, listing)) = self.current.as_mut() else {
                continue;
            };

            let next = listing
                .next_entry()
                .await
                .map_err(RapidsError::io("read directory", dir.as_path()))?;

            let Some(entry) = next else {
                self.current = None;
                continue;
            };

            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(RapidsError::io("inspect", &path))?;

            if file_type.is_dir() {
                self.pending.push(path);
                continue;
            }

            // Follows symlinks, so linked files are yielded too
            let metadata = fs::metadata(&path)
                .await
                .map_err(RapidsError::io("inspect", &path))?;
            if !metadata.is_file() {
                continue;
            }

            // Output names must round-trip through `save`, which takes UTF-8
            let filename = match entry.file_name().into_string() {
                Ok(filename) => filename,
                Err(raw) => {
                    warn!(path = %path.display(), name = ?raw, "Skipping file with a non-UTF-8 name");
                    continue;
                }
            };

            let file = File::open(&path)
                .await
                .map_err(RapidsError::io("open", &path))?;

            return Ok(Some(RetrievedFile {
                reader: Box::new(file),
                filename,
                path,
            }));
        }
    }
}

/// Hex SHA-1 of the full content
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Reject values that would escape the storage area when joined onto a path
fn validate_component(label: &str, value: &str) -> Result<()> {
    if value.is_empty()
        || value == "."
        || value == ".."
        || value.contains('/')
        || value.contains('\\')
    {
        return Err(RapidsError::InvalidArgument(format!(
            "Invalid {}: {:?}",
            label, value
        )));
    }
    Ok(())
}
