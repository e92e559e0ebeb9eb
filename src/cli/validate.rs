//! Argument checks run before the core is invoked.

use std::path::{Path, PathBuf};

use crate::error::{RapidsError, Result};

/// Directory must exist and contain nothing, at any depth
pub fn empty_directory(path: &Path) -> Result<PathBuf> {
    existing_directory(path)?;
    if !is_empty_dir(path)? {
        return Err(RapidsError::AlreadyExists(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

/// Directory must exist
pub fn existing_directory(path: &Path) -> Result<PathBuf> {
    if !path.is_dir() {
        return Err(RapidsError::NotFound(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

/// File must exist at the source location
pub fn existing_file(path: &Path) -> Result<PathBuf> {
    if !path.is_file() {
        return Err(RapidsError::NotFound(path.to_path_buf()));
    }
    Ok(path.to_path_buf())
}

/// Whether a directory holds no files or subdirectories
pub fn is_empty_dir(path: &Path) -> Result<bool> {
    let mut entries = std::fs::read_dir(path).map_err(RapidsError::io("read directory", path))?;
    Ok(entries.next().is_none())
}
