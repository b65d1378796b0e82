// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem abstraction consumed by actions.
//!
//! Production code runs against [`OsFilesystem`]; tests inject
//! [`MemFilesystem`] so that side effects (or their absence, on a failed
//! validation) can be asserted without touching the real disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors from filesystem operations.
#[derive(Debug, Error)]
pub enum FsError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("io error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Metadata about a path, as reported by [`Filesystem::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metadata {
    pub is_dir: bool,
    pub is_file: bool,
    pub len: u64,
}

/// The filesystem operations the engine depends on.
///
/// Implementors must make every operation observable independent of the
/// real OS, so that a dry run or a failed validation can be asserted to
/// have produced zero side effects.
pub trait Filesystem: Send + Sync {
    fn stat(&self, path: &Path) -> Result<Metadata, FsError>;
    fn read_to_string(&self, path: &Path) -> Result<String, FsError>;
    fn write(&self, path: &Path, contents: &str, overwrite: bool) -> Result<(), FsError>;
    fn mkdir_all(&self, path: &Path) -> Result<(), FsError>;
    fn remove(&self, path: &Path) -> Result<(), FsError>;
    fn remove_all(&self, path: &Path) -> Result<(), FsError>;
    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError>;
    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError>;

    fn exists(&self, path: &Path) -> bool {
        self.stat(path).is_ok()
    }
}

/// Production filesystem: a thin wrapper over `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsFilesystem;

impl OsFilesystem {
    pub fn new() -> Self {
        Self
    }
}

fn io_err(path: &Path, source: std::io::Error) -> FsError {
    if source.kind() == std::io::ErrorKind::NotFound {
        FsError::NotFound(path.display().to_string())
    } else {
        FsError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

impl Filesystem for OsFilesystem {
    fn stat(&self, path: &Path) -> Result<Metadata, FsError> {
        let meta = std::fs::metadata(path).map_err(|e| io_err(path, e))?;
        Ok(Metadata {
            is_dir: meta.is_dir(),
            is_file: meta.is_file(),
            len: meta.len(),
        })
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        std::fs::read_to_string(path).map_err(|e| io_err(path, e))
    }

    fn write(&self, path: &Path, contents: &str, overwrite: bool) -> Result<(), FsError> {
        if !overwrite && path.exists() {
            return Err(FsError::AlreadyExists(path.display().to_string()));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        std::fs::write(path, contents).map_err(|e| io_err(path, e))
    }

    fn mkdir_all(&self, path: &Path) -> Result<(), FsError> {
        std::fs::create_dir_all(path).map_err(|e| io_err(path, e))
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        if path.is_dir() {
            std::fs::remove_dir(path).map_err(|e| io_err(path, e))
        } else {
            std::fs::remove_file(path).map_err(|e| io_err(path, e))
        }
    }

    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        if path.is_dir() {
            std::fs::remove_dir_all(path).map_err(|e| io_err(path, e))
        } else {
            std::fs::remove_file(path).map_err(|e| io_err(path, e))
        }
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        std::fs::rename(from, to).map_err(|e| io_err(from, e))
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        if from.is_dir() {
            copy_dir_recursive(from, to)
        } else {
            if let Some(parent) = to.parent() {
                std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            std::fs::copy(from, to)
                .map(|_| ())
                .map_err(|e| io_err(from, e))
        }
    }
}

fn copy_dir_recursive(from: &Path, to: &Path) -> Result<(), FsError> {
    std::fs::create_dir_all(to).map_err(|e| io_err(to, e))?;
    for entry in std::fs::read_dir(from).map_err(|e| io_err(from, e))? {
        let entry = entry.map_err(|e| io_err(from, e))?;
        let dest = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir_recursive(&entry.path(), &dest)?;
        } else {
            std::fs::copy(entry.path(), &dest).map_err(|e| io_err(&entry.path(), e))?;
        }
    }
    Ok(())
}

/// In-memory filesystem double for tests.
///
/// Directories are tracked implicitly: a path is "a directory" if any
/// stored file or explicit directory entry begins with it as a prefix.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default, Clone)]
pub struct MemFilesystem {
    inner: std::sync::Arc<std::sync::Mutex<MemState>>,
}

#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Default)]
struct MemState {
    files: HashMap<PathBuf, String>,
    dirs: std::collections::HashSet<PathBuf>,
}

#[cfg(any(test, feature = "test-support"))]
impl MemFilesystem {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a file before the action under test runs.
    pub fn seed_file(&self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.files.insert(path.into(), contents.into());
    }

    /// True if the path was ever written — used by "no side effects" assertions.
    pub fn contains(&self, path: &Path) -> bool {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.files.contains_key(path) || state.dirs.contains(path)
    }

    pub fn read(&self, path: &Path) -> Option<String> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.files.get(path).cloned()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl Filesystem for MemFilesystem {
    fn stat(&self, path: &Path) -> Result<Metadata, FsError> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(contents) = state.files.get(path) {
            return Ok(Metadata {
                is_dir: false,
                is_file: true,
                len: contents.len() as u64,
            });
        }
        if state.dirs.contains(path) {
            return Ok(Metadata {
                is_dir: true,
                is_file: false,
                len: 0,
            });
        }
        Err(FsError::NotFound(path.display().to_string()))
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| FsError::NotFound(path.display().to_string()))
    }

    fn write(&self, path: &Path, contents: &str, overwrite: bool) -> Result<(), FsError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if !overwrite && state.files.contains_key(path) {
            return Err(FsError::AlreadyExists(path.display().to_string()));
        }
        if let Some(parent) = path.parent() {
            state.dirs.insert(parent.to_path_buf());
        }
        state.files.insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    fn mkdir_all(&self, path: &Path) -> Result<(), FsError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        state.dirs.insert(path.to_path_buf());
        Ok(())
    }

    fn remove(&self, path: &Path) -> Result<(), FsError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if state.files.remove(path).is_some() || state.dirs.remove(path) {
            Ok(())
        } else {
            Err(FsError::NotFound(path.display().to_string()))
        }
    }

    fn remove_all(&self, path: &Path) -> Result<(), FsError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let before = state.files.len();
        state.files.retain(|p, _| !p.starts_with(path));
        state.dirs.retain(|p| !p.starts_with(path));
        if before == state.files.len() && !state.dirs.contains(path) {
            // Nothing under `path` existed; treat as a no-op removal of a single entry.
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let contents = state
            .files
            .remove(from)
            .ok_or_else(|| FsError::NotFound(from.display().to_string()))?;
        state.files.insert(to.to_path_buf(), contents);
        Ok(())
    }

    fn copy(&self, from: &Path, to: &Path) -> Result<(), FsError> {
        let mut state = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let contents = state
            .files
            .get(from)
            .cloned()
            .ok_or_else(|| FsError::NotFound(from.display().to_string()))?;
        state.files.insert(to.to_path_buf(), contents);
        Ok(())
    }
}

#[cfg(test)]
#[path = "fs_tests.rs"]
mod tests;
