//! RAII lock guard implementation.

use crate::error::{LockfileError, Result};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// RAII guard for a held lock.
///
/// When dropped, the OS lock is released. The lock file stays on disk.
/// If unlocking fails during drop, a warning is logged but no panic occurs;
/// closing the handle releases the lock regardless.
#[derive(Debug)]
pub struct LockGuard {
    /// Open handle carrying the OS lock.
    file: File,

    /// Path to the lock file.
    path: PathBuf,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockGuard {
    pub(super) fn new(file: File, path: PathBuf) -> Self {
        Self {
            file,
            path,
            released: false,
        }
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Manually release the lock.
    ///
    /// Useful when the caller wants to release before the guard goes out of
    /// scope and handle errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        FileExt::unlock(&self.file).map_err(|e| {
            LockfileError::io(
                format!("failed to release lock '{}'", self.path.display()),
                e,
            )
        })?;
        tracing::debug!("Released lock {}", self.path.display());
        Ok(())
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        match FileExt::unlock(&self.file) {
            Ok(()) => tracing::debug!("Released lock {}", self.path.display()),
            Err(e) => tracing::warn!(
                "failed to release lock '{}': {} (the handle is closed anyway)",
                self.path.display(),
                e
            ),
        }
    }
}
