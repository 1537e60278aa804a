//! Filesystem helpers used inside a locked scope.
//!
//! Loading never creates the file: a missing target surfaces as
//! [`LockfileError::NotFound`](crate::error::LockfileError::NotFound) and the
//! caller decides whether absence means "empty".

pub mod atomic;
mod io;

pub use atomic::atomic_write;
pub use io::{SaveMode, load_bytes, load_text, save_file, save_to_writer};

use crate::error::{LockfileError, Result};
use std::path::Path;

/// Create the parent directory of `path` if it does not exist yet.
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| {
            LockfileError::io(
                format!("failed to create parent directory '{}'", parent.display()),
                e,
            )
        })?;
    }
    Ok(())
}
