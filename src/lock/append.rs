//! Locked read-modify-append.

use super::lock_file::LockFile;
use crate::bytes::ByteBuffer;
use crate::config::Config;
use crate::error::{LockfileError, Result};
use crate::fs::{SaveMode, load_bytes, save_file};
use std::path::Path;

/// Append `payload` to `target` while holding its lock.
///
/// The whole file is read, extended, and written back inside the scope, so
/// concurrent writers each land as one contiguous block. A missing target is
/// treated as empty and created by the first writer.
pub fn append_locked<P, B>(target: P, payload: &B, config: &Config) -> Result<()>
where
    P: AsRef<Path>,
    B: ByteBuffer + ?Sized,
{
    let target = target.as_ref();
    let guard = LockFile::new(target).acquire(&config.action, config)?;

    let mut contents = match load_bytes(target) {
        Ok(contents) => contents,
        Err(LockfileError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e),
    };
    contents.extend_from_slice(payload.as_bytes());
    save_file(&contents, target, SaveMode::overwrite(config))?;

    guard.release()
}
