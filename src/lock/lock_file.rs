//! Lock handle and acquisition.

use super::guard::LockGuard;
use super::metadata::LockMetadata;
use crate::config::Config;
use crate::error::{LockfileError, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Suffix appended to the target path to form the lock file path.
pub const LOCK_SUFFIX: &str = ".lock";

const INITIAL_RETRY_DELAY: Duration = Duration::from_millis(50);
const MAX_RETRY_DELAY: Duration = Duration::from_millis(500);

const METADATA_READ_ATTEMPTS: u32 = 5;
const METADATA_RETRY_DELAY: Duration = Duration::from_millis(5);

/// Lock handle for one target file.
///
/// Creating the handle touches nothing on disk; the lock file appears on the
/// first acquisition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LockFile {
    target: PathBuf,
    lock_path: PathBuf,
}

impl LockFile {
    /// Create a lock handle for `target`, locking through `<target>.lock`.
    pub fn new<P: AsRef<Path>>(target: P) -> Self {
        let target = target.as_ref().to_path_buf();
        let mut lock_path = target.clone().into_os_string();
        lock_path.push(LOCK_SUFFIX);

        Self {
            target,
            lock_path: PathBuf::from(lock_path),
        }
    }

    /// The file this lock protects.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// The companion lock file.
    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    /// Block until the lock is free, then take it.
    ///
    /// `action` is recorded in the lock metadata.
    pub fn lock(&self, action: &str) -> Result<LockGuard> {
        self.lock_blocking(action, true)
    }

    /// Take the lock if nobody holds it.
    ///
    /// Returns `Ok(None)` when another process or thread has it.
    pub fn try_lock(&self, action: &str) -> Result<Option<LockGuard>> {
        let file = self.open()?;
        match FileExt::try_lock_exclusive(&file) {
            Ok(()) => self.finish(file, action, true).map(Some),
            Err(e) if is_contended(&e) => Ok(None),
            Err(e) => Err(self.lock_error(e)),
        }
    }

    /// Wait up to `timeout` for the lock.
    ///
    /// Polls with exponential backoff (50ms doubling, capped at 500ms).
    ///
    /// # Errors
    ///
    /// Returns `LockfileError::LockTimeout` if the lock is still held when the
    /// deadline passes.
    pub fn lock_timeout(&self, action: &str, timeout: Duration) -> Result<LockGuard> {
        self.lock_polling(action, timeout, true)
    }

    /// Acquire according to `config`: block forever or wait up to
    /// `lock_timeout_secs`, writing metadata if `write_lock_metadata` is set.
    pub fn acquire(&self, action: &str, config: &Config) -> Result<LockGuard> {
        match config.lock_timeout() {
            Some(timeout) => self.lock_polling(action, timeout, config.write_lock_metadata),
            None => self.lock_blocking(action, config.write_lock_metadata),
        }
    }

    /// Metadata left in the lock file by its most recent holder.
    ///
    /// Returns `Ok(None)` if the lock has never been taken or the holder did
    /// not record metadata. A read that races a new holder's write is retried.
    pub fn last_holder(&self) -> Result<Option<LockMetadata>> {
        let mut attempt = 1;
        loop {
            let content = match std::fs::read_to_string(&self.lock_path) {
                Ok(content) => content,
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
                Err(e) => return Err(LockfileError::from_read(&self.lock_path, e)),
            };

            if content.trim().is_empty() {
                return Ok(None);
            }
            match LockMetadata::from_json(&content) {
                Err(_) if attempt < METADATA_READ_ATTEMPTS => {
                    attempt += 1;
                    thread::sleep(METADATA_RETRY_DELAY);
                }
                parsed => return parsed.map(Some),
            }
        }
    }

    fn lock_blocking(&self, action: &str, write_metadata: bool) -> Result<LockGuard> {
        let file = self.open()?;
        FileExt::lock_exclusive(&file).map_err(|e| self.lock_error(e))?;
        self.finish(file, action, write_metadata)
    }

    fn lock_polling(
        &self,
        action: &str,
        timeout: Duration,
        write_metadata: bool,
    ) -> Result<LockGuard> {
        // A deadline past the end of representable time means "wait forever".
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.lock_blocking(action, write_metadata);
        };
        let mut retry_delay = INITIAL_RETRY_DELAY;
        let file = self.open()?;

        loop {
            match FileExt::try_lock_exclusive(&file) {
                Ok(()) => return self.finish(file, action, write_metadata),
                Err(e) if is_contended(&e) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(LockfileError::LockTimeout {
                            path: self.lock_path.clone(),
                            waited: timeout,
                        });
                    }
                    tracing::debug!(
                        "Lock {} is held, retrying in {:?}",
                        self.lock_path.display(),
                        retry_delay
                    );
                    thread::sleep(retry_delay.min(deadline - now));
                    retry_delay = (retry_delay * 2).min(MAX_RETRY_DELAY);
                }
                Err(e) => return Err(self.lock_error(e)),
            }
        }
    }

    /// Open (creating if needed) the lock file without truncating it.
    ///
    /// Rewriting the file would clobber the current holder's metadata, so it
    /// only happens after the lock is held.
    fn open(&self) -> Result<File> {
        crate::fs::ensure_parent_dir(&self.lock_path)?;

        OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| {
                LockfileError::io(
                    format!("failed to open lock file '{}'", self.lock_path.display()),
                    e,
                )
            })
    }

    fn finish(&self, file: File, action: &str, write_metadata: bool) -> Result<LockGuard> {
        tracing::debug!("Acquired lock {} ({})", self.lock_path.display(), action);

        if write_metadata && let Err(e) = record_metadata(&file, &LockMetadata::new(action)) {
            tracing::warn!(
                "failed to write lock metadata to '{}': {}",
                self.lock_path.display(),
                e
            );
        }

        Ok(LockGuard::new(file, self.lock_path.clone()))
    }

    fn lock_error(&self, e: io::Error) -> LockfileError {
        LockfileError::io(
            format!("failed to acquire lock '{}'", self.lock_path.display()),
            e,
        )
    }
}

/// Run `f` while holding the lock for `target`.
///
/// The lock is released before this returns, on success, on error, and on
/// panic. An error from `f` takes precedence over an error releasing the lock.
pub fn with_lock<P, T, F>(target: P, action: &str, f: F) -> Result<T>
where
    P: AsRef<Path>,
    F: FnOnce(&LockGuard) -> Result<T>,
{
    let guard = LockFile::new(target).lock(action)?;
    let result = f(&guard);
    let released = guard.release();
    let value = result?;
    released?;
    Ok(value)
}

/// Overwrite the lock file with `metadata`.
///
/// The file is rewritten in place and trimmed afterwards, so it is never
/// empty once a holder has recorded itself.
fn record_metadata(file: &File, metadata: &LockMetadata) -> Result<()> {
    let json = metadata.to_json()?;
    let mut handle = file;
    handle
        .seek(SeekFrom::Start(0))
        .and_then(|_| handle.write_all(json.as_bytes()))
        .and_then(|()| handle.set_len(json.len() as u64))
        .and_then(|()| handle.sync_data())
        .map_err(|e| LockfileError::io("failed to record lock metadata", e))
}

fn is_contended(e: &io::Error) -> bool {
    e.kind() == io::ErrorKind::WouldBlock
        || e.raw_os_error() == fs2::lock_contended_error().raw_os_error()
}
