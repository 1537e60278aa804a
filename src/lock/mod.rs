//! Cross-process locking of a target file.
//!
//! A target `data.txt` is guarded by the companion lock file `data.txt.lock`.
//! Holding the lock means holding an exclusive OS advisory lock (`flock` on
//! Unix, `LockFileEx` on Windows) on an open handle to that file. Every
//! acquisition opens its own handle, so threads of one process exclude each
//! other just like separate processes do.
//!
//! # Lock Files
//!
//! The lock file is created on first acquisition and is never removed. Its
//! presence says nothing about whether the lock is held; only the OS lock
//! does. Leaving it behind makes every contended target discoverable after
//! the fact.
//!
//! # Lock Metadata
//!
//! After acquiring, the holder overwrites the lock file with JSON metadata
//! (`owner`, `pid`, `created_at`, `action`). The file therefore records the
//! most recent holder. Metadata is informational and never consulted to
//! decide lock state.
//!
//! # RAII Guards
//!
//! Acquisition returns a [`LockGuard`]. Dropping it unlocks, whether the
//! scope ends normally, through `?`, or by unwinding.

mod append;
mod guard;
mod lock_file;
mod metadata;


pub use append::append_locked;
pub use guard::LockGuard;
pub use lock_file::{LOCK_SUFFIX, LockFile, with_lock};
pub use metadata::LockMetadata;
