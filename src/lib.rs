//! lockfile-io: cross-process locked read-modify-write of files.
//!
//! A target file is guarded by a companion `<target>.lock` carrying an OS
//! advisory lock. The [`lock`] module provides scoped acquisition, the [`fs`]
//! module the load/save helpers used inside the scope, and [`bytes`] the
//! byte-length computation over the buffer shapes those helpers accept.
//!
//! ```no_run
//! use lockfile_io::config::Config;
//! use lockfile_io::lock::append_locked;
//!
//! append_locked("results.txt", "run 7 finished\n", &Config::default())?;
//! # Ok::<(), lockfile_io::error::LockfileError>(())
//! ```

pub mod bytes;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod lock;
