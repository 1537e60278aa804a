//! Exit code constants for the lockfile-io CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config, not bytes-like input)
//! - 2: Target file not found
//! - 3: I/O failure
//! - 4: Lock acquisition failure

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid config, or a value that is not bytes-like.
pub const USER_ERROR: i32 = 1;

/// The file that was asked for does not exist.
pub const NOT_FOUND: i32 = 2;

/// Reading, writing, or locking failed at the OS level.
pub const IO_FAILURE: i32 = 3;

/// The lock could not be acquired before the configured deadline.
pub const LOCK_FAILURE: i32 = 4;
