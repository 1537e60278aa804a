//! Error types for lockfile-io.
//!
//! Uses thiserror for derive macros. Every variant maps to a process exit
//! code so the CLI can report failures the same way the library surfaces them.

use crate::exit_codes;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Main error type for lockfile-io operations.
#[derive(Error, Debug)]
pub enum LockfileError {
    /// The file to read does not exist.
    ///
    /// Callers that want "create if missing" semantics match on this variant
    /// and treat the contents as empty.
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// A dynamic value could not be interpreted as text, bytes, or a buffer.
    #[error("`contents` is {0}, which is not bytes-like. Cannot get number of bytes.")]
    NotBytesLike(String),

    /// Any other I/O failure, including failures to open or lock the lock file.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The lock could not be acquired before the deadline.
    #[error("timed out after {waited:?} waiting for lock '{}'", .path.display())]
    LockTimeout { path: PathBuf, waited: Duration },

    /// Invalid input or configuration.
    #[error("{0}")]
    UserError(String),
}

impl LockfileError {
    /// Wrap an I/O error with a human-readable context message.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        LockfileError::Io {
            context: context.into(),
            source,
        }
    }

    /// Map an error from reading `path`, promoting `NotFound` to its own variant.
    pub(crate) fn from_read(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            LockfileError::NotFound(path.to_path_buf())
        } else {
            LockfileError::io(format!("failed to read '{}'", path.display()), source)
        }
    }

    /// Returns true if this error means the file was absent.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LockfileError::NotFound(_))
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LockfileError::UserError(_) => exit_codes::USER_ERROR,
            LockfileError::NotBytesLike(_) => exit_codes::USER_ERROR,
            LockfileError::NotFound(_) => exit_codes::NOT_FOUND,
            LockfileError::Io { .. } => exit_codes::IO_FAILURE,
            LockfileError::LockTimeout { .. } => exit_codes::LOCK_FAILURE,
        }
    }
}

/// Result type alias for lockfile-io operations.
pub type Result<T> = std::result::Result<T, LockfileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_error_has_correct_exit_code() {
        let err = LockfileError::NotFound(PathBuf::from("missing.txt"));
        assert_eq!(err.exit_code(), exit_codes::NOT_FOUND);
        assert!(err.is_not_found());
    }

    #[test]
    fn not_bytes_like_error_names_the_value() {
        let err = LockfileError::NotBytesLike("123".to_string());
        assert_eq!(err.exit_code(), exit_codes::USER_ERROR);
        assert_eq!(
            err.to_string(),
            "`contents` is 123, which is not bytes-like. Cannot get number of bytes."
        );
    }

    #[test]
    fn io_error_keeps_context_and_source() {
        let err = LockfileError::io(
            "failed to open lock file 'a.lock'",
            io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        );
        assert_eq!(err.exit_code(), exit_codes::IO_FAILURE);
        assert_eq!(err.to_string(), "failed to open lock file 'a.lock': denied");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn from_read_promotes_not_found() {
        let path = Path::new("nope.txt");
        let err = LockfileError::from_read(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, LockfileError::NotFound(ref p) if p == path));

        let err = LockfileError::from_read(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, LockfileError::Io { .. }));
    }

    #[test]
    fn lock_timeout_has_lock_exit_code() {
        let err = LockfileError::LockTimeout {
            path: PathBuf::from("data.txt.lock"),
            waited: Duration::from_millis(200),
        };
        assert_eq!(err.exit_code(), exit_codes::LOCK_FAILURE);
        assert!(err.to_string().contains("data.txt.lock"));
    }
}
