//! Config struct definition and default implementation.

use super::types::*;
use serde::{Deserialize, Serialize};

/// Configuration for locked file access.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Lock settings
    // =========================================================================
    /// Seconds to wait for the lock before giving up.
    ///
    /// `None` blocks until the lock is free.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lock_timeout_secs: Option<u64>,

    /// Whether the holder records its metadata in the lock file.
    #[serde(default = "default_true")]
    pub write_lock_metadata: bool,

    /// Action name recorded in lock metadata.
    #[serde(default = "default_action")]
    pub action: String,

    // =========================================================================
    // Write settings
    // =========================================================================
    /// Whether overwrites go through a temp file and rename.
    #[serde(default = "default_true")]
    pub atomic_writes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_timeout_secs: None,
            write_lock_metadata: default_true(),
            action: default_action(),
            atomic_writes: default_true(),
        }
    }
}
