//! Default values for config fields.

/// Default action recorded in lock metadata.
pub(crate) const DEFAULT_ACTION: &str = "append";

pub(crate) fn default_true() -> bool {
    true
}

pub(crate) fn default_action() -> String {
    DEFAULT_ACTION.to_string()
}
