//! Configuration model for lockfile-io.
//!
//! This module defines the Config struct read from a YAML file passed with
//! `--config`. It supports forward-compatible YAML parsing (unknown fields are
//! ignored), sensible defaults for optional fields, and validation of config
//! values.

mod model;
mod operations;
mod types;


pub use model::Config;
