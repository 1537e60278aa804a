//! CLI argument parsing for lockfile-io.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// lockfile-io: locked read-modify-write of files shared between processes.
///
/// Every target `FILE` is guarded by `FILE.lock`. The lock file is created on
/// first use and left in place so contended files can be found later.
#[derive(Parser, Debug)]
#[command(name = "lockfile-io")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// YAML config file (lock timeout, metadata, atomic writes).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log lock and write activity to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for lockfile-io.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Append text to a file while holding its lock.
    ///
    /// Reads the whole file, appends, and writes it back inside the lock, so
    /// concurrent appenders never interleave. A missing file starts empty.
    Append(AppendArgs),

    /// Print a file's contents.
    Cat(CatArgs),

    /// Write text to a file without taking the lock.
    Save(SaveArgs),

    /// Print the byte length of a JSON value.
    ///
    /// Strings, byte arrays, and `{"buffer": [...]}` objects are bytes-like;
    /// anything else is rejected.
    Size(SizeArgs),

    /// Show the lock file path and its most recent holder.
    LockInfo(LockInfoArgs),
}

/// Arguments for the `append` command.
#[derive(Parser, Debug)]
pub struct AppendArgs {
    /// File to append to.
    pub target: PathBuf,

    /// Text to append.
    pub text: String,

    /// Number of copies of TEXT to append as one block.
    #[arg(long, default_value_t = 1)]
    pub repeat: usize,

    /// Terminate each copy of TEXT with a newline.
    #[arg(long)]
    pub newline: bool,
}

/// Arguments for the `cat` command.
#[derive(Parser, Debug)]
pub struct CatArgs {
    /// File to print.
    pub target: PathBuf,
}

/// Arguments for the `save` command.
#[derive(Parser, Debug)]
pub struct SaveArgs {
    /// File to write.
    pub target: PathBuf,

    /// Text to write.
    pub text: String,

    /// Append instead of replacing the file.
    #[arg(long)]
    pub append: bool,
}

/// Arguments for the `size` command.
#[derive(Parser, Debug)]
pub struct SizeArgs {
    /// JSON value, e.g. '"hello"', '[104, 105]', or '{"buffer": [0, 1]}'.
    pub value: String,
}

/// Arguments for the `lock-info` command.
#[derive(Parser, Debug)]
pub struct LockInfoArgs {
    /// File whose lock to inspect.
    pub target: PathBuf,
}

impl AppendArgs {
    /// The block of text this invocation appends.
    pub fn block(&self) -> String {
        let unit = if self.newline {
            format!("{}\n", self.text)
        } else {
            self.text.clone()
        };
        unit.repeat(self.repeat)
    }
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
