//! Command implementations for lockfile-io.
//!
//! The dispatcher routes parsed CLI commands to their handlers. Handlers write
//! their output to the given writer so tests can capture it.

use crate::cli::{AppendArgs, CatArgs, Cli, Command, LockInfoArgs, SaveArgs, SizeArgs};
use lockfile_io::bytes::{Payload, num_bytes};
use lockfile_io::config::Config;
use lockfile_io::error::{LockfileError, Result};
use lockfile_io::fs::{SaveMode, load_bytes, save_file, save_to_writer};
use lockfile_io::lock::{LockFile, append_locked};
use std::io::Write;

/// Dispatch a command to its implementation.
pub fn dispatch<W: Write>(cli: Cli, out: &mut W) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Append(args) => cmd_append(args, &config),
        Command::Cat(args) => cmd_cat(args, out),
        Command::Save(args) => cmd_save(args, &config),
        Command::Size(args) => cmd_size(args, out),
        Command::LockInfo(args) => cmd_lock_info(args, out),
    }
}

fn cmd_append(args: AppendArgs, config: &Config) -> Result<()> {
    append_locked(&args.target, &args.block(), config)
}

fn cmd_cat<W: Write>(args: CatArgs, out: &mut W) -> Result<()> {
    let contents = load_bytes(&args.target)?;
    save_to_writer(&contents, out)
}

fn cmd_save(args: SaveArgs, config: &Config) -> Result<()> {
    let mode = if args.append {
        SaveMode::Append
    } else {
        SaveMode::overwrite(config)
    };
    save_file(&args.text, &args.target, mode)
}

fn cmd_size<W: Write>(args: SizeArgs, out: &mut W) -> Result<()> {
    let value: serde_json::Value = serde_json::from_str(&args.value)
        .map_err(|e| LockfileError::UserError(format!("invalid JSON value: {}", e)))?;
    let payload = Payload::from_value(&value)?;

    writeln!(out, "{}", num_bytes(&payload))
        .map_err(|e| LockfileError::io("failed to write output", e))
}

fn cmd_lock_info<W: Write>(args: LockInfoArgs, out: &mut W) -> Result<()> {
    let lock = LockFile::new(&args.target);
    let state = if lock.lock_path().exists() {
        "present"
    } else {
        "absent"
    };

    let mut report = format!("Lock file: {} ({})\n", lock.lock_path().display(), state);
    match lock.last_holder()? {
        Some(meta) => report.push_str(&format!("Last holder: {}\n", meta)),
        None => report.push_str("Last holder: none recorded\n"),
    }
    save_to_writer(&report, out)
}
