//! Cross-process tests: every writer is a separate `lockfile-io` process.

use anyhow::{Context, Result, ensure};
use lockfile_io::exit_codes;
use lockfile_io::lock::LockFile;
use serial_test::serial;
use std::path::Path;
use std::process::{Child, Command, Output};
use tempfile::TempDir;

const NUM_LINES: usize = 10;
const NUM_PROCESSES: usize = 5;

fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_lockfile-io"))
}

fn spawn_appender(target: &Path, writer: usize) -> Result<Child> {
    bin()
        .arg("append")
        .arg(target)
        .arg(format!("{} - writing line", writer))
        .args(["--repeat", &NUM_LINES.to_string(), "--newline"])
        .spawn()
        .with_context(|| format!("failed to spawn appender {}", writer))
}

fn run(args: &[&str]) -> Result<Output> {
    bin()
        .args(args)
        .output()
        .with_context(|| format!("failed to run lockfile-io {:?}", args))
}

/// Every block of `NUM_LINES` lines must come from one writer.
fn assert_contiguous_blocks(contents: &str, writers: usize) -> Result<()> {
    let lines: Vec<&str> = contents.lines().collect();
    ensure!(
        lines.len() == NUM_LINES * writers,
        "expected {} lines, found {}",
        NUM_LINES * writers,
        lines.len()
    );

    for block in lines.chunks(NUM_LINES) {
        let prefix = block[0].split('-').next().unwrap_or_default().trim();
        ensure!(
            block.iter().all(|line| line.starts_with(prefix)),
            "lines from different writers interleaved: {:?}",
            block
        );
    }
    Ok(())
}

#[test]
#[serial]
fn concurrent_processes_append_contiguous_blocks() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let target = temp_dir.path().join("out.txt");

    let children = (0..NUM_PROCESSES)
        .map(|writer| spawn_appender(&target, writer))
        .collect::<Result<Vec<_>>>()?;

    for mut child in children {
        let status = child.wait()?;
        ensure!(status.success(), "appender exited with {}", status);
    }

    let contents = std::fs::read_to_string(&target)?;
    assert_contiguous_blocks(&contents, NUM_PROCESSES)?;

    // The lock file is written next to the target and not removed.
    let lock_path = temp_dir.path().join("out.txt.lock");
    assert!(lock_path.exists());
    assert_eq!(LockFile::new(&target).lock_path(), lock_path);
    Ok(())
}

#[test]
#[serial]
fn append_to_existing_file_keeps_previous_contents() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let target = temp_dir.path().join("out.txt");
    std::fs::write(&target, "header\n")?;

    let children = (0..2)
        .map(|writer| spawn_appender(&target, writer))
        .collect::<Result<Vec<_>>>()?;
    for mut child in children {
        ensure!(child.wait()?.success());
    }

    let contents = std::fs::read_to_string(&target)?;
    let body = contents
        .strip_prefix("header\n")
        .context("header was overwritten")?;
    assert_contiguous_blocks(body, 2)
}

#[test]
#[serial]
fn lock_held_by_another_process_times_out() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let target = temp_dir.path().join("out.txt");
    let config_path = temp_dir.path().join("config.yaml");
    std::fs::write(&config_path, "lock_timeout_secs: 1\n")?;

    let guard = LockFile::new(&target).lock("test-holder")?;
    let output = run(&[
        "--config",
        config_path.to_str().context("non-UTF-8 temp path")?,
        "append",
        target.to_str().context("non-UTF-8 temp path")?,
        "blocked",
    ])?;
    drop(guard);

    assert_eq!(output.status.code(), Some(exit_codes::LOCK_FAILURE));
    assert!(String::from_utf8_lossy(&output.stderr).contains("timed out"));
    assert!(!target.exists());
    Ok(())
}

#[test]
#[serial]
fn waiting_process_proceeds_after_release() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let target = temp_dir.path().join("out.txt");

    let guard = LockFile::new(&target).lock("test-holder")?;
    let mut child = spawn_appender(&target, 0)?;

    std::thread::sleep(std::time::Duration::from_millis(200));
    ensure!(child.try_wait()?.is_none(), "appender ran while the lock was held");

    drop(guard);
    ensure!(child.wait()?.success());
    assert_contiguous_blocks(&std::fs::read_to_string(&target)?, 1)
}

#[test]
fn cat_missing_file_exits_not_found() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let missing = temp_dir.path().join("missing.txt");

    let output = run(&["cat", missing.to_str().context("non-UTF-8 temp path")?])?;

    assert_eq!(output.status.code(), Some(exit_codes::NOT_FOUND));
    assert!(String::from_utf8_lossy(&output.stderr).contains("file not found"));
    assert!(!missing.exists());
    Ok(())
}

#[test]
fn size_of_integer_is_not_bytes_like() -> Result<()> {
    let output = run(&["size", "123"])?;

    assert_eq!(output.status.code(), Some(exit_codes::USER_ERROR));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("123"));
    assert!(stderr.contains("not bytes-like"));
    Ok(())
}

#[test]
fn size_of_text_prints_byte_count() -> Result<()> {
    let output = run(&["size", "\"hello\""])?;

    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout)?, "5\n");
    Ok(())
}
