//! Atomic replace of a file's contents.
//!
//! All atomic writes follow this pattern:
//! 1. Write content to a uniquely named temporary file in the same directory
//! 2. Sync the file to disk (fsync)
//! 3. Rename the temporary file over the target
//!
//! Source and destination share a directory, so the rename never crosses a
//! filesystem. On crash, a temporary file named `.{filename}.XXXXXX.tmp` may
//! remain next to the target.

use crate::error::{LockfileError, Result};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Atomically replace `path` with `content`.
///
/// Readers that open the target see either the old contents or the new
/// contents, never a prefix of the new ones. Concurrent callers each get
/// their own temporary file, so the last rename wins whole.
pub fn atomic_write<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<()> {
    let path = path.as_ref();

    super::ensure_parent_dir(path)?;

    let temp = create_temp_file(path)?;
    let temp = write_and_sync(temp, content)?;
    atomic_replace(temp, path)
}

/// Create a temporary file in the same directory as the target.
fn create_temp_file(target: &Path) -> Result<NamedTempFile> {
    let parent = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let filename = target.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        LockfileError::UserError(format!("invalid file path '{}'", target.display()))
    })?;

    tempfile::Builder::new()
        .prefix(&format!(".{}.", filename))
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| {
            LockfileError::io(
                format!("failed to create temporary file in '{}'", parent.display()),
                e,
            )
        })
}

/// The temporary file is removed on error when `temp` drops.
fn write_and_sync(mut temp: NamedTempFile, content: &[u8]) -> Result<NamedTempFile> {
    let file = temp.as_file_mut();
    let written = file.write_all(content).and_then(|()| file.sync_all());
    if let Err(e) = written {
        return Err(LockfileError::io(
            format!("failed to write temporary file '{}'", temp.path().display()),
            e,
        ));
    }

    Ok(temp)
}

/// Rename `temp` over `target`.
///
/// `persist` replaces an existing destination on both POSIX and Windows.
fn atomic_replace(temp: NamedTempFile, target: &Path) -> Result<()> {
    temp.persist(target).map_err(|e| {
        LockfileError::io(
            format!("failed to atomically replace '{}'", target.display()),
            e.error,
        )
    })?;

    // Persist the directory entry as well. Opening a directory fails on
    // Windows, which skips this step.
    if let Some(parent) = target.parent()
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        atomic_write(&file_path, b"hello world").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "hello world");
    }

    #[test]
    fn test_atomic_write_replace_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");
        fs::write(&file_path, "original content that is longer").unwrap();

        atomic_write(&file_path, b"new content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_atomic_write_creates_parent_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("nested").join("dirs").join("test.txt");

        atomic_write(&file_path, b"nested content").unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "nested content");
    }

    #[test]
    fn test_atomic_write_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("test.txt");

        atomic_write(&file_path, b"content").unwrap();

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected temp files: {:?}", leftovers);
    }

    #[test]
    fn test_create_temp_file_names() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("file.txt");

        let first = create_temp_file(&target).unwrap();
        let second = create_temp_file(&target).unwrap();

        assert_ne!(first.path(), second.path());
        for temp in [&first, &second] {
            let name = temp.path().file_name().unwrap().to_str().unwrap();
            assert_eq!(temp.path().parent().unwrap(), temp_dir.path());
            assert!(name.starts_with(".file.txt."));
            assert!(name.ends_with(".tmp"));
        }
    }

    #[test]
    fn test_atomic_write_concurrent_threads_never_mix() {
        const WRITERS: usize = 8;
        const ROUNDS: usize = 25;

        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("shared.txt");
        let payloads: Vec<Vec<u8>> = (0..WRITERS)
            .map(|i| vec![b'a' + i as u8; 64 * 1024 + i])
            .collect();

        std::thread::scope(|scope| {
            for payload in &payloads {
                let file_path = &file_path;
                scope.spawn(move || {
                    for _ in 0..ROUNDS {
                        atomic_write(file_path, payload).unwrap();
                    }
                });
            }
        });

        let result = fs::read(&file_path).unwrap();
        assert!(payloads.contains(&result), "final contents mix writers");

        let leftovers: Vec<_> = fs::read_dir(temp_dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .filter(|name| name.to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "unexpected temp files: {:?}", leftovers);
    }

    #[test]
    fn test_atomic_write_binary_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("binary.bin");
        let binary_content: Vec<u8> = (0..=255).collect();

        atomic_write(&file_path, &binary_content).unwrap();

        assert_eq!(fs::read(&file_path).unwrap(), binary_content);
    }

    #[test]
    fn test_atomic_write_empty_content() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("empty.txt");

        atomic_write(&file_path, b"").unwrap();

        assert!(fs::read(&file_path).unwrap().is_empty());
    }
}
