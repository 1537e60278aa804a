//! Load and save helpers.

use crate::bytes::{ByteBuffer, format_bytes};
use crate::config::Config;
use crate::error::{LockfileError, Result};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// How [`save_file`] writes to its destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveMode {
    /// Replace the file through a temp file and rename.
    #[default]
    Atomic,
    /// Truncate the file in place and write.
    Truncate,
    /// Append to the end of the file, creating it if needed.
    Append,
}

impl SaveMode {
    /// The overwrite mode selected by `config.atomic_writes`.
    pub fn overwrite(config: &Config) -> Self {
        if config.atomic_writes {
            SaveMode::Atomic
        } else {
            SaveMode::Truncate
        }
    }
}

/// Read the full contents of `path` as UTF-8 text.
///
/// # Errors
///
/// * `LockfileError::NotFound` - the file does not exist
/// * `LockfileError::UserError` - the contents are not valid UTF-8
pub fn load_text<P: AsRef<Path>>(path: P) -> Result<String> {
    let path = path.as_ref();
    let bytes = load_bytes(path)?;
    String::from_utf8(bytes).map_err(|e| {
        LockfileError::UserError(format!(
            "'{}' is not valid UTF-8 text: {}",
            path.display(),
            e
        ))
    })
}

/// Read the full contents of `path` as bytes.
pub fn load_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| LockfileError::from_read(path, e))?;
    tracing::debug!("Loaded {} from {}", format_bytes(bytes.len()), path.display());
    Ok(bytes)
}

/// Write `contents` to `path`.
///
/// Parent directories are created as needed.
pub fn save_file<B, P>(contents: &B, path: P, mode: SaveMode) -> Result<()>
where
    B: ByteBuffer + ?Sized,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let bytes = contents.as_bytes();

    match mode {
        SaveMode::Atomic => super::atomic_write(path, bytes)?,
        SaveMode::Truncate | SaveMode::Append => {
            super::ensure_parent_dir(path)?;
            let mut file = OpenOptions::new()
                .create(true)
                .write(true)
                .truncate(mode == SaveMode::Truncate)
                .append(mode == SaveMode::Append)
                .open(path)
                .map_err(|e| {
                    LockfileError::io(format!("failed to open '{}'", path.display()), e)
                })?;
            file.write_all(bytes).map_err(|e| {
                LockfileError::io(format!("failed to write '{}'", path.display()), e)
            })?;
        }
    }

    tracing::debug!("Wrote {} to {}", format_bytes(bytes.len()), path.display());
    Ok(())
}

/// Write `contents` to an already-open destination and flush it.
pub fn save_to_writer<B, W>(contents: &B, writer: &mut W) -> Result<()>
where
    B: ByteBuffer + ?Sized,
    W: Write + ?Sized,
{
    writer
        .write_all(contents.as_bytes())
        .and_then(|()| writer.flush())
        .map_err(|e| LockfileError::io("failed to write to destination", e))?;

    tracing::debug!("Wrote {} to writer", format_bytes(contents.num_bytes()));
    Ok(())
}
