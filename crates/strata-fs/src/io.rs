//! Atomic I/O operations with file locking

use std::fs;
use std::io::Write;
use std::path::Path;

use fs2::FileExt;

use crate::{Error, Result};

/// Write content atomically to a file with locking.
///
/// Writes to a uniquely named sibling temp file, syncs, then renames over
/// the target so readers never observe a partial write.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(parent) => {
            fs::create_dir_all(parent).map_err(|e| Error::io("create_dir", parent, e))?;
            parent
        }
        None => Path::new("."),
    };

    // Same directory keeps the rename on one filesystem
    let prefix = format!(
        ".{}.",
        path.file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_default()
    );
    let mut temp_file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".tmp")
        .tempfile_in(parent)
        .map_err(|e| Error::io("create_temp", parent, e))?;

    temp_file
        .as_file()
        .lock_exclusive()
        .map_err(|_| Error::LockFailed {
            path: path.to_path_buf(),
        })?;

    temp_file
        .write_all(content)
        .map_err(|e| Error::io("write", temp_file.path(), e))?;
    temp_file
        .as_file()
        .sync_all()
        .map_err(|e| Error::io("sync", temp_file.path(), e))?;

    FileExt::unlock(temp_file.as_file()).map_err(|_| Error::LockFailed {
        path: path.to_path_buf(),
    })?;

    temp_file
        .persist(path)
        .map_err(|e| Error::io("rename", path, e.error))?;

    Ok(())
}

/// Read text content from a file.
///
/// A missing file is reported as [`Error::FileNotFound`] rather than a bare
/// I/O error so callers can match on it.
pub fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => Error::io("read", path, e),
    })
}

/// Write text content to a file atomically.
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}
