//! Owner-only temporary files with guaranteed cleanup
//!
//! Secrets are handed to child processes through files created here, never
//! through argv or the environment. Each file is created under the platform
//! temp directory with a collision-resistant name and mode `0600`, and is
//! owned exclusively by the scope that requested it.

use std::fs;
use std::future::Future;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::{Error, Result};

/// Suffix applied to every temp file created by this module
const SUFFIX: &str = ".json";

/// A temporary file holding sensitive content.
///
/// [`cleanup`](Self::cleanup) is idempotent and treats an already-deleted file
/// as success. Dropping an un-cleaned file removes it on a best-effort basis.
#[derive(Debug)]
pub struct SecureTempFile {
    path: PathBuf,
    removed: bool,
}

impl SecureTempFile {
    /// Create a new temp file containing `content`.
    ///
    /// The file name starts with `prefix` followed by random characters.
    pub fn create(content: &str, prefix: &str) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix).suffix(SUFFIX);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(fs::Permissions::from_mode(0o600));
        }

        let mut named = builder.tempfile().map_err(|source| Error::TempFileWrite {
            path: std::env::temp_dir(),
            source,
        })?;

        // Dropping `named` on any failure below deletes the partial file
        named
            .write_all(content.as_bytes())
            .and_then(|()| named.as_file().sync_all())
            .map_err(|source| Error::TempFileWrite {
                path: named.path().to_path_buf(),
                source,
            })?;

        let (_file, path) = named.keep().map_err(|e| Error::TempFileWrite {
            path: e.file.path().to_path_buf(),
            source: e.error,
        })?;

        tracing::debug!(path = %path.display(), "Created secure temp file");
        Ok(Self {
            path,
            removed: false,
        })
    }

    /// Path of the temp file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Delete the file. Safe to call any number of times.
    pub fn cleanup(&mut self) -> Result<()> {
        if self.removed {
            return Ok(());
        }
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(Error::TempFileCleanup {
                    path: self.path.clone(),
                    source,
                });
            }
        }
        self.removed = true;
        tracing::debug!(path = %self.path.display(), "Removed secure temp file");
        Ok(())
    }
}

impl Drop for SecureTempFile {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            tracing::warn!(error = %e, "Temp file left behind");
        }
    }
}

/// Run `f` with a temp file containing `content`, then remove the file.
///
/// Cleanup runs exactly once whether `f` succeeds or fails. An error from `f`
/// is returned unchanged; a cleanup failure after it is only logged. A cleanup
/// failure after success is returned, since it means secret material is still
/// on disk.
pub fn with_temp_file<T, E, F>(content: &str, prefix: &str, f: F) -> std::result::Result<T, E>
where
    F: FnOnce(&Path) -> std::result::Result<T, E>,
    E: From<Error>,
{
    let mut file = SecureTempFile::create(content, prefix)?;
    let outcome = f(file.path());
    finish(&mut file, outcome)
}

/// Async counterpart of [`with_temp_file`].
///
/// The closure receives an owned path so the returned future does not borrow
/// the guard.
pub async fn with_temp_file_async<T, E, F, Fut>(
    content: &str,
    prefix: &str,
    f: F,
) -> std::result::Result<T, E>
where
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<Error>,
{
    let mut file = SecureTempFile::create(content, prefix)?;
    let outcome = f(file.path().to_path_buf()).await;
    finish(&mut file, outcome)
}

/// [`with_temp_file`] for a serializable value, pretty-printed with
/// two-space indentation.
pub fn with_json_temp_file<S, T, E, F>(value: &S, prefix: &str, f: F) -> std::result::Result<T, E>
where
    S: Serialize + ?Sized,
    F: FnOnce(&Path) -> std::result::Result<T, E>,
    E: From<Error>,
{
    let content = to_pretty_json(value)?;
    with_temp_file(&content, prefix, f)
}

/// [`with_temp_file_async`] for a serializable value.
pub async fn with_json_temp_file_async<S, T, E, F, Fut>(
    value: &S,
    prefix: &str,
    f: F,
) -> std::result::Result<T, E>
where
    S: Serialize + ?Sized,
    F: FnOnce(PathBuf) -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: From<Error>,
{
    let content = to_pretty_json(value)?;
    with_temp_file_async(&content, prefix, f).await
}

fn to_pretty_json<S: Serialize + ?Sized>(value: &S) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| Error::ConfigSerialize {
        path: std::env::temp_dir(),
        format: "JSON".into(),
        message: e.to_string(),
    })
}

fn finish<T, E: From<Error>>(
    file: &mut SecureTempFile,
    outcome: std::result::Result<T, E>,
) -> std::result::Result<T, E> {
    match (outcome, file.cleanup()) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(cleanup_err)) => Err(cleanup_err.into()),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(cleanup_err)) => {
            tracing::warn!(error = %cleanup_err, "Cleanup failed after error; keeping original error");
            Err(err)
        }
    }
}
