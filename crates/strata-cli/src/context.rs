//! Project root detection
//!
//! Commands work from any directory below a project, the way git does:
//! the nearest ancestor holding `.strata/config.toml` is the project root.

use std::path::{Path, PathBuf};

use strata_core::config::CONFIG_DIR;

/// Nearest ancestor of `start` (inclusive) with a `.strata/config.toml`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(CONFIG_DIR).join("config.toml").is_file())
        .map(Path::to_path_buf)
}

/// Project root for a command: the explicit `-C` directory, else the
/// detected root, else `cwd` itself.
pub fn project_root(explicit: Option<&Path>, cwd: &Path) -> PathBuf {
    match explicit {
        Some(dir) if dir.is_absolute() => dir.to_path_buf(),
        Some(dir) => cwd.join(dir),
        None => find_project_root(cwd).unwrap_or_else(|| cwd.to_path_buf()),
    }
}
