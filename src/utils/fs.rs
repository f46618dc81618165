//! File system helpers for install staging.
//!
//! Each install runs inside a [`WorkDir`] that is removed when dropped, unless
//! the caller decides to [`keep`](WorkDir::keep) it because an installed binary
//! still lives there.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A uniquely named scratch directory that is removed on drop.
#[derive(Debug)]
pub struct WorkDir {
    path: PathBuf,
    keep: bool,
}

impl WorkDir {
    /// Create `<parent>/<prefix>_<uuid>`.
    pub fn new(parent: &Path, prefix: &str) -> Result<Self> {
        let path = parent.join(format!("{}_{}", prefix, uuid::Uuid::new_v4()));
        ensure_dir(&path)?;

        Ok(Self {
            path,
            keep: false,
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Leave the directory on disk after drop.
    pub fn keep(&mut self) {
        self.keep = true;
    }
}

impl Drop for WorkDir {
    fn drop(&mut self) {
        if !self.keep {
            let _ = remove_dir_all(&self.path);
        }
    }
}

/// Create `path` and its parents if missing.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    } else if !path.is_dir() {
        return Err(anyhow::anyhow!("Path exists but is not a directory: {}", path.display()));
    }
    Ok(())
}

/// Remove a directory tree; a missing directory is not an error.
pub fn remove_dir_all(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("Failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Recursively copy `src` into `dst`, preserving file permissions.
///
/// Relative symlinks are recreated on Unix. Any other symlink to a file is
/// replaced by a copy of the file, and the remaining links are skipped.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<()> {
    ensure_dir(dst)?;

    for entry in WalkDir::new(src).min_depth(1).follow_links(false) {
        let entry =
            entry.with_context(|| format!("Failed to read directory: {}", src.display()))?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else if entry.file_type().is_file() {
            fs::copy(entry.path(), &target).with_context(|| {
                format!(
                    "Failed to copy file from {} to {}",
                    entry.path().display(),
                    target.display()
                )
            })?;
        } else if entry.file_type().is_symlink() {
            copy_symlink(entry.path(), &target)?;
        }
    }

    Ok(())
}

fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        let points_to = fs::read_link(link)
            .with_context(|| format!("Failed to read symlink: {}", link.display()))?;
        if points_to.is_relative() {
            std::os::unix::fs::symlink(&points_to, target).with_context(|| {
                format!("Failed to create symlink {} -> {}", target.display(), points_to.display())
            })?;
            return Ok(());
        }
    }

    if link.is_file() {
        fs::copy(link, target).with_context(|| {
            format!("Failed to copy file from {} to {}", link.display(), target.display())
        })?;
    } else {
        debug!("Skipping symlink {}", link.display());
    }

    Ok(())
}

/// Mark `path` as executable (0755). No-op on Windows.
pub fn make_executable(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755))
            .with_context(|| format!("Failed to make {} executable", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = path;

    Ok(())
}
