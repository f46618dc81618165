//! Tool cache for installed relicta binaries.
//!
//! The layout mirrors the GitHub runner tool cache so a cached relicta is
//! shared with anything else on the runner that uses that convention:
//!
//! ```text
//! <root>/
//! └── relicta/
//!     └── v1.4.0/
//!         ├── x86_64/            # extracted release tree
//!         │   └── relicta
//!         └── x86_64.complete    # written after the copy finished
//! ```
//!
//! The root is `RUNNER_TOOL_CACHE` when set, otherwise
//! `<user cache dir>/relicta-action/tools`.
//!
//! The cache is advisory. An entry without its `.complete` marker is ignored,
//! and callers re-check that the binary is really there before trusting a hit.
//! `latest` is a moving target and is never cached.

use crate::constants::LATEST_VERSION;
use crate::platform::HostEnvironment;
use crate::utils::{copy_dir_all, ensure_dir, remove_dir_all};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

const COMPLETE_SUFFIX: &str = "complete";

/// Versioned tool directories under a cache root.
#[derive(Debug, Clone)]
pub struct ToolCache {
    root: PathBuf,
}

impl ToolCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
        }
    }

    /// Cache rooted at `RUNNER_TOOL_CACHE`, or the user cache directory.
    pub fn from_env(env: &dyn HostEnvironment) -> Self {
        let root = env
            .var("RUNNER_TOOL_CACHE")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| {
                dirs::cache_dir()
                    .unwrap_or_else(std::env::temp_dir)
                    .join("relicta-action")
                    .join("tools")
            });
        Self::new(root)
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether `version` may be stored or served.
    #[must_use]
    pub fn is_cacheable(version: &str) -> bool {
        !version.is_empty() && version != LATEST_VERSION
    }

    /// Directory an entry lives in, whether or not it exists.
    #[must_use]
    pub fn entry_dir(&self, tool: &str, version: &str, arch: &str) -> PathBuf {
        self.root.join(tool).join(version).join(arch)
    }

    fn marker(&self, tool: &str, version: &str, arch: &str) -> PathBuf {
        self.root.join(tool).join(version).join(format!("{arch}.{COMPLETE_SUFFIX}"))
    }

    /// Completed cache entry for `(tool, version, arch)`.
    #[must_use]
    pub fn find(&self, tool: &str, version: &str, arch: &str) -> Option<PathBuf> {
        if !Self::is_cacheable(version) {
            return None;
        }

        let dir = self.entry_dir(tool, version, arch);
        if dir.is_dir() && self.marker(tool, version, arch).is_file() {
            debug!("Cache hit for {} {} ({}) at {}", tool, version, arch, dir.display());
            Some(dir)
        } else {
            debug!("Cache miss for {} {} ({})", tool, version, arch);
            None
        }
    }

    /// Copy the tree at `src` into the cache, replacing any previous entry.
    ///
    /// Returns the entry directory. The marker is written last, so an
    /// interrupted copy is never served.
    pub async fn store(&self, src: &Path, tool: &str, version: &str, arch: &str) -> Result<PathBuf> {
        if !Self::is_cacheable(version) {
            anyhow::bail!("Version '{version}' cannot be cached");
        }

        let dest = self.entry_dir(tool, version, arch);
        let marker = self.marker(tool, version, arch);
        let src = src.to_path_buf();

        let copied = dest.clone();
        tokio::task::spawn_blocking(move || -> Result<()> {
            if marker.exists() {
                std::fs::remove_file(&marker)
                    .with_context(|| format!("Failed to remove {}", marker.display()))?;
            }
            remove_dir_all(&copied)?;
            ensure_dir(&copied)?;
            copy_dir_all(&src, &copied)?;
            std::fs::write(&marker, b"")
                .with_context(|| format!("Failed to write {}", marker.display()))?;
            Ok(())
        })
        .await
        .context("Cache store task panicked")??;

        debug!("Cached {} {} ({}) at {}", tool, version, arch, dest.display());
        Ok(dest)
    }
}
