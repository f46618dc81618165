//! Installation of relicta and its plugins.
//!
//! [`Installer`] composes platform detection, artifact resolution, the
//! fetch-verify-extract pipeline and the tool cache into a binary path that is
//! ready to execute.
//!
//! # Main binary
//!
//! 1. Detect the platform (unsupported hosts fail before any download)
//! 2. Serve a completed cache entry if it really contains the binary
//! 3. Otherwise download, verify and extract into a fresh work directory
//! 4. Locate the binary, mark it executable, and copy the tree into the cache
//!
//! When caching fails the binary is used from the work directory, which is then
//! kept on disk instead of being cleaned up.
//!
//! # Plugins
//!
//! relicta loads plugins from a `plugins/` directory next to its binary. The
//! binary is copied into a per-run directory first, so cache entries stay
//! pristine, and plugins are installed beside the copy one at a time as
//! `relicta-<name>`. A failing plugin never fails the install; it is reported
//! in [`PluginInstallReport`] and logged as a warning.

mod plugins;

#[cfg(test)]
mod tests;

pub use plugins::PluginInstallReport;

use crate::cache::ToolCache;
use crate::constants::TOOL_NAME;
use crate::core::ActionError;
use crate::download::{Downloader, fetch_verify_extract, locate_binary};
use crate::platform::{HostEnvironment, Platform};
use crate::release::ArtifactResolver;
use crate::utils::{WorkDir, make_executable};
use anyhow::Result;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Installs relicta and plugins for the host platform.
pub struct Installer {
    env: Arc<dyn HostEnvironment>,
    downloader: Arc<dyn Downloader>,
    resolver: ArtifactResolver,
    cache: ToolCache,
    work_root: PathBuf,
}

impl Installer {
    /// Installer with the default release host, the environment's tool cache
    /// and work directories under `RUNNER_TEMP` (or the system temp dir).
    pub fn new(env: Arc<dyn HostEnvironment>, downloader: Arc<dyn Downloader>) -> Self {
        let cache = ToolCache::from_env(env.as_ref());
        let work_root = env
            .var("RUNNER_TEMP")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(std::env::temp_dir);

        Self {
            env,
            downloader,
            resolver: ArtifactResolver::default(),
            cache,
            work_root,
        }
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: ArtifactResolver) -> Self {
        self.resolver = resolver;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: ToolCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_work_root(mut self, work_root: impl Into<PathBuf>) -> Self {
        self.work_root = work_root.into();
        self
    }

    #[must_use]
    pub fn cache(&self) -> &ToolCache {
        &self.cache
    }

    /// Detect the host platform.
    pub fn platform(&self) -> Result<Platform, ActionError> {
        Platform::detect(self.env.as_ref())
    }

    /// Install relicta `version` and return the path of its executable.
    pub async fn install_main(&self, version: &str) -> Result<PathBuf> {
        let platform = self.platform()?;
        let binary_name = platform.binary_name(TOOL_NAME);
        let arch = platform.arch.as_str();

        if let Some(dir) = self.cache.find(TOOL_NAME, version, arch) {
            if let Some(binary) = locate_binary(&dir, TOOL_NAME, &binary_name) {
                info!("Using cached {} {} from {}", TOOL_NAME, version, dir.display());
                return Ok(binary);
            }
            warn!("Cached binary not found in {}, re-downloading", dir.display());
        }

        info!("Installing {} {} for {}", TOOL_NAME, version, platform);
        let info = self.resolver.main_download(version, &platform);

        let mut work = WorkDir::new(&self.work_root, TOOL_NAME)?;
        let extracted = fetch_verify_extract(self.downloader.as_ref(), &info, work.path()).await?;

        let binary = locate_binary(&extracted, TOOL_NAME, &binary_name).ok_or_else(|| {
            ActionError::BinaryNotFound {
                name: binary_name.clone(),
                path: extracted.display().to_string(),
            }
        })?;
        make_executable(&binary)?;

        if let Some(cached) = self.cache_install(&extracted, &binary, version, arch).await {
            return Ok(cached);
        }

        // The binary is served from the work directory, so it must outlive us
        work.keep();
        info!("✓ {} installed to {}", TOOL_NAME, binary.display());
        Ok(binary)
    }

    /// Copy an extracted tree into the cache and return the cached binary.
    async fn cache_install(
        &self,
        extracted: &Path,
        binary: &Path,
        version: &str,
        arch: &str,
    ) -> Option<PathBuf> {
        if !ToolCache::is_cacheable(version) {
            debug!("Not caching {} {}", TOOL_NAME, version);
            return None;
        }

        let entry = match self.cache.store(extracted, TOOL_NAME, version, arch).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Failed to cache {} {}: {:#}", TOOL_NAME, version, e);
                return None;
            }
        };

        let cached = entry.join(binary.strip_prefix(extracted).ok()?);
        if !cached.is_file() {
            warn!("{} is missing from the cache entry, using the download directly", cached.display());
            return None;
        }
        info!("✓ {} {} cached at {}", TOOL_NAME, version, entry.display());
        Some(cached)
    }
}
