use super::Installer;
use crate::constants::{PLUGIN_BINARY_PREFIX, PLUGINS_DIR_NAME, RUN_DIR_PREFIX};
use crate::core::ActionError;
use crate::download::{fetch_verify_extract, locate_plugin_binary};
use crate::platform::Platform;
use crate::utils::{WorkDir, ensure_dir, make_executable};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Outcome of installing a list of plugins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginInstallReport {
    /// Plugins copied into the plugins directory, in request order
    pub installed: Vec<String>,
    /// Plugins that were skipped, with the reason
    pub failed: Vec<(String, String)>,
    /// Directory holding the plugin executables, `None` when nothing was requested
    pub plugins_dir: Option<PathBuf>,
    /// Run-scoped copy of relicta that sees `plugins_dir`
    pub binary: Option<PathBuf>,
}

impl PluginInstallReport {
    /// Whether every requested plugin was installed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    fn fail_all(&mut self, plugins: &[String], reason: &str) {
        for plugin in plugins {
            warn!("Failed to install plugin {}: {}", plugin, reason);
            self.failed.push((plugin.clone(), reason.to_string()));
        }
    }
}

impl Installer {
    /// Install `plugins` for a run of `main_binary`, one after the other.
    ///
    /// `main_binary` is copied into a fresh run directory first and the
    /// plugins are placed beside that copy, so a shared cache entry never
    /// accumulates plugins across runs. The copy is returned in the report
    /// and is what the run should execute.
    ///
    /// Never fails: every problem is logged and recorded in the report, and
    /// the remaining plugins are still attempted.
    pub async fn install_plugins(
        &self,
        version: &str,
        plugins: &[String],
        main_binary: &Path,
    ) -> PluginInstallReport {
        let mut report = PluginInstallReport::default();
        if plugins.is_empty() {
            return report;
        }

        let binary = match self.stage_binary(main_binary).await {
            Ok(binary) => binary,
            Err(e) => {
                report.fail_all(plugins, &format!("{e:#}"));
                return report;
            }
        };
        let plugins_dir = binary.parent().unwrap_or_else(|| Path::new(".")).join(PLUGINS_DIR_NAME);
        report.plugins_dir = Some(plugins_dir.clone());
        report.binary = Some(binary);

        let platform = match self.platform() {
            Ok(platform) => platform,
            Err(e) => {
                report.fail_all(plugins, &e.to_string());
                return report;
            }
        };

        for plugin in plugins {
            info!("Installing plugin: {}", plugin);
            match self.install_plugin(plugin, version, &platform, &plugins_dir).await {
                Ok(path) => {
                    info!("✓ Plugin {} installed to {}", plugin, path.display());
                    report.installed.push(plugin.clone());
                }
                Err(e) => {
                    warn!("Failed to install plugin {}: {:#}", plugin, e);
                    report.failed.push((plugin.clone(), format!("{e:#}")));
                }
            }
        }

        report
    }

    /// Copy `main_binary` into `<work root>/relicta-run_<uuid>/` next to an
    /// empty `plugins/` directory. The directory outlives the installer.
    async fn stage_binary(&self, main_binary: &Path) -> Result<PathBuf> {
        let file_name = main_binary
            .file_name()
            .with_context(|| format!("{} has no file name", main_binary.display()))?;

        let mut run_dir = WorkDir::new(&self.work_root, RUN_DIR_PREFIX)?;
        let binary = run_dir.path().join(file_name);
        tokio::fs::copy(main_binary, &binary).await.with_context(|| {
            format!("Failed to copy {} to {}", main_binary.display(), binary.display())
        })?;
        make_executable(&binary)?;
        ensure_dir(&run_dir.path().join(PLUGINS_DIR_NAME))?;

        run_dir.keep();
        debug!("Staged {} for plugins", binary.display());
        Ok(binary)
    }

    async fn install_plugin(
        &self,
        plugin: &str,
        version: &str,
        platform: &Platform,
        plugins_dir: &Path,
    ) -> Result<PathBuf> {
        let info = self.resolver.plugin_download(plugin, version, platform);
        let work = WorkDir::new(&self.work_root, "relicta-plugin")?;
        let extracted = fetch_verify_extract(self.downloader.as_ref(), &info, work.path()).await?;

        let suffix = platform.exe_suffix();
        let binary = locate_plugin_binary(&extracted, plugin, suffix).ok_or_else(|| {
            ActionError::BinaryNotFound {
                name: format!("{plugin}{suffix}"),
                path: extracted.display().to_string(),
            }
        })?;

        let dest = plugins_dir.join(format!("{PLUGIN_BINARY_PREFIX}{plugin}{suffix}"));
        tokio::fs::copy(&binary, &dest).await.with_context(|| {
            format!("Failed to copy {} to {}", binary.display(), dest.display())
        })?;
        make_executable(&dest)?;

        Ok(dest)
    }
}
