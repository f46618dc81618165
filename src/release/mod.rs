//! Release artifact resolution.
//!
//! Turns a version string and a [`Platform`] into the URLs of a release
//! archive and its checksum manifest. Resolution is pure: the same inputs
//! always produce the same [`DownloadInfo`].
//!
//! # URL scheme
//!
//! ```text
//! https://github.com/<owner>/<repo>/releases/download/<version>/<file>
//! https://github.com/<owner>/<repo>/releases/latest/download/<file>   (version == "latest")
//! ```
//!
//! # Plugins
//!
//! Each plugin is released from its own repository, `<owner>/plugin-<name>`,
//! with its own `checksums.txt`, and is resolved with the same version string
//! as relicta itself. Plugin archives use the lower-case OS name:
//! `github_linux_x86_64.tar.gz`.

use crate::constants::{
    CHECKSUMS_FILENAME, GITHUB_BASE_URL, LATEST_VERSION, PLUGIN_REPO_PREFIX, REPO_NAME,
    REPO_OWNER, TOOL_NAME,
};
use crate::platform::Platform;

/// Where to download a single artifact from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadInfo {
    /// Archive URL
    pub url: String,
    /// Archive file name, also the key looked up in the checksum manifest
    pub filename: String,
    /// URL of the release's checksum manifest
    pub checksum_url: String,
}

/// A GitHub repository that publishes release assets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRepository {
    base_url: String,
    owner: String,
    name: String,
}

impl ReleaseRepository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            base_url: GITHUB_BASE_URL.to_string(),
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Serve assets from another host, e.g. a mirror.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// URL of `filename` attached to the release `version`.
    #[must_use]
    pub fn asset_url(&self, version: &str, filename: &str) -> String {
        if version == LATEST_VERSION {
            format!(
                "{}/{}/{}/releases/latest/download/{filename}",
                self.base_url, self.owner, self.name
            )
        } else {
            format!(
                "{}/{}/{}/releases/download/{version}/{filename}",
                self.base_url, self.owner, self.name
            )
        }
    }

    /// URL of the checksum manifest of the release `version`.
    #[must_use]
    pub fn checksum_url(&self, version: &str) -> String {
        self.asset_url(version, CHECKSUMS_FILENAME)
    }

    #[must_use]
    pub fn download_info(&self, version: &str, filename: String) -> DownloadInfo {
        DownloadInfo {
            url: self.asset_url(version, &filename),
            checksum_url: self.checksum_url(version),
            filename,
        }
    }
}

/// Archive name of the main tool, e.g. `relicta_Linux_x86_64.tar.gz`.
#[must_use]
pub fn main_archive_name(platform: &Platform) -> String {
    format!(
        "{TOOL_NAME}_{}_{}.{}",
        platform.os.as_str(),
        platform.arch.as_str(),
        platform.archive_extension()
    )
}

/// Archive name of a plugin, e.g. `github_darwin_aarch64.tar.gz`.
#[must_use]
pub fn plugin_archive_name(plugin: &str, platform: &Platform) -> String {
    format!(
        "{plugin}_{}_{}.{}",
        platform.os.as_lowercase_str(),
        platform.arch.as_str(),
        platform.archive_extension()
    )
}

/// Resolves relicta and plugin artifacts against a release host.
#[derive(Debug, Clone)]
pub struct ArtifactResolver {
    base_url: String,
    owner: String,
    main: ReleaseRepository,
}

impl Default for ArtifactResolver {
    fn default() -> Self {
        Self::new(GITHUB_BASE_URL, REPO_OWNER, REPO_NAME)
    }
}

impl ArtifactResolver {
    pub fn new(base_url: &str, owner: &str, repo: &str) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            main: ReleaseRepository::new(owner, repo).with_base_url(base_url.clone()),
            base_url,
            owner: owner.to_string(),
        }
    }

    /// Repository publishing `plugin`.
    #[must_use]
    pub fn plugin_repository(&self, plugin: &str) -> ReleaseRepository {
        ReleaseRepository::new(self.owner.clone(), format!("{PLUGIN_REPO_PREFIX}{plugin}"))
            .with_base_url(self.base_url.clone())
    }

    #[must_use]
    pub fn main_download(&self, version: &str, platform: &Platform) -> DownloadInfo {
        self.main.download_info(version, main_archive_name(platform))
    }

    #[must_use]
    pub fn plugin_download(&self, plugin: &str, version: &str, platform: &Platform) -> DownloadInfo {
        self.plugin_repository(plugin).download_info(version, plugin_archive_name(plugin, platform))
    }
}
