//! Global constants used throughout the relicta action.
//!
//! Release coordinates, naming conventions shared with the `relicta` binary,
//! and retry parameters for downloads live here so that the few places that
//! depend on them stay in sync.

use std::time::Duration;

/// Name of the external release tool, used for archive names and cache keys.
pub const TOOL_NAME: &str = "relicta";

/// GitHub organisation that publishes relicta and its plugins.
pub const REPO_OWNER: &str = "relicta-tech";

/// Repository holding the main relicta releases.
pub const REPO_NAME: &str = "relicta";

/// Base URL of the release host.
pub const GITHUB_BASE_URL: &str = "https://github.com";

/// Checksum manifest published alongside every release.
pub const CHECKSUMS_FILENAME: &str = "checksums.txt";

/// Plugins are released from `relicta-tech/plugin-<name>`.
pub const PLUGIN_REPO_PREFIX: &str = "plugin-";

/// relicta only loads plugins named `relicta-<name>`.
pub const PLUGIN_BINARY_PREFIX: &str = "relicta-";

/// Directory created next to the relicta binary for plugin executables.
pub const PLUGINS_DIR_NAME: &str = "plugins";

/// Prefix of the per-run directory holding relicta and its plugins.
pub const RUN_DIR_PREFIX: &str = "relicta-run";

/// Version string selecting the most recent release.
pub const LATEST_VERSION: &str = "latest";

/// Environment variable carrying the GitHub token for relicta.
pub const TOKEN_ENV_VAR: &str = "GITHUB_TOKEN";

/// Marker variable set for every relicta step when running in dry-run mode.
pub const DRY_RUN_ENV_VAR: &str = "RELICTA_DRY_RUN";

/// Flag that skips the interactive confirmation of `relicta approve`.
pub const AUTO_APPROVE_FLAG: &str = "--yes";

/// User agent sent with every download.
pub const USER_AGENT: &str = concat!("relicta-action/", env!("CARGO_PKG_VERSION"));

/// Number of retries after the first failed download attempt.
pub const DOWNLOAD_MAX_RETRIES: usize = 2;

/// Base for the exponential download backoff (milliseconds).
pub const DOWNLOAD_BACKOFF_BASE_MS: u64 = 10;

/// Multiplier applied to the backoff base; yields roughly 1s then 10s.
pub const DOWNLOAD_BACKOFF_FACTOR: u64 = 100;

/// Upper bound for a single backoff delay.
pub const DOWNLOAD_MAX_BACKOFF: Duration = Duration::from_secs(20);

/// Timeout for a single HTTP request.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);
