//! Fetch, verify and extract release artifacts.
//!
//! The pipeline for one artifact is strictly sequential:
//!
//! ```text
//! 1. Download the archive           -> DownloadError is fatal
//! 2. Fetch checksums.txt            -> failure: warn, skip verification
//! 3. Look up the archive's digest   -> missing: warn, skip verification
//! 4. Compare SHA-256                -> ChecksumMismatch is fatal
//! 5. Extract (.tar.gz / .zip)       -> UnsupportedArchiveFormat is fatal
//! ```
//!
//! Network access goes through the [`Downloader`] trait. [`HttpDownloader`]
//! is the real implementation; tests substitute an in-memory fake.

pub mod extract;
pub mod locate;
pub mod verification;

use crate::constants::{
    DOWNLOAD_BACKOFF_BASE_MS, DOWNLOAD_BACKOFF_FACTOR, DOWNLOAD_MAX_BACKOFF,
    DOWNLOAD_MAX_RETRIES, DOWNLOAD_TIMEOUT, USER_AGENT,
};
use crate::core::ActionError;
use crate::release::DownloadInfo;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::path::{Path, PathBuf};
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, info, warn};

pub use extract::{ArchiveFormat, extract_archive};
pub use locate::{locate_binary, locate_plugin_binary};
pub use verification::{ChecksumManifest, ChecksumVerifier, VerificationOutcome};

/// HTTP access used by the pipeline.
///
/// Failures are reported as [`ActionError::DownloadError`].
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Download `url` into the file `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<()>;

    /// Download `url` as text.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

/// One failed HTTP attempt.
#[derive(Debug)]
struct FetchFailure {
    reason: String,
    retryable: bool,
}

/// [`Downloader`] backed by `reqwest`, retrying transient failures.
///
/// Connection errors, timeouts, HTTP 5xx and 429 are retried with
/// exponential backoff; any other HTTP error fails immediately.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    max_retries: usize,
}

impl HttpDownloader {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_retries: DOWNLOAD_MAX_RETRIES,
        })
    }

    /// Override the number of retries after the first attempt.
    #[must_use]
    pub const fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, ActionError> {
        let strategy = ExponentialBackoff::from_millis(DOWNLOAD_BACKOFF_BASE_MS)
            .factor(DOWNLOAD_BACKOFF_FACTOR)
            .max_delay(DOWNLOAD_MAX_BACKOFF)
            .take(self.max_retries);

        RetryIf::spawn(
            strategy,
            || self.attempt(url),
            |failure: &FetchFailure| {
                if failure.retryable {
                    warn!("Download of {} failed ({}), retrying", url, failure.reason);
                }
                failure.retryable
            },
        )
        .await
        .map_err(|failure| ActionError::DownloadError {
            url: url.to_string(),
            reason: failure.reason,
        })
    }

    async fn attempt(&self, url: &str) -> Result<Vec<u8>, FetchFailure> {
        debug!("GET {}", url);

        let response = self.client.get(url).send().await.map_err(|e| FetchFailure {
            reason: e.to_string(),
            retryable: true,
        })?;

        check_status(response.status())?;

        let body = response.bytes().await.map_err(|e| FetchFailure {
            reason: format!("failed to read response body: {e}"),
            retryable: true,
        })?;

        Ok(body.to_vec())
    }
}

/// Accept a 2xx status; anything else is a failure, retryable for 5xx and 429.
fn check_status(status: StatusCode) -> Result<(), FetchFailure> {
    if status.is_success() {
        return Ok(());
    }

    Err(FetchFailure {
        reason: format!("HTTP {status}"),
        retryable: status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS,
    })
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str, dest: &Path) -> Result<()> {
        let bytes = self.get_bytes(url).await?;
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(dest, &bytes)
            .await
            .with_context(|| format!("Failed to write {}", dest.display()))?;
        debug!("Downloaded {} bytes to {}", bytes.len(), dest.display());
        Ok(())
    }

    async fn fetch_text(&self, url: &str) -> Result<String> {
        let bytes = self.get_bytes(url).await?;
        String::from_utf8(bytes).with_context(|| format!("Response from {url} is not UTF-8"))
    }
}

/// Run the full pipeline for `info` inside `work_dir`.
///
/// The archive is saved as `work_dir/<filename>` and unpacked into
/// `work_dir/extracted`, which is returned.
pub async fn fetch_verify_extract(
    downloader: &dyn Downloader,
    info: &DownloadInfo,
    work_dir: &Path,
) -> Result<PathBuf> {
    // Checked before any network traffic
    let format = ArchiveFormat::from_filename(&info.filename)?;

    let archive_path = work_dir.join(&info.filename);
    info!("Downloading from: {}", info.url);
    downloader.download(&info.url, &archive_path).await?;
    debug!("Downloaded to: {}", archive_path.display());

    info!("Verifying checksum...");
    match ChecksumVerifier::verify_from_release(
        downloader,
        &archive_path,
        &info.checksum_url,
        &info.filename,
    )
    .await?
    {
        VerificationOutcome::Verified => info!("✓ Checksum verified for {}", info.filename),
        VerificationOutcome::Skipped {
            reason,
        } => warn!("Skipping checksum verification: {}", reason),
    }

    let extracted = work_dir.join("extracted");
    extract_archive(&archive_path, format, &extracted).await?;
    info!("Extracted to: {}", extracted.display());

    Ok(extracted)
}
