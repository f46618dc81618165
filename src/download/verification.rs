use crate::core::ActionError;
use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::Path;
use tokio::fs;
use tracing::debug;

use super::Downloader;

/// Expected digests parsed from a release `checksums.txt`.
///
/// # Format
///
/// One entry per line, digest first:
/// ```text
/// 3b0c4e...  relicta_Linux_x86_64.tar.gz
/// 9f86d0...  relicta_Darwin_aarch64.tar.gz
/// ```
///
/// Only the first two whitespace-separated fields are significant. When a
/// file name is listed twice the first entry wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChecksumManifest {
    entries: HashMap<String, String>,
}

impl ChecksumManifest {
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut entries = HashMap::new();
        for line in content.lines() {
            let mut parts = line.split_whitespace();
            if let (Some(digest), Some(filename)) = (parts.next(), parts.next()) {
                entries.entry(filename.to_string()).or_insert_with(|| digest.to_string());
            }
        }
        Self {
            entries,
        }
    }

    /// Expected digest of `filename`, matched exactly.
    #[must_use]
    pub fn get(&self, filename: &str) -> Option<&str> {
        self.entries.get(filename).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Result of checking a download against its manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// The digest matched the manifest.
    Verified,
    /// Verification could not run; the download is used anyway.
    Skipped {
        reason: String,
    },
}

/// SHA-256 helpers for downloaded archives.
pub struct ChecksumVerifier;

impl ChecksumVerifier {
    /// Hex-encoded SHA-256 of `bytes`.
    #[must_use]
    pub fn sha256_hex(bytes: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        hex::encode(hasher.finalize())
    }

    /// Hex-encoded SHA-256 of a file.
    pub async fn compute_sha256(file_path: &Path) -> Result<String> {
        debug!("Computing SHA256 checksum for: {:?}", file_path);

        let contents = fs::read(file_path)
            .await
            .with_context(|| format!("Failed to read file: {file_path:?}"))?;

        Ok(Self::sha256_hex(&contents))
    }

    /// Compare digests case-insensitively.
    pub fn ensure_matches(filename: &str, expected: &str, actual: &str) -> Result<(), ActionError> {
        if actual.eq_ignore_ascii_case(expected) {
            Ok(())
        } else {
            Err(ActionError::ChecksumMismatch {
                filename: filename.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
            })
        }
    }

    /// Verify `file_path` against the manifest published at `checksum_url`.
    ///
    /// A mismatch is the only error. A manifest that cannot be fetched, has no
    /// entry for `filename`, or a file that cannot be hashed yields
    /// [`VerificationOutcome::Skipped`].
    pub async fn verify_from_release(
        downloader: &dyn Downloader,
        file_path: &Path,
        checksum_url: &str,
        filename: &str,
    ) -> Result<VerificationOutcome> {
        let content = match downloader.fetch_text(checksum_url).await {
            Ok(content) => content,
            Err(e) => {
                return Ok(VerificationOutcome::Skipped {
                    reason: format!("failed to fetch checksum manifest: {e:#}"),
                });
            }
        };

        let manifest = ChecksumManifest::parse(&content);
        let Some(expected) = manifest.get(filename) else {
            return Ok(VerificationOutcome::Skipped {
                reason: format!("checksum not found for {filename}"),
            });
        };

        let actual = match Self::compute_sha256(file_path).await {
            Ok(actual) => actual,
            Err(e) => {
                return Ok(VerificationOutcome::Skipped {
                    reason: format!("failed to hash {filename}: {e:#}"),
                });
            }
        };

        Self::ensure_matches(filename, expected, &actual)?;
        Ok(VerificationOutcome::Verified)
    }
}
