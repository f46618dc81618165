//! Step outputs scraped from `relicta publish`.
//!
//! relicta prints human-readable text, not structured data, so outputs are
//! recovered with loose patterns. Each field is matched independently; the
//! first match wins and a miss leaves the field unset.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;

/// Values published as step outputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct ActionOutputs {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_id: Option<String>,
}

impl ActionOutputs {
    /// Set outputs as `(name, value)` pairs using the step output names.
    #[must_use]
    pub fn entries(&self) -> Vec<(&'static str, &str)> {
        [
            ("version", &self.version),
            ("release-url", &self.release_url),
            ("tag-name", &self.tag_name),
            ("release-id", &self.release_id),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.as_deref().map(|value| (name, value)))
        .collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

/// Turns captured stdout into [`ActionOutputs`].
pub trait OutputParser: Send + Sync {
    fn parse(&self, stdout: &str) -> ActionOutputs;
}

/// Pattern-based [`OutputParser`] for relicta's publish summary.
///
/// ```text
/// Version: 1.4.0          -> version 1.4.0, tag-name v1.4.0
/// Release URL: https://github.com/acme/app/releases/tag/v1.4.0
/// Release ID: 123456
/// ```
#[derive(Debug, Clone)]
pub struct RegexOutputParser {
    version: Regex,
    release_url: Regex,
    release_id: Regex,
}

impl RegexOutputParser {
    pub fn new() -> Result<Self> {
        Ok(Self {
            version: Regex::new(r"(?i)(?:version|tag):\s*v?(\d+\.\d+\.\d+)")
                .context("Invalid version pattern")?,
            release_url: Regex::new(r"(?i)(?:release url|url):\s*(https://github\.com/\S+)")
                .context("Invalid release URL pattern")?,
            release_id: Regex::new(r"(?i)(?:release id|id):\s*(\d+)")
                .context("Invalid release id pattern")?,
        })
    }

    fn capture(pattern: &Regex, text: &str) -> Option<String> {
        pattern.captures(text).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
    }
}

impl OutputParser for RegexOutputParser {
    fn parse(&self, stdout: &str) -> ActionOutputs {
        let version = Self::capture(&self.version, stdout);
        ActionOutputs {
            tag_name: version.as_ref().map(|v| format!("v{v}")),
            version,
            release_url: Self::capture(&self.release_url, stdout),
            release_id: Self::capture(&self.release_id, stdout),
        }
    }
}
