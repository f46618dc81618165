//! Workflow commands and environment files.
//!
//! Outputs go to the file named by `GITHUB_OUTPUT` and search path entries to
//! the file named by `GITHUB_PATH`. Log groups and annotations are printed to
//! stdout as `::command::` lines and are only emitted when running inside
//! GitHub Actions.

use crate::platform::HostEnvironment;
use crate::runner::ActionOutputs;
use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Whether the process runs as a GitHub Actions step.
#[must_use]
pub fn is_github_actions(env: &dyn HostEnvironment) -> bool {
    env.var("GITHUB_ACTIONS").is_some_and(|v| v == "true")
}

/// Escape a workflow command message.
#[must_use]
pub fn escape_data(value: &str) -> String {
    value.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

/// `::error::` annotation line for `message`.
#[must_use]
pub fn error_annotation(message: &str) -> String {
    format!("::error::{}", escape_data(message))
}

/// Where [`write_outputs`] put the outputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputDestination {
    /// Appended to the `GITHUB_OUTPUT` file
    File(PathBuf),
    /// Printed as JSON, for runs outside of Actions
    Stdout,
}

/// One output in the multi-line `name<<delimiter` form.
#[must_use]
pub fn format_output(name: &str, value: &str, delimiter: &str) -> String {
    format!("{name}<<{delimiter}\n{value}\n{delimiter}\n")
}

/// Publish `outputs` as step outputs. Unset fields are skipped.
pub fn write_outputs(env: &dyn HostEnvironment, outputs: &ActionOutputs) -> Result<OutputDestination> {
    let Some(path) = env.var("GITHUB_OUTPUT").filter(|p| !p.is_empty()).map(PathBuf::from) else {
        let json = serde_json::to_string_pretty(outputs).context("Failed to serialize outputs")?;
        println!("{json}");
        return Ok(OutputDestination::Stdout);
    };

    let mut content = String::new();
    for (name, value) in outputs.entries() {
        let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
        content.push_str(&format_output(name, value, &delimiter));
        debug!("Setting output {}={}", name, value);
    }

    append(&path, &content)?;
    Ok(OutputDestination::File(path))
}

/// Prepend `dir` to `PATH` for the following steps of the job.
///
/// Returns `false` without doing anything when `GITHUB_PATH` is unset.
pub fn add_path(env: &dyn HostEnvironment, dir: &Path) -> Result<bool> {
    let Some(path) = env.var("GITHUB_PATH").filter(|p| !p.is_empty()) else {
        return Ok(false);
    };

    append(Path::new(&path), &format!("{}\n", dir.display()))?;
    debug!("Added {} to GITHUB_PATH", dir.display());
    Ok(true)
}

fn append(path: &Path, content: &str) -> Result<()> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    file.write_all(content.as_bytes())
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Collapsible section of the job log, closed on drop.
#[derive(Debug)]
#[must_use = "the group ends when this value is dropped"]
pub struct LogGroup {
    enabled: bool,
}

impl LogGroup {
    /// Open a group titled `title`; does nothing when `enabled` is false.
    pub fn start(enabled: bool, title: &str) -> Self {
        if enabled {
            println!("::group::{}", escape_data(title));
        }
        Self {
            enabled,
        }
    }
}

impl Drop for LogGroup {
    fn drop(&mut self) {
        if self.enabled {
            println!("::endgroup::");
        }
    }
}
