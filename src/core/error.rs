//! Error handling for the relicta action
//!
//! The action distinguishes a small set of failure kinds, each with a fixed
//! severity:
//!
//! - [`ActionError::UnsupportedPlatform`] / [`ActionError::UnsupportedArchitecture`]:
//!   fatal, raised before anything is downloaded
//! - [`ActionError::DownloadError`]: fatal for the artifact being fetched
//! - [`ActionError::ChecksumMismatch`]: fatal for that artifact, the only
//!   enforced integrity failure
//! - [`ActionError::UnsupportedArchiveFormat`]: fatal
//! - [`ActionError::BinaryNotFound`]: fatal for relicta, only skips the plugin
//!   for plugin installs
//! - [`ActionError::CommandFailed`]: fatal, aborts the run
//! - [`ActionError::MissingToken`] / [`ActionError::InvalidInput`]: fatal,
//!   raised while reading step inputs
//!
//! A missing or unreadable checksum manifest is not an error at all; the
//! pipeline logs a warning and skips verification.
//!
//! Functions return `anyhow::Result` and attach context with `.context(...)`.
//! The typed error stays reachable through `downcast_ref`, which is how
//! [`user_friendly_error`] picks a suggestion for the final report.
//!
//! # Examples
//!
//! ```rust,no_run
//! use relicta_action::core::{ActionError, user_friendly_error};
//!
//! let ctx = user_friendly_error(anyhow::Error::from(ActionError::MissingToken));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Every failure the action reports by kind.
#[derive(Error, Debug, Clone)]
pub enum ActionError {
    /// Host operating system has no relicta build.
    #[error("Unsupported OS: {os}")]
    UnsupportedPlatform {
        /// Host identifier as reported by the environment
        os: String,
    },

    /// Host CPU architecture has no relicta build.
    #[error("Unsupported architecture: {arch}")]
    UnsupportedArchitecture {
        /// Host identifier as reported by the environment
        arch: String,
    },

    /// Transport or HTTP failure while fetching an artifact.
    #[error("Failed to download {url}: {reason}")]
    DownloadError {
        /// URL that could not be fetched
        url: String,
        /// Underlying transport error or HTTP status
        reason: String,
    },

    /// The archive digest differs from the published checksum.
    #[error("Checksum mismatch for {filename}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        /// Archive file name as listed in the manifest
        filename: String,
        /// Digest published in the checksum manifest
        expected: String,
        /// Digest of the downloaded bytes
        actual: String,
    },

    /// The artifact is neither `.tar.gz` nor `.zip`.
    #[error("Unsupported archive format: {filename}")]
    UnsupportedArchiveFormat {
        /// Archive file name
        filename: String,
    },

    /// The expected executable is not inside the extracted archive.
    #[error("Binary '{name}' not found in {path}")]
    BinaryNotFound {
        /// Executable name that was searched for
        name: String,
        /// Root of the extracted archive
        path: String,
    },

    /// A relicta step exited with a non-zero status.
    #[error("Command '{command}' failed with exit code {exit_code}")]
    CommandFailed {
        /// Subcommand (or passthrough command line) that failed
        command: String,
        /// Exit status, `-1` when the process was killed by a signal
        exit_code: i32,
    },

    /// Neither the `github-token` input nor `GITHUB_TOKEN` is set.
    #[error(
        "GitHub token is required. Set github-token input or GITHUB_TOKEN environment variable"
    )]
    MissingToken,

    /// A step input has a value that cannot be interpreted.
    #[error("Invalid value for input '{name}': {reason}")]
    InvalidInput {
        /// Input name as declared by the action
        name: String,
        /// Why the value was rejected
        reason: String,
    },

    #[error("{message}")]
    Other {
        message: String,
    },
}

/// An error together with the hints shown to the workflow author.
#[derive(Debug)]
pub struct ErrorContext {
    pub error: ActionError,
    pub suggestion: Option<String>,
    pub details: Option<String>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new(error: ActionError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error with colours on stderr.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
///
/// Typed [`ActionError`]s anywhere in the chain get a tailored suggestion.
/// Anything else is reported with its full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(action_error) = error.downcast_ref::<ActionError>() {
        let ctx = create_error_context(action_error.clone());
        // Keep the outer context messages; they name the step that failed
        let chain: Vec<String> = error.chain().map(ToString::to_string).collect();
        if chain.len() > 1 && ctx.details.is_none() {
            return ctx.with_details(chain.join(": "));
        }
        return ctx;
    }

    if let Some(io_error) = error.downcast_ref::<std::io::Error>()
        && io_error.kind() == std::io::ErrorKind::PermissionDenied
    {
        return ErrorContext::new(ActionError::Other {
            message: error.to_string(),
        })
        .with_suggestion("Check that the runner user can write to RUNNER_TEMP and RUNNER_TOOL_CACHE")
        .with_details("The action needs write access to its work and cache directories");
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(ActionError::Other {
        message,
    })
}

fn create_error_context(error: ActionError) -> ErrorContext {
    match &error {
        ActionError::MissingToken => ErrorContext::new(error)
            .with_suggestion("Pass `github-token: ${{ secrets.GITHUB_TOKEN }}` to the action or export GITHUB_TOKEN in the job environment"),

        ActionError::UnsupportedPlatform { .. } | ActionError::UnsupportedArchitecture { .. } => {
            ErrorContext::new(error)
                .with_suggestion("Run the action on a Linux, macOS or Windows runner with an x64 or arm64 CPU")
                .with_details("relicta publishes binaries for Darwin, Linux and Windows on x86_64 and aarch64 only")
        }

        ActionError::DownloadError { url, .. } => {
            let details = format!("Could not fetch {url}");
            ErrorContext::new(error)
                .with_suggestion("Check that the requested version exists on the releases page and that the runner has network access")
                .with_details(details)
        }

        ActionError::ChecksumMismatch { filename, .. } => {
            let details = format!(
                "{filename} does not match the digest published in the release checksum manifest. This indicates a corrupted or tampered download"
            );
            ErrorContext::new(error)
                .with_suggestion("Re-run the job. If the mismatch persists, report it to the relicta maintainers")
                .with_details(details)
        }

        ActionError::BinaryNotFound { .. } => ErrorContext::new(error)
            .with_suggestion("The release archive layout may have changed. Pin a known-good `version` input")
            .with_details("The executable is looked up at the archive root and inside a `relicta*` directory"),

        ActionError::CommandFailed { command, .. } => {
            let suggestion = format!("Inspect the relicta output of the '{command}' step above");
            ErrorContext::new(error).with_suggestion(suggestion)
        }

        ActionError::InvalidInput { name, .. } if name == "command" => ErrorContext::new(error)
            .with_suggestion("Use full, plan, bump, notes, approve, publish or a relicta command line"),

        ActionError::InvalidInput { .. } => ErrorContext::new(error)
            .with_suggestion("Boolean inputs accept true, True, TRUE, false, False or FALSE"),

        _ => ErrorContext::new(error),
    }
}
