//! relicta action
//!
//! A GitHub Action that installs the [relicta](https://github.com/relicta-tech/relicta)
//! release binary for the runner's platform and drives its release workflow.
//!
//! # Architecture Overview
//!
//! A run flows one way:
//!
//! ```text
//! inputs -> Installer -> CommandRunner -> OutputParser -> step outputs
//! ```
//!
//! - The installer resolves the release archive for the host platform,
//!   downloads it, verifies it against the release's `checksums.txt`,
//!   extracts it and caches the result. Plugins are installed next to it.
//! - The command runner executes `plan`, `bump`, `notes`, `approve` and
//!   `publish` (or a single one of them, or any command line) with the token
//!   and common flags.
//! - The output of `publish` is scraped for the released version, tag,
//!   release URL and release id.
//!
//! # Core Modules
//!
//! - [`platform`] - host detection behind the [`platform::HostEnvironment`] trait
//! - [`release`] - release asset URLs for relicta and its plugins
//! - [`download`] - fetch, checksum verification, extraction, binary lookup
//! - [`cache`] - runner tool cache for installed versions
//! - [`installer`] - relicta and plugin installation
//! - [`runner`] - step planning, process execution, output scraping
//! - [`actions`] - step inputs, outputs, `GITHUB_PATH`, log groups, logging
//! - [`core`] - error types and user-facing error reports
//! - [`cli`] - command-line flags for the binary

pub mod action;
pub mod actions;
pub mod cache;
pub mod cli;
pub mod constants;
pub mod core;
pub mod download;
pub mod installer;
pub mod platform;
pub mod release;
pub mod runner;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
