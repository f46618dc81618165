//! Test utilities for the relicta action
//!
//! In-memory stand-ins for everything the action reads from or does to the
//! outside world, so installs and runs can be tested without network access
//! or a real relicta binary:
//!
//! - [`MockEnvironment`] - host identifiers and environment variables
//! - [`FakeDownloader`] - canned HTTP responses keyed by URL
//! - [`RecordingExecutor`] - records relicta invocations with scripted results
//! - [`build_tar_gz`] / [`build_zip`] - release archives built in memory
//!
//! # Example
//!
//! ```rust,no_run
//! use relicta_action::test_utils::{FakeDownloader, MockEnvironment, build_tar_gz};
//!
//! let env = MockEnvironment::new("linux", "x64").with_var("INPUT_COMMAND", "plan");
//! let downloader = FakeDownloader::new().with_bytes(
//!     "https://example.test/relicta_Linux_x86_64.tar.gz",
//!     build_tar_gz(&[("relicta", b"#!/bin/sh\n")]),
//! );
//! ```

pub mod archives;
pub mod downloader;
pub mod environment;
pub mod executor;

pub use archives::{build_tar_gz, build_tar_gz_with_links, build_zip};
pub use downloader::FakeDownloader;
pub use environment::MockEnvironment;
pub use executor::RecordingExecutor;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses `level` when given, otherwise `RUST_LOG`. Without either, tests run
/// silently.
///
/// ```bash
/// RUST_LOG=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
