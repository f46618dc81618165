//! Integration test suite for the relicta action
//!
//! End-to-end tests that drive the library through its public API with an
//! in-memory release host, and the compiled binary through `assert_cmd`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: the binary's exit status and error report
//! - **end_to_end**: install plus a scripted fake relicta (Unix only)
//! - **install_flow**: install, cache and plugin behaviour through [`Action`]
//!
//! [`Action`]: relicta_action::action::Action

mod cli;
#[cfg(unix)]
mod end_to_end;
mod install_flow;

use relicta_action::download::ChecksumVerifier;
use relicta_action::platform::{Arch, Os, Platform};
use relicta_action::release::ArtifactResolver;
use relicta_action::test_utils::FakeDownloader;

pub const LINUX_X64: Platform = Platform::new(Os::Linux, Arch::X86_64);

/// Publish `archive` as relicta `version` for Linux/x86_64 with a matching manifest.
pub fn publish_release(downloader: FakeDownloader, version: &str, archive: Vec<u8>) -> FakeDownloader {
    let info = ArtifactResolver::default().main_download(version, &LINUX_X64);
    let manifest = format!("{}  {}\n", ChecksumVerifier::sha256_hex(&archive), info.filename);
    downloader.with_bytes(&info.url, archive).with_text(&info.checksum_url, manifest)
}

/// Publish `archive` as plugin `name` for Linux/x86_64 with a matching manifest.
pub fn publish_plugin(
    downloader: FakeDownloader,
    name: &str,
    version: &str,
    archive: Vec<u8>,
) -> FakeDownloader {
    let info = ArtifactResolver::default().plugin_download(name, version, &LINUX_X64);
    let manifest = format!("{}  {}\n", ChecksumVerifier::sha256_hex(&archive), info.filename);
    downloader.with_bytes(&info.url, archive).with_text(&info.checksum_url, manifest)
}
