use super::*;
use crate::download::ChecksumVerifier;
use crate::test_utils::{
    FakeDownloader, MockEnvironment, build_tar_gz, build_tar_gz_with_links, build_zip,
};
use tempfile::TempDir;

const RELICTA: &[u8] = b"#!/bin/sh\necho relicta\n";

struct Fixture {
    temp: TempDir,
    downloader: Arc<FakeDownloader>,
}

impl Fixture {
    fn new(downloader: FakeDownloader) -> Self {
        Self {
            temp: TempDir::new().unwrap(),
            downloader: Arc::new(downloader),
        }
    }

    fn installer(&self, os: &str, arch: &str) -> Installer {
        Installer::new(Arc::new(MockEnvironment::new(os, arch)), self.downloader.clone())
            .with_cache(ToolCache::new(self.temp.path().join("cache")))
            .with_work_root(self.temp.path().join("work"))
    }

    fn cache(&self) -> ToolCache {
        ToolCache::new(self.temp.path().join("cache"))
    }

    /// A relicta binary outside the cache, as if installed earlier.
    fn main_binary(&self) -> PathBuf {
        let dir = self.temp.path().join("bin");
        std::fs::create_dir_all(&dir).unwrap();
        let binary = dir.join("relicta");
        std::fs::write(&binary, RELICTA).unwrap();
        binary
    }
}

fn linux() -> Platform {
    Platform::new(crate::platform::Os::Linux, crate::platform::Arch::X86_64)
}

/// Serve `archive` for relicta `version` on Linux/x86_64, with a matching manifest.
fn serve_main(downloader: FakeDownloader, version: &str, archive: Vec<u8>) -> FakeDownloader {
    let info = ArtifactResolver::default().main_download(version, &linux());
    let manifest = format!("{}  {}\n", ChecksumVerifier::sha256_hex(&archive), info.filename);
    downloader.with_bytes(&info.url, archive).with_text(&info.checksum_url, manifest)
}

fn serve_plugin(downloader: FakeDownloader, plugin: &str, version: &str) -> FakeDownloader {
    let info = ArtifactResolver::default().plugin_download(plugin, version, &linux());
    let archive = build_tar_gz(&[(plugin, b"#!/bin/sh\necho plugin\n")]);
    let manifest = format!("{}  {}\n", ChecksumVerifier::sha256_hex(&archive), info.filename);
    downloader.with_bytes(&info.url, archive).with_text(&info.checksum_url, manifest)
}

#[tokio::test]
async fn test_install_main_fresh_and_cached() {
    let archive = build_tar_gz(&[("relicta_Linux_x86_64/relicta", RELICTA)]);
    let fixture = Fixture::new(serve_main(FakeDownloader::new(), "v1.4.0", archive));
    let installer = fixture.installer("linux", "x64");

    let binary = installer.install_main("v1.4.0").await.unwrap();

    let entry = fixture.cache().find("relicta", "v1.4.0", "x86_64").unwrap();
    assert_eq!(binary, entry.join("relicta_Linux_x86_64").join("relicta"));
    assert_eq!(std::fs::read(&binary).unwrap(), RELICTA);
    assert_eq!(fixture.downloader.requests().len(), 2);

    // Work directories are cleaned up once the tree is cached
    let leftovers = std::fs::read_dir(fixture.temp.path().join("work")).unwrap().count();
    assert_eq!(leftovers, 0);

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mode = std::fs::metadata(&binary).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    // Second install is served from the cache without network access
    let again = installer.install_main("v1.4.0").await.unwrap();
    assert_eq!(again, binary);
    assert_eq!(fixture.downloader.requests().len(), 2);
}

#[tokio::test]
async fn test_install_main_corrupted_cache_redownloads() {
    let archive = build_tar_gz(&[("relicta", RELICTA)]);
    let fixture = Fixture::new(serve_main(FakeDownloader::new(), "v1.4.0", archive));

    // Completed entry whose binary has gone missing
    let src = fixture.temp.path().join("broken");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("README.md"), "docs").unwrap();
    fixture.cache().store(&src, "relicta", "v1.4.0", "x86_64").await.unwrap();

    let binary = fixture.installer("linux", "x64").install_main("v1.4.0").await.unwrap();

    assert_eq!(std::fs::read(&binary).unwrap(), RELICTA);
    assert_eq!(fixture.downloader.requests().len(), 2);
    assert!(!binary.parent().unwrap().join("README.md").exists());
}

#[tokio::test]
async fn test_install_main_latest_is_not_cached() {
    let archive = build_tar_gz(&[("relicta", RELICTA)]);
    let fixture = Fixture::new(serve_main(FakeDownloader::new(), "latest", archive));
    let installer = fixture.installer("linux", "x64");

    let binary = installer.install_main("latest").await.unwrap();

    assert!(binary.starts_with(fixture.temp.path().join("work")));
    assert!(binary.is_file());
    assert!(!fixture.cache().root().join("relicta").exists());

    installer.install_main("latest").await.unwrap();
    assert_eq!(fixture.downloader.requests().len(), 4);
}

#[tokio::test]
async fn test_install_main_windows_zip() {
    let platform =
        Platform::new(crate::platform::Os::Windows, crate::platform::Arch::Aarch64);
    let info = ArtifactResolver::default().main_download("v1.4.0", &platform);
    let fixture = Fixture::new(
        FakeDownloader::new().with_bytes(&info.url, build_zip(&[("relicta.exe", b"MZ")])),
    );

    let binary = fixture.installer("win32", "arm64").install_main("v1.4.0").await.unwrap();

    assert_eq!(binary.file_name().unwrap(), "relicta.exe");
    assert_eq!(fixture.downloader.requests(), vec![info.url.clone(), info.checksum_url.clone()]);
}

#[tokio::test]
async fn test_install_main_binary_not_found() {
    let archive = build_tar_gz(&[("docs/README.md", b"docs")]);
    let fixture = Fixture::new(serve_main(FakeDownloader::new(), "v1.4.0", archive));

    let err = fixture.installer("linux", "x64").install_main("v1.4.0").await.unwrap_err();

    match err.downcast_ref::<ActionError>() {
        Some(ActionError::BinaryNotFound {
            name,
            ..
        }) => assert_eq!(name, "relicta"),
        other => panic!("Expected BinaryNotFound, got {other:?}"),
    }
    assert!(fixture.cache().find("relicta", "v1.4.0", "x86_64").is_none());
}

#[cfg(unix)]
#[tokio::test]
async fn test_install_main_symlinked_binary_is_cached() {
    let archive = build_tar_gz_with_links(&[("relicta-real", RELICTA)], &[("relicta", "relicta-real")]);
    let fixture = Fixture::new(serve_main(FakeDownloader::new(), "v1.4.0", archive));
    let installer = fixture.installer("linux", "x64");

    let binary = installer.install_main("v1.4.0").await.unwrap();

    let entry = fixture.cache().find("relicta", "v1.4.0", "x86_64").unwrap();
    assert_eq!(binary, entry.join("relicta"));
    assert!(binary.is_file());
    assert_eq!(std::fs::read(&binary).unwrap(), RELICTA);

    let again = installer.install_main("v1.4.0").await.unwrap();
    assert_eq!(again, binary);
    assert_eq!(fixture.downloader.requests().len(), 2);
}

#[tokio::test]
async fn test_install_main_unsupported_platform_makes_no_requests() {
    let fixture = Fixture::new(FakeDownloader::new());

    let err = fixture.installer("freebsd", "x64").install_main("v1.4.0").await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ActionError>(),
        Some(ActionError::UnsupportedPlatform { .. })
    ));
    assert!(fixture.downloader.requests().is_empty());
}

#[tokio::test]
async fn test_install_plugins_isolates_failures() {
    let downloader = serve_plugin(FakeDownloader::new(), "github", "v1.4.0");
    let downloader = serve_plugin(downloader, "jira", "v1.4.0");
    let fixture = Fixture::new(downloader);
    let installer = fixture.installer("linux", "x64");
    let main_binary = fixture.main_binary();

    let plugins = vec!["github".to_string(), "slack".to_string(), "jira".to_string()];
    let report = installer.install_plugins("v1.4.0", &plugins, &main_binary).await;

    assert_eq!(report.installed, vec!["github", "jira"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].0, "slack");
    assert!(!report.is_complete());

    // Plugins sit beside a run-scoped copy of relicta, never beside the original
    let binary = report.binary.clone().unwrap();
    assert!(binary.starts_with(fixture.temp.path().join("work")));
    assert_eq!(std::fs::read(&binary).unwrap(), RELICTA);
    assert!(!main_binary.parent().unwrap().join("plugins").exists());

    let plugins_dir = binary.parent().unwrap().join("plugins");
    assert_eq!(report.plugins_dir, Some(plugins_dir.clone()));
    assert!(plugins_dir.join("relicta-github").is_file());
    assert!(plugins_dir.join("relicta-jira").is_file());
    assert!(!plugins_dir.join("relicta-slack").exists());
}

#[tokio::test]
async fn test_install_plugins_do_not_leak_between_runs() {
    let archive = build_tar_gz(&[("relicta", RELICTA)]);
    let downloader = serve_main(FakeDownloader::new(), "v1.4.0", archive);
    let downloader = serve_plugin(downloader, "github", "v1.4.0");
    let downloader = serve_plugin(downloader, "jira", "v1.4.0");
    let fixture = Fixture::new(downloader);
    let installer = fixture.installer("linux", "x64");

    let cached = installer.install_main("v1.4.0").await.unwrap();
    let first = installer.install_plugins("v1.4.0", &["github".to_string()], &cached).await;

    let cached_again = installer.install_main("v1.4.0").await.unwrap();
    assert_eq!(cached_again, cached);
    let second = installer.install_plugins("v1.4.0", &["jira".to_string()], &cached_again).await;

    let first_dir = first.plugins_dir.unwrap();
    let second_dir = second.plugins_dir.unwrap();
    assert_ne!(first_dir, second_dir);
    assert!(second_dir.join("relicta-jira").is_file());
    assert!(!second_dir.join("relicta-github").exists());

    // The shared cache entry is left untouched
    let entry = fixture.cache().find("relicta", "v1.4.0", "x86_64").unwrap();
    assert!(!entry.join("plugins").exists());
}

#[tokio::test]
async fn test_install_plugins_binary_missing_from_archive() {
    let info = ArtifactResolver::default().plugin_download("github", "latest", &linux());
    let fixture = Fixture::new(
        FakeDownloader::new().with_bytes(&info.url, build_tar_gz(&[("LICENSE", b"MIT")])),
    );
    let main_binary = fixture.main_binary();

    let report = fixture
        .installer("linux", "x64")
        .install_plugins("latest", &["github".to_string()], &main_binary)
        .await;

    assert!(report.installed.is_empty());
    assert!(report.failed[0].1.contains("not found"));
}

#[tokio::test]
async fn test_install_plugins_without_main_binary() {
    let fixture = Fixture::new(serve_plugin(FakeDownloader::new(), "github", "v1.4.0"));
    let missing = fixture.temp.path().join("bin").join("relicta");

    let report = fixture
        .installer("linux", "x64")
        .install_plugins("v1.4.0", &["github".to_string(), "jira".to_string()], &missing)
        .await;

    assert!(report.installed.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert!(report.binary.is_none());
    assert!(fixture.downloader.requests().is_empty());
}

#[tokio::test]
async fn test_install_plugins_empty_list_is_a_no_op() {
    let fixture = Fixture::new(FakeDownloader::new());
    let main_binary = fixture.temp.path().join("relicta");

    let report = fixture.installer("linux", "x64").install_plugins("v1.4.0", &[], &main_binary).await;

    assert_eq!(report, PluginInstallReport::default());
    assert!(!fixture.temp.path().join("plugins").exists());
    assert!(fixture.downloader.requests().is_empty());
}
