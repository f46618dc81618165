//! Install behaviour through the full action, with relicta itself faked.

use super::{LINUX_X64, publish_plugin, publish_release};
use relicta_action::action::Action;
use relicta_action::actions::ActionInputs;
use relicta_action::cache::ToolCache;
use relicta_action::core::ActionError;
use relicta_action::installer::Installer;
use relicta_action::release::ArtifactResolver;
use relicta_action::runner::RegexOutputParser;
use relicta_action::test_utils::{
    FakeDownloader, MockEnvironment, RecordingExecutor, build_tar_gz, init_test_logging,
};
use std::sync::Arc;
use tempfile::TempDir;

struct Harness {
    temp: TempDir,
    downloader: Arc<FakeDownloader>,
    executor: Arc<RecordingExecutor>,
    env: Arc<MockEnvironment>,
}

impl Harness {
    fn new(downloader: FakeDownloader, executor: RecordingExecutor) -> Self {
        init_test_logging(None);
        let temp = TempDir::new().unwrap();
        let env = MockEnvironment::new("linux", "x64")
            .with_var("GITHUB_PATH", temp.path().join("github_path").display().to_string());

        Self {
            temp,
            downloader: Arc::new(downloader),
            executor: Arc::new(executor),
            env: Arc::new(env),
        }
    }

    fn action(&self) -> Action {
        let installer = Installer::new(self.env.clone(), self.downloader.clone())
            .with_cache(ToolCache::new(self.temp.path().join("toolcache")))
            .with_work_root(self.temp.path().join("tmp"));
        Action::new(
            self.env.clone(),
            installer,
            self.executor.clone(),
            Arc::new(RegexOutputParser::new().unwrap()),
        )
    }
}

fn inputs(command: &str, version: &str) -> ActionInputs {
    ActionInputs {
        version: version.to_string(),
        command: command.to_string(),
        token: "ghp_integration".to_string(),
        ..ActionInputs::default()
    }
}

fn relicta_archive() -> Vec<u8> {
    build_tar_gz(&[("relicta_Linux_x86_64/relicta", b"#!/bin/sh\n"), ("README.md", b"docs")])
}

#[tokio::test]
async fn test_full_run_installs_then_runs_steps_in_order() {
    let downloader = publish_release(FakeDownloader::new(), "v1.4.0", relicta_archive());
    let executor = RecordingExecutor::new()
        .with_result("publish", 0, "Release URL: https://github.com/acme/app/releases/tag/v1.5.0\nTag: v1.5.0\n");
    let harness = Harness::new(downloader, executor);

    let mut inputs = inputs("full", "v1.4.0");
    inputs.auto_approve = true;
    inputs.dry_run = true;
    let outputs = harness.action().run(&inputs).await.unwrap();

    assert_eq!(harness.executor.subcommands(), vec!["plan", "bump", "notes", "approve", "publish"]);
    let invocations = harness.executor.invocations();
    assert_eq!(invocations[3].args, vec!["approve", "--yes", "--dry-run"]);
    for invocation in &invocations {
        assert_eq!(invocation.env_var("GITHUB_TOKEN"), Some("ghp_integration"));
        assert_eq!(invocation.env_var("RELICTA_DRY_RUN"), Some("true"));
        assert!(invocation.program.ends_with("relicta_Linux_x86_64/relicta"));
    }

    assert_eq!(outputs.version.as_deref(), Some("1.5.0"));
    assert_eq!(outputs.tag_name.as_deref(), Some("v1.5.0"));
    assert_eq!(
        outputs.release_url.as_deref(),
        Some("https://github.com/acme/app/releases/tag/v1.5.0")
    );
    assert!(outputs.release_id.is_none());

    // The binary's directory is published to later steps of the job
    let github_path = std::fs::read_to_string(harness.temp.path().join("github_path")).unwrap();
    let bin_dir = invocations[0].program.parent().unwrap().display().to_string();
    assert_eq!(github_path, format!("{bin_dir}\n"));
}

#[tokio::test]
async fn test_second_run_uses_tool_cache() {
    let downloader = publish_release(FakeDownloader::new(), "v1.4.0", relicta_archive());
    let harness = Harness::new(downloader, RecordingExecutor::new());
    let action = harness.action();

    action.run(&inputs("plan", "v1.4.0")).await.unwrap();
    action.run(&inputs("plan", "v1.4.0")).await.unwrap();

    assert_eq!(harness.downloader.requests().len(), 2);
    let invocations = harness.executor.invocations();
    assert_eq!(invocations[0].program, invocations[1].program);
    assert!(invocations[0].program.starts_with(harness.temp.path().join("toolcache")));
}

#[tokio::test]
async fn test_checksum_mismatch_aborts_before_running_relicta() {
    let info = ArtifactResolver::default().main_download("v1.4.0", &LINUX_X64);
    let downloader = FakeDownloader::new()
        .with_bytes(&info.url, relicta_archive())
        .with_text(&info.checksum_url, format!("{}  {}\n", "0".repeat(64), info.filename));
    let harness = Harness::new(downloader, RecordingExecutor::new());

    let err = harness.action().run(&inputs("full", "v1.4.0")).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<ActionError>(),
        Some(ActionError::ChecksumMismatch { .. })
    ));
    assert!(harness.executor.invocations().is_empty());
}

#[tokio::test]
async fn test_failed_plugin_does_not_fail_the_run() {
    let downloader = publish_release(FakeDownloader::new(), "v1.4.0", relicta_archive());
    let downloader =
        publish_plugin(downloader, "github", "v1.4.0", build_tar_gz(&[("github", b"#!/bin/sh\n")]));
    let harness = Harness::new(downloader, RecordingExecutor::new());

    let mut inputs = inputs("plan", "v1.4.0");
    inputs.plugins = vec!["github".to_string(), "missing".to_string()];
    harness.action().run(&inputs).await.unwrap();

    // relicta runs from a per-run copy with the plugins beside it
    let program = &harness.executor.invocations()[0].program;
    assert!(program.starts_with(harness.temp.path().join("tmp")));
    let plugins_dir = program.parent().unwrap().join("plugins");
    assert!(plugins_dir.join("relicta-github").is_file());
    assert!(!plugins_dir.join("relicta-missing").exists());
    assert_eq!(harness.executor.subcommands(), vec!["plan"]);

    let entry = ToolCache::new(harness.temp.path().join("toolcache"))
        .find("relicta", "v1.4.0", "x86_64")
        .unwrap();
    assert!(!entry.join("plugins").exists());

    let github_path = std::fs::read_to_string(harness.temp.path().join("github_path")).unwrap();
    assert_eq!(github_path.trim_end(), program.parent().unwrap().display().to_string());
}

#[tokio::test]
async fn test_failing_step_stops_the_run() {
    let downloader = publish_release(FakeDownloader::new(), "v1.4.0", relicta_archive());
    let executor = RecordingExecutor::new().with_result("notes", 1, "");
    let harness = Harness::new(downloader, executor);

    let err = harness.action().run(&inputs("FULL", "v1.4.0")).await.unwrap_err();

    assert_eq!(harness.executor.subcommands(), vec!["plan", "bump", "notes"]);
    assert!(err.to_string().contains("notes"));
}
