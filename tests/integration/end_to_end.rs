//! Real processes: the release archive contains a shell script standing in
//! for relicta that records its arguments and prints a publish summary.

use super::publish_release;
use relicta_action::action::Action;
use relicta_action::actions::ActionInputs;
use relicta_action::cache::ToolCache;
use relicta_action::cli::Cli;
use relicta_action::core::ActionError;
use relicta_action::installer::Installer;
use relicta_action::runner::{RegexOutputParser, TokioProcessExecutor};
use relicta_action::test_utils::{FakeDownloader, MockEnvironment, build_tar_gz};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

fn fake_relicta(log: &Path) -> String {
    format!(
        r#"#!/bin/sh
echo "$* token=$GITHUB_TOKEN dry=$RELICTA_DRY_RUN cwd=$(pwd)" >> "{log}"
case "$1" in
  notes)
    if [ -f fail-notes ]; then
      echo "notes exploded" >&2
      exit 3
    fi
    ;;
  publish)
    echo "Publishing release..."
    echo "Version: 2.0.0"
    echo "Release URL: https://github.com/acme/app/releases/tag/v2.0.0"
    echo "Release ID: 555"
    ;;
esac
exit 0
"#,
        log = log.display()
    )
}

struct Setup {
    temp: TempDir,
    env: Arc<MockEnvironment>,
    action: Action,
}

fn setup() -> Setup {
    let temp = TempDir::new().unwrap();
    let workspace = temp.path().join("workspace");
    std::fs::create_dir_all(&workspace).unwrap();

    let script = fake_relicta(&temp.path().join("calls.log"));
    let archive = build_tar_gz(&[("relicta", script.as_bytes())]);
    let downloader = Arc::new(publish_release(FakeDownloader::new(), "v2.0.0", archive));

    let env = Arc::new(
        MockEnvironment::new("linux", "x64")
            .with_var("PATH", std::env::var("PATH").unwrap_or_default())
            .with_var("GITHUB_OUTPUT", temp.path().join("github_output").display().to_string()),
    );
    let installer = Installer::new(env.clone(), downloader)
        .with_cache(ToolCache::new(temp.path().join("toolcache")))
        .with_work_root(temp.path().join("tmp"));
    let action = Action::new(
        env.clone(),
        installer,
        Arc::new(TokioProcessExecutor),
        Arc::new(RegexOutputParser::new().unwrap()),
    );

    Setup {
        temp,
        env,
        action,
    }
}

fn inputs(setup: &Setup) -> ActionInputs {
    ActionInputs {
        version: "v2.0.0".to_string(),
        command: "full".to_string(),
        token: "ghp_e2e".to_string(),
        auto_approve: true,
        working_directory: setup.temp.path().join("workspace"),
        config_content: Some("changelog: true\n".to_string()),
        ..ActionInputs::default()
    }
}

fn calls(setup: &Setup) -> Vec<String> {
    std::fs::read_to_string(setup.temp.path().join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

#[cfg(unix)]
#[tokio::test]
async fn test_full_workflow_writes_outputs() {
    let setup = setup();
    let inputs = inputs(&setup);

    Cli::execute_with_action(setup.env.as_ref(), &setup.action, &inputs).await.unwrap();

    let calls = calls(&setup);
    let subcommands: Vec<&str> =
        calls.iter().map(|c| c.split_whitespace().next().unwrap()).collect();
    assert_eq!(subcommands, vec!["plan", "bump", "notes", "approve", "publish"]);
    assert!(calls[3].starts_with("approve --yes --config "));
    assert!(calls.iter().all(|c| c.contains("token=ghp_e2e dry= ")));
    assert!(calls.iter().all(|c| c.contains("workspace")));

    let output = std::fs::read_to_string(setup.temp.path().join("github_output")).unwrap();
    let values: Vec<&str> =
        output.lines().filter(|l| !l.contains("ghadelimiter_")).collect();
    assert_eq!(
        values,
        vec!["2.0.0", "https://github.com/acme/app/releases/tag/v2.0.0", "v2.0.0", "555"]
    );
    assert!(output.contains("release-url<<ghadelimiter_"));
}

#[cfg(unix)]
#[tokio::test]
async fn test_failing_step_reports_exit_code_and_skips_outputs() {
    let setup = setup();
    std::fs::write(setup.temp.path().join("workspace").join("fail-notes"), "").unwrap();
    let inputs = inputs(&setup);

    let err = Cli::execute_with_action(setup.env.as_ref(), &setup.action, &inputs)
        .await
        .unwrap_err();

    match err.downcast_ref::<ActionError>() {
        Some(ActionError::CommandFailed {
            command,
            exit_code,
        }) => {
            assert_eq!(command, "notes");
            assert_eq!(*exit_code, 3);
        }
        other => panic!("Expected CommandFailed, got {other:?}"),
    }
    assert_eq!(calls(&setup).len(), 3);
    assert!(!setup.temp.path().join("github_output").exists());

    // Inline configuration never outlives the run
    let config = calls(&setup)[0].split_whitespace().nth(2).unwrap().to_string();
    assert!(config.contains("release-config-"));
    assert!(!Path::new(&config).exists());
}
