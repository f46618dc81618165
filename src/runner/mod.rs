//! Running relicta steps.
//!
//! The `command` input selects what to run:
//!
//! | command   | invocations                                      | scraped  |
//! |-----------|--------------------------------------------------|----------|
//! | `full`    | `plan`, `bump`, `notes`, `approve`, `publish`    | publish  |
//! | `plan`    | `plan`                                           | -        |
//! | `bump`    | `bump`                                           | -        |
//! | `notes`   | `notes`                                          | -        |
//! | `approve` | `approve` (`--yes` with auto-approve)            | -        |
//! | `publish` | `publish`                                        | publish  |
//! | other     | the text split on whitespace                     | -        |
//!
//! Names match case-insensitively. Every invocation gets the common flags
//! (`--config <path>`, `--dry-run`) and runs in the working directory with
//! `GITHUB_TOKEN` set. Steps run in order and the first failure stops the run.

pub mod outputs;
pub mod process;

pub use outputs::{ActionOutputs, OutputParser, RegexOutputParser};
pub use process::{Invocation, ProcessExecutor, ProcessOutput, TokioProcessExecutor};

use crate::actions::{ActionInputs, LogGroup};
use crate::constants::{AUTO_APPROVE_FLAG, DRY_RUN_ENV_VAR, TOKEN_ENV_VAR};
use crate::core::ActionError;
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// High-level command requested through the `command` input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReleaseCommand {
    Full,
    Plan,
    Bump,
    Notes,
    Approve,
    Publish,
    /// Anything else, forwarded to relicta as argv
    Passthrough(Vec<String>),
}

impl ReleaseCommand {
    #[must_use]
    pub fn parse(command: &str) -> Self {
        match command.trim().to_lowercase().as_str() {
            "full" => Self::Full,
            "plan" => Self::Plan,
            "bump" => Self::Bump,
            "notes" => Self::Notes,
            "approve" => Self::Approve,
            "publish" => Self::Publish,
            _ => Self::Passthrough(command.split_whitespace().map(str::to_string).collect()),
        }
    }
}

/// One relicta invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Name reported when the step fails
    pub name: String,
    pub args: Vec<String>,
    /// Whether stdout feeds the output parser
    pub scrape: bool,
}

impl Step {
    fn subcommand(name: &str, auto_approve: bool, common: &[String]) -> Self {
        let mut args = vec![name.to_string()];
        if name == "approve" && auto_approve {
            args.push(AUTO_APPROVE_FLAG.to_string());
        }
        args.extend_from_slice(common);

        Self {
            name: name.to_string(),
            args,
            scrape: name == "publish",
        }
    }
}

/// Expand `command` into the invocations to run, in order.
#[must_use]
pub fn plan_steps(command: &ReleaseCommand, auto_approve: bool, common: &[String]) -> Vec<Step> {
    let single = |name: &str| vec![Step::subcommand(name, auto_approve, common)];

    match command {
        ReleaseCommand::Full => ["plan", "bump", "notes", "approve", "publish"]
            .into_iter()
            .map(|name| Step::subcommand(name, auto_approve, common))
            .collect(),
        ReleaseCommand::Plan => single("plan"),
        ReleaseCommand::Bump => single("bump"),
        ReleaseCommand::Notes => single("notes"),
        ReleaseCommand::Approve => single("approve"),
        ReleaseCommand::Publish => single("publish"),
        ReleaseCommand::Passthrough(argv) => {
            let mut args = argv.clone();
            args.extend_from_slice(common);
            vec![Step {
                name: argv.join(" "),
                args,
                scrape: false,
            }]
        }
    }
}

/// Flags shared by every invocation of a run.
///
/// Inline configuration is written to a temporary `.yaml` file owned by this
/// value; the file is deleted when it is dropped, whatever way the run ends.
#[derive(Debug)]
pub struct CommonArgs {
    args: Vec<String>,
    config_file: Option<NamedTempFile>,
}

impl CommonArgs {
    pub fn prepare(inputs: &ActionInputs) -> Result<Self> {
        let mut args = Vec::new();
        let mut config_file = None;

        if let Some(content) = inputs.config_content.as_deref().filter(|c| !c.is_empty()) {
            let mut file = tempfile::Builder::new()
                .prefix("release-config-")
                .suffix(".yaml")
                .tempfile()
                .context("Failed to create temporary config file")?;
            file.write_all(content.as_bytes())
                .and_then(|()| file.flush())
                .context("Failed to write temporary config file")?;
            debug!("Wrote inline configuration to {}", file.path().display());

            args.push("--config".to_string());
            args.push(file.path().display().to_string());
            config_file = Some(file);
        } else if let Some(path) = inputs.config.as_deref().filter(|p| !p.is_empty()) {
            args.push("--config".to_string());
            args.push(path.to_string());
        }

        if inputs.dry_run {
            args.push("--dry-run".to_string());
        }

        Ok(Self {
            args,
            config_file,
        })
    }

    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Temporary file holding inline configuration, if any.
    #[must_use]
    pub fn config_file(&self) -> Option<&Path> {
        self.config_file.as_ref().map(NamedTempFile::path)
    }
}

/// Runs relicta steps and scrapes their outputs.
pub struct CommandRunner<'a> {
    binary: PathBuf,
    executor: &'a dyn ProcessExecutor,
    parser: &'a dyn OutputParser,
    search_path: Option<String>,
    annotate: bool,
}

impl<'a> CommandRunner<'a> {
    pub fn new(
        binary: impl Into<PathBuf>,
        executor: &'a dyn ProcessExecutor,
        parser: &'a dyn OutputParser,
    ) -> Self {
        Self {
            binary: binary.into(),
            executor,
            parser,
            search_path: None,
            annotate: false,
        }
    }

    /// Current `PATH`; relicta's directory is prepended to it for the steps.
    #[must_use]
    pub fn with_search_path(mut self, search_path: Option<String>) -> Self {
        self.search_path = search_path;
        self
    }

    /// Wrap each step in a workflow log group.
    #[must_use]
    pub const fn with_annotations(mut self, annotate: bool) -> Self {
        self.annotate = annotate;
        self
    }

    /// Variables added to the inherited environment of every step.
    #[must_use]
    pub fn environment(&self, inputs: &ActionInputs) -> Vec<(String, String)> {
        let mut env = vec![(TOKEN_ENV_VAR.to_string(), inputs.token.clone())];
        if inputs.dry_run {
            env.push((DRY_RUN_ENV_VAR.to_string(), "true".to_string()));
        }

        if let Some(dir) = self.binary.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            match prepend_search_path(dir, self.search_path.as_deref()) {
                Some(path) => env.push(("PATH".to_string(), path)),
                None => warn!("Could not add {} to PATH", dir.display()),
            }
        }

        env
    }

    /// Run the steps selected by `inputs.command`.
    ///
    /// Returns the outputs scraped from `publish`, or empty outputs when no
    /// step is scraped.
    pub async fn run(&self, inputs: &ActionInputs) -> Result<ActionOutputs> {
        let command = ReleaseCommand::parse(&inputs.command);
        let common = CommonArgs::prepare(inputs)?;
        let steps = plan_steps(&command, inputs.auto_approve, common.args());
        let env = self.environment(inputs);

        let mut outputs = ActionOutputs::default();
        for step in &steps {
            let stdout = self.run_step(step, &env, &inputs.working_directory).await?;
            if step.scrape {
                outputs = self.parser.parse(&stdout);
            }
        }

        Ok(outputs)
    }

    async fn run_step(&self, step: &Step, env: &[(String, String)], cwd: &Path) -> Result<String> {
        let invocation = Invocation {
            program: self.binary.clone(),
            args: step.args.clone(),
            env: env.to_vec(),
            cwd: cwd.to_path_buf(),
        };

        let _group = LogGroup::start(self.annotate, &format!("Running: {}", invocation.command_line()));
        let output = self.executor.execute(&invocation).await?;

        if !output.success() {
            return Err(ActionError::CommandFailed {
                command: step.name.clone(),
                exit_code: output.exit_code,
            }
            .into());
        }

        Ok(output.stdout)
    }
}

fn prepend_search_path(dir: &Path, existing: Option<&str>) -> Option<String> {
    let mut paths = vec![dir.to_path_buf()];
    if let Some(existing) = existing.filter(|p| !p.is_empty()) {
        paths.extend(std::env::split_paths(existing));
    }
    std::env::join_paths(paths).ok()?.into_string().ok()
}
