//! Command-line interface for the relicta action.
//!
//! The action binary is normally started by the runner with its inputs in
//! `INPUT_*` variables and no arguments at all. Every input can also be given
//! as a flag, which is how the action is run locally:
//!
//! ```bash
//! GITHUB_TOKEN=ghp_... relicta-action --command plan --dry-run
//! relicta-action --tool-version v1.4.0 --command "plugin list" --token ghp_...
//! relicta-action --plugins github,slack --auto-approve --verbose
//! ```
//!
//! Flags win over `INPUT_*` variables, which win over the defaults.
//!
//! # Global Options
//!
//! - `--verbose` - Enable debug output
//! - `--quiet` - Only log errors


use crate::action::Action;
use crate::actions::{ActionInputs, InputOverrides, is_github_actions, write_outputs};
use crate::platform::{HostEnvironment, SystemEnvironment};
use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

/// Install relicta and run its release workflow as a GitHub Action step.
#[derive(Parser, Debug)]
#[command(
    name = "relicta-action",
    about = "Install relicta and run its release workflow",
    version,
    long_about = "Downloads and verifies the relicta release binary for this runner, \
                  installs requested plugins, and runs plan/bump/notes/approve/publish."
)]
pub struct Cli {
    /// Enable debug output. Equivalent to `RUST_LOG=debug`.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// relicta release to install (`latest` or a tag such as `v1.4.0`).
    #[arg(long, value_name = "VERSION")]
    tool_version: Option<String>,

    /// `full`, `plan`, `bump`, `notes`, `approve`, `publish`, or any relicta
    /// command line to pass through.
    #[arg(long)]
    command: Option<String>,

    /// GitHub token passed to relicta as `GITHUB_TOKEN`.
    #[arg(long, value_name = "TOKEN")]
    token: Option<String>,

    /// Path of a relicta configuration file.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,

    /// Inline relicta configuration; takes precedence over `--config`.
    #[arg(long, value_name = "YAML")]
    config_content: Option<String>,

    /// Approve the release without confirmation.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    auto_approve: Option<bool>,

    /// Run relicta without making changes.
    #[arg(long, num_args = 0..=1, default_missing_value = "true", value_name = "BOOL")]
    dry_run: Option<bool>,

    /// Directory relicta runs in.
    #[arg(long, value_name = "DIR")]
    working_directory: Option<PathBuf>,

    /// Comma separated plugins to install, e.g. `github,slack`.
    #[arg(long, value_name = "LIST")]
    plugins: Option<String>,
}

/// Runtime settings derived from the global flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// Level for the action's own log events
    pub log_level: String,
    /// Emit workflow commands (log groups, annotations)
    pub annotate: bool,
}

impl Cli {
    /// Build a [`CliConfig`] from the parsed flags and the environment.
    #[must_use]
    pub fn build_config(&self, env: &dyn HostEnvironment) -> CliConfig {
        let log_level = if self.verbose {
            "debug"
        } else if self.quiet {
            "error"
        } else {
            "info"
        };

        CliConfig {
            log_level: log_level.to_string(),
            annotate: is_github_actions(env),
        }
    }

    /// Inputs given as flags.
    #[must_use]
    pub fn overrides(&self) -> InputOverrides {
        InputOverrides {
            version: self.tool_version.clone(),
            command: self.command.clone(),
            token: self.token.clone(),
            config: self.config.clone(),
            config_content: self.config_content.clone(),
            auto_approve: self.auto_approve,
            dry_run: self.dry_run,
            working_directory: self.working_directory.clone(),
            plugins: self.plugins.clone(),
        }
    }

    /// Run the action against the real process environment.
    pub async fn execute(self) -> Result<()> {
        let env: Arc<dyn HostEnvironment> = Arc::new(SystemEnvironment);
        let inputs = ActionInputs::resolve(env.as_ref(), self.overrides())?;
        let action = Action::with_defaults(Arc::clone(&env))?;
        Self::execute_with_action(env.as_ref(), &action, &inputs).await
    }

    /// Run a prepared [`Action`] and publish its outputs.
    pub async fn execute_with_action(
        env: &dyn HostEnvironment,
        action: &Action,
        inputs: &ActionInputs,
    ) -> Result<()> {
        debug!("Resolved inputs: {:?}", inputs);

        let outputs = action.run(inputs).await?;
        let destination = write_outputs(env, &outputs)?;
        debug!("Outputs written to {:?}", destination);

        Ok(())
    }
}
