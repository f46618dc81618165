//! Step inputs.
//!
//! GitHub passes `with:` values as `INPUT_<NAME>` variables, the name upper
//! cased with spaces replaced by underscores (hyphens are kept, so
//! `github-token` arrives as `INPUT_GITHUB-TOKEN`). Values given on the
//! command line take precedence, which makes local runs possible.

use crate::constants::{LATEST_VERSION, TOKEN_ENV_VAR};
use crate::core::ActionError;
use crate::platform::HostEnvironment;
use std::fmt;
use std::path::PathBuf;

/// Everything a run is configured with. Built once at startup.
#[derive(Clone, PartialEq, Eq)]
pub struct ActionInputs {
    /// relicta release to install, `latest` by default
    pub version: String,
    /// `full`, a single subcommand, or a command line to pass through
    pub command: String,
    pub token: String,
    /// Path of a configuration file
    pub config: Option<String>,
    /// Inline configuration, takes precedence over `config`
    pub config_content: Option<String>,
    pub auto_approve: bool,
    pub dry_run: bool,
    pub working_directory: PathBuf,
    pub plugins: Vec<String>,
}

impl Default for ActionInputs {
    fn default() -> Self {
        Self {
            version: LATEST_VERSION.to_string(),
            command: "full".to_string(),
            token: String::new(),
            config: None,
            config_content: None,
            auto_approve: false,
            dry_run: false,
            working_directory: PathBuf::from("."),
            plugins: Vec::new(),
        }
    }
}

impl fmt::Debug for ActionInputs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionInputs")
            .field("version", &self.version)
            .field("command", &self.command)
            .field("token", &"***")
            .field("config", &self.config)
            .field("config_content", &self.config_content.as_ref().map(|_| "<inline>"))
            .field("auto_approve", &self.auto_approve)
            .field("dry_run", &self.dry_run)
            .field("working_directory", &self.working_directory)
            .field("plugins", &self.plugins)
            .finish()
    }
}

/// Values set on the command line, overriding `INPUT_*` variables.
#[derive(Debug, Clone, Default)]
pub struct InputOverrides {
    pub version: Option<String>,
    pub command: Option<String>,
    pub token: Option<String>,
    pub config: Option<String>,
    pub config_content: Option<String>,
    pub auto_approve: Option<bool>,
    pub dry_run: Option<bool>,
    pub working_directory: Option<PathBuf>,
    pub plugins: Option<String>,
}

impl ActionInputs {
    /// Resolve every input as override, then `INPUT_*` variable, then default.
    ///
    /// Fails with [`ActionError::MissingToken`] when neither the
    /// `github-token` input nor `GITHUB_TOKEN` provides a token, and with
    /// [`ActionError::InvalidInput`] for a malformed boolean or a blank
    /// `--command` override. A blank `command` input means the default.
    pub fn resolve(env: &dyn HostEnvironment, overrides: InputOverrides) -> Result<Self, ActionError> {
        let defaults = Self::default();
        let input = |name: &str| get_input(env, name);

        let token = overrides
            .token
            .filter(|t| !t.trim().is_empty())
            .or_else(|| input("github-token"))
            .or_else(|| env.var(TOKEN_ENV_VAR).filter(|t| !t.trim().is_empty()))
            .ok_or(ActionError::MissingToken)?;

        let auto_approve = match overrides.auto_approve {
            Some(value) => value,
            None => parse_bool_input("auto-approve", input("auto-approve").as_deref())?,
        };
        let dry_run = match overrides.dry_run {
            Some(value) => value,
            None => parse_bool_input("dry-run", input("dry-run").as_deref())?,
        };

        let command = match overrides.command {
            Some(command) if command.trim().is_empty() => {
                return Err(ActionError::InvalidInput {
                    name: "command".to_string(),
                    reason: "a command is required".to_string(),
                });
            }
            Some(command) => command,
            None => input("command").unwrap_or(defaults.command),
        };

        let plugins = overrides
            .plugins
            .or_else(|| input("plugins"))
            .map(|list| parse_plugin_list(&list))
            .unwrap_or_default();

        Ok(Self {
            version: overrides.version.or_else(|| input("version")).unwrap_or(defaults.version),
            command,
            token,
            config: overrides.config.or_else(|| input("config")),
            config_content: overrides.config_content.or_else(|| raw_input(env, "config-content")),
            auto_approve,
            dry_run,
            working_directory: overrides
                .working_directory
                .or_else(|| input("working-directory").map(PathBuf::from))
                .unwrap_or(defaults.working_directory),
            plugins,
        })
    }
}

/// Environment variable GitHub uses for the input `name`.
#[must_use]
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Trimmed value of input `name`; empty counts as unset.
#[must_use]
pub fn get_input(env: &dyn HostEnvironment, name: &str) -> Option<String> {
    env.var(&input_env_name(name)).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

// Multi-line inputs keep their whitespace
fn raw_input(env: &dyn HostEnvironment, name: &str) -> Option<String> {
    env.var(&input_env_name(name)).filter(|v| !v.trim().is_empty())
}

/// Parse a boolean input; unset or empty is `false`.
pub fn parse_bool_input(name: &str, value: Option<&str>) -> Result<bool, ActionError> {
    match value.map(str::trim).unwrap_or_default() {
        "" | "false" | "False" | "FALSE" => Ok(false),
        "true" | "True" | "TRUE" => Ok(true),
        other => Err(ActionError::InvalidInput {
            name: name.to_string(),
            reason: format!("'{other}' is not a boolean (use true or false)"),
        }),
    }
}

/// Split a comma separated plugin list, dropping empty entries.
#[must_use]
pub fn parse_plugin_list(list: &str) -> Vec<String> {
    list.split(',').map(str::trim).filter(|p| !p.is_empty()).map(str::to_string).collect()
}
