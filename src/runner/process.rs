//! Child process execution for relicta steps.
//!
//! Output is streamed as it arrives: stdout lines are logged at `info` and
//! buffered for output scraping, stderr lines are logged at `warn`. Both pipes
//! are drained concurrently so a chatty child cannot block on a full pipe.

use crate::constants::TOKEN_ENV_VAR;
use anyhow::{Context, Result};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// A single process launch.
///
/// `env` holds variables added on top of the inherited environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
    pub cwd: PathBuf,
}

impl Invocation {
    /// `relicta plan --dry-run` style rendering for logs.
    #[must_use]
    pub fn command_line(&self) -> String {
        let program = self
            .program
            .file_stem()
            .map_or_else(|| self.program.display().to_string(), |s| s.to_string_lossy().into_owned());
        if self.args.is_empty() {
            program
        } else {
            format!("{program} {}", self.args.join(" "))
        }
    }

    /// Value of an added environment variable.
    #[must_use]
    pub fn env_var(&self, key: &str) -> Option<&str> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env: Vec<(&str, &str)> = self
            .env
            .iter()
            .map(|(k, v)| (k.as_str(), if k == TOKEN_ENV_VAR { "***" } else { v.as_str() }))
            .collect();
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("env", &env)
            .field("cwd", &self.cwd)
            .finish()
    }
}

/// Result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit status, `-1` when the process was terminated by a signal
    pub exit_code: i32,
    /// Captured stdout, one `\n`-terminated line per line printed
    pub stdout: String,
}

impl ProcessOutput {
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches processes for the command runner.
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Run `invocation` to completion.
    ///
    /// A non-zero exit is reported through [`ProcessOutput::exit_code`]; only
    /// failures to start or read from the process are errors.
    async fn execute(&self, invocation: &Invocation) -> Result<ProcessOutput>;
}

/// [`ProcessExecutor`] spawning real processes with tokio.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessExecutor;

#[async_trait]
impl ProcessExecutor for TokioProcessExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        debug!("Executing command: {} (in {})", invocation.command_line(), invocation.cwd.display());

        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        for (key, value) in &invocation.env {
            cmd.env(key, value);
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to execute {}", invocation.program.display()))?;
        let stdout = child.stdout.take().context("Child stdout was not captured")?;
        let stderr = child.stderr.take().context("Child stderr was not captured")?;

        let mut captured = String::new();
        let (out, err) = tokio::join!(
            forward_lines(stdout, |line| {
                info!("{}", line);
                captured.push_str(line);
                captured.push('\n');
            }),
            forward_lines(stderr, |line| warn!("{}", line)),
        );
        out.context("Failed to read command stdout")?;
        err.context("Failed to read command stderr")?;

        let status = child.wait().await.context("Failed to wait for command")?;
        let exit_code = status.code().unwrap_or(-1);
        debug!("{} exited with {}", invocation.command_line(), exit_code);

        Ok(ProcessOutput {
            exit_code,
            stdout: captured,
        })
    }
}

/// Feed each line of `reader` to `on_line` without its line terminator.
///
/// Invalid UTF-8 is replaced rather than treated as an error.
async fn forward_lines<R, F>(reader: R, mut on_line: F) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    F: FnMut(&str),
{
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        on_line(line.trim_end_matches(['\n', '\r']));
    }
}
