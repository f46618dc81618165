use crate::runner::{Invocation, ProcessExecutor, ProcessOutput};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

/// [`ProcessExecutor`] that records invocations instead of running them.
///
/// Results are scripted per subcommand (the first argument); anything not
/// scripted exits 0 with no output. When an invocation passes `--config`,
/// the file content at execution time is recorded too, so tests can check
/// inline configuration without racing its cleanup.
#[derive(Debug, Default)]
pub struct RecordingExecutor {
    results: HashMap<String, ProcessOutput>,
    invocations: Mutex<Vec<Invocation>>,
    configs: Mutex<Vec<Option<String>>>,
}

impl RecordingExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_result(mut self, subcommand: &str, exit_code: i32, stdout: &str) -> Self {
        self.results.insert(
            subcommand.to_string(),
            ProcessOutput {
                exit_code,
                stdout: stdout.to_string(),
            },
        );
        self
    }

    pub fn invocations(&self) -> Vec<Invocation> {
        self.invocations.lock().unwrap().clone()
    }

    /// First argument of every invocation, in order.
    pub fn subcommands(&self) -> Vec<String> {
        self.invocations().iter().filter_map(|inv| inv.args.first().cloned()).collect()
    }

    /// Content of the `--config` file seen by each invocation.
    pub fn configs(&self) -> Vec<Option<String>> {
        self.configs.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessExecutor for RecordingExecutor {
    async fn execute(&self, invocation: &Invocation) -> Result<ProcessOutput> {
        let config = invocation
            .args
            .iter()
            .position(|arg| arg == "--config")
            .and_then(|i| invocation.args.get(i + 1))
            .and_then(|path| std::fs::read_to_string(path).ok());
        self.configs.lock().unwrap().push(config);
        self.invocations.lock().unwrap().push(invocation.clone());

        let subcommand = invocation.args.first().map(String::as_str).unwrap_or_default();
        Ok(self.results.get(subcommand).cloned().unwrap_or_default())
    }
}
