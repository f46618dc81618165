//! One run of the action: install relicta, install plugins, run the steps.

use crate::actions::{ActionInputs, LogGroup, add_path, is_github_actions};
use crate::download::HttpDownloader;
use crate::installer::Installer;
use crate::platform::HostEnvironment;
use crate::runner::{
    ActionOutputs, CommandRunner, OutputParser, ProcessExecutor, RegexOutputParser,
    TokioProcessExecutor,
};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

/// Everything a run needs, wired together.
pub struct Action {
    env: Arc<dyn HostEnvironment>,
    installer: Installer,
    executor: Arc<dyn ProcessExecutor>,
    parser: Arc<dyn OutputParser>,
}

impl Action {
    pub fn new(
        env: Arc<dyn HostEnvironment>,
        installer: Installer,
        executor: Arc<dyn ProcessExecutor>,
        parser: Arc<dyn OutputParser>,
    ) -> Self {
        Self {
            env,
            installer,
            executor,
            parser,
        }
    }

    /// Action downloading over HTTPS and running real processes.
    pub fn with_defaults(env: Arc<dyn HostEnvironment>) -> Result<Self> {
        let downloader = Arc::new(HttpDownloader::new()?);
        let installer = Installer::new(Arc::clone(&env), downloader);
        Ok(Self::new(
            env,
            installer,
            Arc::new(TokioProcessExecutor),
            Arc::new(RegexOutputParser::new()?),
        ))
    }

    /// Install relicta and the requested plugins, then run the command.
    ///
    /// Returns the outputs scraped from `publish`; the caller publishes them.
    pub async fn run(&self, inputs: &ActionInputs) -> Result<ActionOutputs> {
        let env = self.env.as_ref();
        let annotate = is_github_actions(env);

        let mut binary = {
            let _group = LogGroup::start(annotate, "Install relicta");
            self.installer.install_main(&inputs.version).await?
        };

        if !inputs.plugins.is_empty() {
            let _group = LogGroup::start(annotate, "Install plugins");
            let report = self.installer.install_plugins(&inputs.version, &inputs.plugins, &binary).await;
            if report.is_complete() {
                info!("Installed {} plugin(s)", report.installed.len());
            } else {
                let failed: Vec<&str> = report.failed.iter().map(|(name, _)| name.as_str()).collect();
                warn!(
                    "Installed {} of {} plugin(s); failed: {}",
                    report.installed.len(),
                    inputs.plugins.len(),
                    failed.join(", ")
                );
            }
            // The run-scoped copy is the one that sees the plugins
            if let Some(staged) = report.binary {
                binary = staged;
            }
        }

        if let Some(dir) = binary.parent() {
            match add_path(env, dir) {
                Ok(true) => info!("Added {} to PATH", dir.display()),
                Ok(false) => {}
                Err(e) => warn!("Failed to add {} to PATH: {:#}", dir.display(), e),
            }
        }

        let runner = CommandRunner::new(&binary, self.executor.as_ref(), self.parser.as_ref())
            .with_search_path(env.var("PATH"))
            .with_annotations(annotate);
        let outputs = runner.run(inputs).await?;

        for (name, value) in outputs.entries() {
            info!("Output {}: {}", name, value);
        }

        Ok(outputs)
    }
}
