//! Logging setup for the action binary.
//!
//! Inside GitHub Actions log events are written to stdout as workflow
//! commands: warnings and errors become `::warning::` / `::error::`
//! annotations and debug events `::debug::` lines, which the runner only
//! shows with step debugging enabled. Outside of Actions a plain formatter
//! writes to stderr, keeping stdout free for the JSON outputs.

use super::commands::escape_data;
use anyhow::{Context, Result};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::FmtContext;
use tracing_subscriber::registry::LookupSpan;

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level`. Dependencies only log warnings and errors
/// unless `RUST_LOG` says otherwise.
pub fn init_logging(level: &str, annotate: bool) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(format!("warn,relicta_action={level}"))
            .with_context(|| format!("Invalid log level: {level}"))?,
    };

    let result = if annotate {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .event_format(WorkflowCommandFormat)
            .try_init()
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to initialize logging: {e}"))
}

/// Render one log line as a workflow command.
#[must_use]
pub fn workflow_line(level: Level, message: &str) -> String {
    let command = match level {
        Level::ERROR => "error",
        Level::WARN => "warning",
        Level::INFO => return message.to_string(),
        _ => "debug",
    };
    format!("::{command}::{}", escape_data(message))
}

/// Event formatter emitting workflow commands.
#[derive(Debug, Clone, Copy, Default)]
pub struct WorkflowCommandFormat;

impl<S, N> FormatEvent<S, N> for WorkflowCommandFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut message = String::new();
        ctx.format_fields(format::Writer::new(&mut message), event)?;
        writeln!(writer, "{}", workflow_line(*event.metadata().level(), &message))
    }
}
