//! relicta action entry point
//!
//! Parses flags, sets up logging, and runs the action. Any failure is reported
//! with context and suggestions, annotated as a workflow error when running
//! inside GitHub Actions, and ends the process with exit status 1.

use clap::Parser;
use relicta_action::actions::{error_annotation, init_logging};
use relicta_action::cli;
use relicta_action::core::user_friendly_error;
use relicta_action::platform::SystemEnvironment;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();
    let config = cli.build_config(&SystemEnvironment);

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    if let Err(e) = init_logging(&config.log_level, config.annotate) {
        eprintln!("{e:#}");
    }

    if let Err(e) = cli.execute().await {
        if config.annotate {
            println!("{}", error_annotation(&e.to_string()));
        }
        let error_ctx = user_friendly_error(e);
        error_ctx.display();
        std::process::exit(1);
    }
}
