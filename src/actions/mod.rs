//! GitHub Actions plumbing.
//!
//! - [`inputs`] - reading `INPUT_*` step inputs into [`ActionInputs`]
//! - [`commands`] - step outputs, `GITHUB_PATH`, log groups and annotations
//! - [`logging`] - tracing subscriber that speaks workflow commands

pub mod commands;
pub mod inputs;
pub mod logging;

pub use commands::{
    LogGroup, OutputDestination, add_path, error_annotation, escape_data, is_github_actions,
    write_outputs,
};
pub use inputs::{ActionInputs, InputOverrides, input_env_name, parse_bool_input, parse_plugin_list};
pub use logging::init_logging;
