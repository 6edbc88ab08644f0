//! Command-line interface
//!
//! Argument parsing, the three command handlers, and the level-gated
//! console logger shared with the training loop.

mod commands;
pub mod logging;

pub use commands::{
    apply_overrides, parse_args, run_command, Cli, Command, InfoArgs, TrainArgs, ValidateArgs,
};
pub use logging::LogLevel;
