//! CLI argument parsing and command dispatch
//!
//! # Usage
//!
//! ```bash
//! nublar train config.yaml
//! nublar train config.yaml --epochs 100 --batch-size 64
//! nublar validate config.yaml --detailed
//! nublar info /data/allsky/2024
//! ```

mod info;
mod train;
mod validate;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::cli::logging::LogLevel;
use crate::config::RunConfig;
use crate::error::Result;

/// Nublar: cloud classifier training for all-sky camera frames
#[derive(Parser, Debug, Clone, PartialEq)]
#[command(name = "nublar")]
#[command(version)]
#[command(about = "Train and evaluate a binary cloud classifier on all-sky camera frames")]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Train the classifier from a YAML configuration
    Train(TrainArgs),

    /// Validate a configuration file without training
    Validate(ValidateArgs),

    /// Summarize a frame directory without training
    Info(InfoArgs),
}

/// Arguments for the train command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct TrainArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Override the frame directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Override the output directory
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Override the number of epochs
    #[arg(short, long)]
    pub epochs: Option<usize>,

    /// Override the batch size
    #[arg(short, long)]
    pub batch_size: Option<usize>,

    /// Override the learning rate
    #[arg(long)]
    pub lr: Option<f32>,

    /// Override the run seed
    #[arg(long)]
    pub seed: Option<u64>,

    /// Also write the ROC operating points as CSV
    #[arg(long)]
    pub roc_csv: bool,
}

/// Arguments for the validate command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct ValidateArgs {
    /// Path to YAML configuration file
    #[arg(value_name = "CONFIG")]
    pub config: PathBuf,

    /// Show a detailed configuration summary
    #[arg(short, long)]
    pub detailed: bool,
}

/// Arguments for the info command
#[derive(Parser, Debug, Clone, PartialEq)]
pub struct InfoArgs {
    /// Directory of frames with label sidecars
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,
}

/// Parse CLI arguments from a string slice (for testing)
pub fn parse_args<I, T>(args: I) -> std::result::Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(args)
}

/// Apply command-line overrides to a loaded [`RunConfig`].
pub fn apply_overrides(config: &mut RunConfig, args: &TrainArgs) {
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = data_dir.clone();
    }
    if let Some(output_dir) = &args.output_dir {
        config.output_dir = output_dir.clone();
    }
    if let Some(epochs) = args.epochs {
        config.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        config.batch_size = batch_size;
    }
    if let Some(lr) = args.lr {
        config.learning_rate = lr;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
}

/// Execute a CLI command based on the parsed arguments
pub fn run_command(cli: Cli) -> Result<()> {
    let level = LogLevel::from_flags(cli.verbose, cli.quiet);

    match cli.command {
        Command::Train(args) => train::run_train(args, level),
        Command::Validate(args) => validate::run_validate(args, level),
        Command::Info(args) => info::run_info(args, level),
    }
}
