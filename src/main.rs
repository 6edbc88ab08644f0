//! Nublar CLI
//!
//! Training entry point for the nublar cloud classifier library.
//!
//! # Usage
//!
//! ```bash
//! # Train from config
//! nublar train config.yaml
//!
//! # Train with overrides
//! nublar train config.yaml --epochs 100 --batch-size 64 --lr 0.001
//!
//! # Validate config
//! nublar validate config.yaml --detailed
//!
//! # Summarize a frame directory
//! nublar info /data/allsky/2024
//! ```

use clap::Parser;
use nublar::cli::{run_command, Cli};
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
