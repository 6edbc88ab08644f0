//! Validate command implementation

use crate::cli::commands::ValidateArgs;
use crate::cli::logging::{log, LogLevel};
use crate::config::RunConfig;
use crate::error::Result;
use crate::model::OptimizerKind;

/// Format the data section of a configuration as an indented block
pub fn format_data_info(config: &RunConfig) -> String {
    format!(
        "  Data dir: {}\n  Dataset: {}\n  Train fraction: {}\n  Normalize: {:?}",
        config.data_dir.display(),
        config.dataset,
        config.train_fraction,
        config.normalize
    )
}

/// Format the optimizer section of a configuration as an indented block
pub fn format_optimizer_info(config: &RunConfig) -> String {
    let mut lines = vec![
        format!("  Optimizer: {}", config.optimizer.as_str()),
        format!(
            "  Learning rate: {} (floor {})",
            config.learning_rate, config.min_learning_rate
        ),
    ];
    if config.optimizer == OptimizerKind::Sgd {
        lines.push(format!("  Momentum: {}", config.momentum));
    }
    lines.join("\n")
}

/// Format the training section of a configuration as an indented block
pub fn format_training_info(config: &RunConfig) -> String {
    format!(
        "  Epochs: {}\n  Batch size: {}\n  Patience: {} (min_delta {})\n  Shuffle: {}\n  Seed: {}\n  Output dir: {}",
        config.epochs,
        config.batch_size,
        config.patience,
        config.min_delta,
        config.shuffle,
        config.seed,
        config.output_dir.display()
    )
}

/// Print the full configuration summary
pub fn print_detailed_summary(config: &RunConfig) {
    println!();
    println!("Configuration Summary:");
    println!("{}", format_data_info(config));
    println!();
    println!("{}", format_optimizer_info(config));
    println!();
    println!("{}", format_training_info(config));
}

pub fn run_validate(args: ValidateArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!("Validating config: {}", args.config.display()),
    );

    let config = RunConfig::from_yaml_file(&args.config)?;
    config.validate()?;

    log(level, LogLevel::Normal, "Configuration is valid");

    if args.detailed {
        print_detailed_summary(&config);
    }

    Ok(())
}
