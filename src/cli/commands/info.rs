//! Info command implementation

use crate::cli::commands::InfoArgs;
use crate::cli::logging::{log, LogLevel};
use crate::data::Dataset;
use crate::error::Result;

pub fn run_info(args: InfoArgs, level: LogLevel) -> Result<()> {
    let dataset = Dataset::discover(&args.data_dir)?;
    let (clear, cloud) = dataset.class_counts()?;

    log(level, LogLevel::Normal, "Dataset Info:");
    println!();
    println!("Directory: {}", args.data_dir.display());
    println!("Frames: {}", dataset.len());
    println!(
        "Dimensions: {}x{} px ({} features per frame)",
        dataset.width,
        dataset.height,
        dataset.features()
    );
    println!("Labels: {clear} clear, {cloud} cloud");

    if clear == 0 || cloud == 0 {
        println!();
        println!("Warning: only one class present; training would have nothing to separate");
    }

    Ok(())
}
