//! Train command implementation
//!
//! The full pipeline: load and validate the configuration, discover the
//! dataset, split it, compute normalization statistics from the training
//! split only, train with early stopping, and render every report from the
//! final evaluation of the best checkpoint.

use crate::cli::commands::{apply_overrides, TrainArgs};
use crate::cli::logging::{log, LogLevel};
use crate::config::RunConfig;
use crate::data::{split_dataset, BatchSource, Dataset, PixelStats};
use crate::error::Result;
use crate::eval::{roc_curve, BinaryConfusion, ClassificationReport, DECISION_THRESHOLD};
use crate::model::{LogisticModel, Model, ModelSpec};
use crate::report::{
    render_classification_report, render_confusion_matrix, render_loss_accuracy_curves, render_roc,
};
use crate::train::Trainer;

pub fn run_train(args: TrainArgs, level: LogLevel) -> Result<()> {
    log(
        level,
        LogLevel::Normal,
        &format!("Nublar: training from {}", args.config.display()),
    );

    let mut config = RunConfig::from_yaml_file(&args.config)?;
    apply_overrides(&mut config, &args);
    config.validate()?;

    let dataset = Dataset::discover(&config.data_dir)?;
    let (clear, cloud) = dataset.class_counts()?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Dataset: {} frames of {}x{} px ({clear} clear, {cloud} cloud)",
            dataset.len(),
            dataset.width,
            dataset.height
        ),
    );

    let split = split_dataset(&dataset.pairs, config.train_fraction, config.seed)?;
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Split: {} train / {} test",
            split.train.len(),
            split.test.len()
        ),
    );

    // Normalization statistics come from the training split alone; the
    // held-out frames contribute nothing.
    let stats = PixelStats::from_pairs(&split.train)?;
    log(
        level,
        LogLevel::Verbose,
        &format!(
            "Pixel stats: mean {:.2}, std {:.2}, range [{:.0}, {:.0}]",
            stats.mean, stats.std, stats.min, stats.max
        ),
    );

    let train_source = BatchSource::new(
        split.train,
        dataset.width,
        dataset.height,
        config.batch_size,
        config.normalize,
        stats,
        config.shuffle,
    )?;
    let val_source = BatchSource::new(
        split.test,
        dataset.width,
        dataset.height,
        config.batch_size,
        config.normalize,
        stats,
        false,
    )?;

    let model = LogisticModel::new(&ModelSpec {
        features: dataset.features(),
        optimizer: config.optimizer,
        momentum: config.momentum,
        learning_rate: config.learning_rate,
        min_learning_rate: config.min_learning_rate,
        epochs: config.epochs,
        batches_per_epoch: train_source.num_batches(),
        seed: config.seed,
    })?;
    let tag = config.run_tag(model.name());
    let checkpoint_path = config.checkpoint_path(model.name());

    let outcome = Trainer::new(
        &config,
        model,
        &train_source,
        &val_source,
        checkpoint_path,
        level,
    )
    .run()?;

    // Every report is computed from the final-evaluation scores of the
    // best checkpoint, never from the last epoch's weights.
    let scores = outcome.scores.to_vec();
    let truths = outcome.truths.to_vec();
    let plots_dir = config.plots_dir();

    let mut artifacts = render_loss_accuracy_curves(&outcome.history, &plots_dir, &tag)?;
    artifacts.push(render_confusion_matrix(
        &scores,
        &truths,
        &plots_dir,
        &tag,
        "Cloud Classifier Confusion Matrix",
    )?);
    artifacts.extend(render_roc(
        &scores,
        &truths,
        &plots_dir,
        &tag,
        args.roc_csv,
    )?);
    artifacts.push(render_classification_report(
        &scores, &truths, &plots_dir, &tag,
    )?);

    let confusion = BinaryConfusion::from_scores(&scores, &truths, DECISION_THRESHOLD)?;
    let curve = roc_curve(&scores, &truths)?;
    log(
        level,
        LogLevel::Normal,
        &format!(
            "Test accuracy: {:.4} (AUC {:.4}) over {} held-out frames",
            confusion.accuracy(),
            curve.auc,
            confusion.total()
        ),
    );
    log(
        level,
        LogLevel::Verbose,
        &format!("\n{}", ClassificationReport::from_confusion(&confusion)),
    );

    log(
        level,
        LogLevel::Normal,
        &format!(
            "Checkpoint: {} (epoch {}, val_loss {:.6})",
            outcome.checkpoint_path.display(),
            outcome.best_epoch,
            outcome.best_val_loss
        ),
    );
    log(
        level,
        LogLevel::Normal,
        &format!("Reports in {}", plots_dir.display()),
    );
    for path in &artifacts {
        log(
            level,
            LogLevel::Verbose,
            &format!("  wrote {}", path.display()),
        );
    }

    log(
        level,
        LogLevel::Normal,
        &format!("Training complete in {:.1}s", outcome.elapsed_secs),
    );
    Ok(())
}
