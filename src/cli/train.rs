//! `riskscore train`: load, split, search, evaluate, persist

use std::time::Instant;

use anyhow::{Context, Result};
use console::style;

use super::args::TrainArgs;
use crate::pipeline::{
    evaluate_model, load_data, save_pipeline, split_data, train_model, ArtifactMetadata,
    ParamGrid, TrainConfig,
};
use crate::report::{
    display_evaluation, display_leaderboard, export_training_report, ReportParams,
    TrainingSummary,
};
use crate::utils::{
    create_spinner, finish_with_failure, finish_with_success, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
};

/// Build the training configuration from command-line arguments
pub fn train_config_from_args(args: &TrainArgs) -> Result<TrainConfig> {
    let grid = match &args.grid {
        Some(path) => ParamGrid::load(path)
            .with_context(|| format!("Failed to load grid file: {}", path.display()))?,
        None => ParamGrid::default(),
    };

    let config = TrainConfig {
        test_size: args.test_size,
        seed: args.seed,
        cv_folds: args.cv_folds,
        k_neighbors: args.k_neighbors,
        grid,
    };
    config.validate()?;
    Ok(config)
}

pub fn run_train(args: &TrainArgs) -> Result<()> {
    let config = train_config_from_args(args)?;

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&args.input, &args.output, &config);

    // Step 1: Load dataset
    print_step_header(1, "Load Data");
    let step_start = Instant::now();
    let spinner = create_spinner("Reading and cleaning dataset...");
    let dataset = match load_data(&args.input, args.infer_schema_length) {
        Ok(dataset) => dataset,
        Err(e) => {
            finish_with_failure(&spinner);
            return Err(e)
                .with_context(|| format!("Failed to load dataset: {}", args.input.display()));
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let counts = dataset.class_counts();
    print_count("applicants", dataset.len(), None);
    println!(
        "      Good: {}  Bad: {}",
        style(counts[0]).green(),
        style(counts[1]).red()
    );

    let mut summary = TrainingSummary::new(dataset.len());
    let elapsed = step_start.elapsed();
    summary.record_step("Load", elapsed);
    print_step_time(elapsed);

    // Step 2: Stratified split
    print_step_header(2, "Train/Test Split");
    let step_start = Instant::now();
    let (train, test) = split_data(&dataset, config.test_size, config.seed)
        .context("Failed to split dataset")?;
    print_success(&format!(
        "{} training rows, {} test rows (stratified, seed {})",
        train.len(),
        test.len(),
        config.seed
    ));
    summary.train_rows = train.len();
    summary.test_rows = test.len();
    summary.train_class_counts = train.class_counts();
    let elapsed = step_start.elapsed();
    summary.record_step("Split", elapsed);
    print_step_time(elapsed);

    // Step 3: Grid search
    print_step_header(3, "Grid Search");
    print_info(&format!(
        "{} configurations x {} folds, scored on default recall",
        config.grid.len(),
        config.cv_folds
    ));
    let step_start = Instant::now();
    let outcome = train_model(&train, &config).context("Grid search failed")?;
    print_success(&format!("Best: {}", outcome.best_params));
    print_success(&format!("Mean CV recall: {:.4}", outcome.best_score));
    display_leaderboard(&outcome.cv_results, args.leaderboard);

    summary.configs_evaluated = outcome.cv_results.len();
    summary.best_params = Some(outcome.best_params);
    summary.cv_recall = Some(outcome.best_score);
    let elapsed = step_start.elapsed();
    summary.record_step("Grid search", elapsed);
    print_step_time(elapsed);

    // Step 4: Held-out evaluation
    print_step_header(4, "Evaluate");
    let step_start = Instant::now();
    let metrics = evaluate_model(&outcome.pipeline, &test).context("Evaluation failed")?;
    display_evaluation(&metrics);
    summary.metrics = Some(metrics.clone());
    let elapsed = step_start.elapsed();
    summary.record_step("Evaluate", elapsed);
    print_step_time(elapsed);

    // Step 5: Persist
    print_step_header(5, "Save Model");
    let step_start = Instant::now();
    let input_display = args.input.display().to_string();
    let metadata = ArtifactMetadata::from_outcome(&outcome, &input_display, train.len(), config.seed)
        .with_evaluation(test.len(), metrics);

    save_pipeline(&args.output, &outcome.pipeline, &metadata)
        .with_context(|| format!("Failed to save model: {}", args.output.display()))?;
    print_success(&format!("Model saved to {}", args.output.display()));

    if let Some(report_path) = &args.report {
        let params = ReportParams {
            grid: &config.grid,
            cv_folds: config.cv_folds,
            k_neighbors: config.k_neighbors,
            test_size: config.test_size,
        };
        export_training_report(&metadata, &outcome.cv_results, report_path, &params)?;
        print_success(&format!("Training report written to {}", report_path.display()));
    }
    let elapsed = step_start.elapsed();
    summary.record_step("Save", elapsed);
    print_step_time(elapsed);

    summary.display();
    print_completion();
    Ok(())
}
