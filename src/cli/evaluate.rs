//! `riskscore evaluate`: score a saved model against a labelled file

use std::path::Path;

use anyhow::{Context, Result};

use crate::pipeline::{evaluate_model, init_serving_model, load_data};
use crate::report::display_evaluation;
use crate::utils::{create_spinner, finish_with_success, print_info};

pub fn run_evaluate(model_path: &Path, input: &Path, infer_schema_length: usize) -> Result<()> {
    let model = init_serving_model(model_path)?;
    print_info(&format!(
        "Model {} ({})",
        model_path.display(),
        model.metadata.best_params
    ));

    let spinner = create_spinner("Loading evaluation data...");
    let dataset = load_data(input, infer_schema_length)
        .with_context(|| format!("Failed to load dataset: {}", input.display()))?;
    finish_with_success(&spinner, &format!("Loaded {} applicants", dataset.len()));

    let metrics = evaluate_model(model, &dataset).context("Evaluation failed")?;
    display_evaluation(&metrics);
    Ok(())
}
