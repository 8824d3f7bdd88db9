//! `riskscore inspect`: show what a saved model was trained with

use std::path::Path;

use anyhow::Result;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Table};
use console::style;

use crate::pipeline::{init_serving_model, ArtifactMetadata};
use crate::report::display_evaluation;

/// Key/value table of artifact metadata
pub fn metadata_table(metadata: &ArtifactMetadata) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Field").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    let rows: Vec<(&str, String)> = vec![
        ("Created", metadata.created_at.clone()),
        ("Version", metadata.riskscore_version.clone()),
        ("Trained on", metadata.input_file.clone()),
        ("Train / Test rows", format!("{} / {}", metadata.train_rows, metadata.test_rows)),
        ("Seed", metadata.seed.to_string()),
        ("Best params", metadata.best_params.to_string()),
        ("CV recall (bad)", format!("{:.4}", metadata.cv_recall)),
        ("Encoded features", metadata.feature_names.len().to_string()),
    ];
    for (field, value) in rows {
        table.add_row(vec![Cell::new(field), Cell::new(value)]);
    }
    table
}

pub fn run_inspect(model_path: &Path) -> Result<()> {
    let model = init_serving_model(model_path)?;
    let metadata = &model.metadata;

    println!();
    println!(
        "    {} {}",
        style("🔎").cyan(),
        style(model_path.display()).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    for line in metadata_table(metadata).to_string().lines() {
        println!("    {}", line);
    }

    println!();
    println!("    {}", style("Encoded features:").dim());
    for name in &metadata.feature_names {
        println!("      {} {}", style("•").dim(), name);
    }

    if let Some(metrics) = &metadata.test_metrics {
        display_evaluation(metrics);
    }
    Ok(())
}
