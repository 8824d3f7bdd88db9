//! Training report export

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::pipeline::trainer::CvResult;
use crate::pipeline::{ArtifactMetadata, ParamGrid};

/// Summary statistics of the grid search
#[derive(Serialize)]
pub struct SearchSummary {
    pub configs_evaluated: usize,
    pub cv_folds: usize,
    pub k_neighbors: usize,
    pub test_size: f64,
    /// Mean recall across every configuration
    pub avg_recall: f64,
    pub best_recall: f64,
    pub worst_recall: f64,
}

/// Complete training report: artifact metadata, grid and per-config results
#[derive(Serialize)]
pub struct TrainingReport<'a> {
    pub metadata: &'a ArtifactMetadata,
    pub grid: &'a ParamGrid,
    pub summary: SearchSummary,
    pub cv_results: &'a [CvResult],
}

/// Parameters for the report export
pub struct ReportParams<'a> {
    pub grid: &'a ParamGrid,
    pub cv_folds: usize,
    pub k_neighbors: usize,
    pub test_size: f64,
}

fn build_summary(cv_results: &[CvResult], params: &ReportParams) -> SearchSummary {
    let recalls: Vec<f64> = cv_results.iter().map(|r| r.mean_recall).collect();
    let avg_recall = if recalls.is_empty() {
        0.0
    } else {
        recalls.iter().sum::<f64>() / recalls.len() as f64
    };

    SearchSummary {
        configs_evaluated: cv_results.len(),
        cv_folds: params.cv_folds,
        k_neighbors: params.k_neighbors,
        test_size: params.test_size,
        avg_recall,
        best_recall: recalls.iter().copied().fold(0.0, f64::max),
        worst_recall: recalls.iter().copied().fold(1.0, f64::min),
    }
}

/// Write the training report as pretty-printed JSON
pub fn export_training_report(
    metadata: &ArtifactMetadata,
    cv_results: &[CvResult],
    output_path: &Path,
    params: &ReportParams,
) -> Result<()> {
    let report = TrainingReport {
        metadata,
        grid: params.grid,
        summary: build_summary(cv_results, params),
        cv_results,
    };

    let json = serde_json::to_string_pretty(&report)
        .context("Failed to serialize training report to JSON")?;

    if let Some(parent) = output_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write training report to {}", output_path.display()))?;

    Ok(())
}
