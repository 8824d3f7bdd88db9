//! Model artifact persistence and process-wide serving state
//!
//! An artifact is a deflate zip holding `pipeline.json` (fitted preprocessor
//! and forest) and `metadata.json` (provenance and training scores).

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

use super::config::ForestParams;
use super::evaluate::EvaluationMetrics;
use super::schema::ApplicantRecord;
use super::trainer::{CreditPipeline, RiskModel, TrainingOutcome};
use crate::error::{RiskError, RiskResult};

const PIPELINE_ENTRY: &str = "pipeline.json";
const METADATA_ENTRY: &str = "metadata.json";

/// Provenance stored next to the fitted pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    /// Creation time (RFC 3339, UTC)
    pub created_at: String,
    pub riskscore_version: String,
    pub input_file: String,
    pub train_rows: usize,
    pub test_rows: usize,
    pub seed: u64,
    pub best_params: ForestParams,
    /// Mean cross-validated default-class recall of `best_params`
    pub cv_recall: f64,
    /// Held-out scores, when the test split was evaluated
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub test_metrics: Option<EvaluationMetrics>,
    /// Encoded column names, in the order the forest sees them
    pub feature_names: Vec<String>,
}

impl ArtifactMetadata {
    /// Metadata for a finished grid search, stamped with the current time
    pub fn from_outcome(outcome: &TrainingOutcome, input_file: &str, train_rows: usize, seed: u64) -> Self {
        Self {
            created_at: Utc::now().to_rfc3339(),
            riskscore_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: input_file.to_string(),
            train_rows,
            test_rows: 0,
            seed,
            best_params: outcome.best_params,
            cv_recall: outcome.best_score,
            test_metrics: None,
            feature_names: outcome.pipeline.preprocessor.feature_names(),
        }
    }

    pub fn with_evaluation(mut self, test_rows: usize, metrics: EvaluationMetrics) -> Self {
        self.test_rows = test_rows;
        self.test_metrics = Some(metrics);
        self
    }
}

/// A pipeline read back from disk
#[derive(Debug, Clone)]
pub struct LoadedArtifact {
    pub path: PathBuf,
    pub pipeline: CreditPipeline,
    pub metadata: ArtifactMetadata,
}

impl RiskModel for LoadedArtifact {
    fn predict_proba(&self, record: &ApplicantRecord) -> RiskResult<[f64; 2]> {
        self.pipeline.predict_proba(record)
    }
}

/// Write `pipeline` and `metadata` to a zip archive at `path`
///
/// Parent directories are created as needed; an existing file is replaced.
pub fn save_pipeline(
    path: &Path,
    pipeline: &CreditPipeline,
    metadata: &ArtifactMetadata,
) -> RiskResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut zip = ZipWriter::new(File::create(path)?);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    zip.start_file(PIPELINE_ENTRY, options)?;
    zip.write_all(&serde_json::to_vec(pipeline)?)?;

    zip.start_file(METADATA_ENTRY, options)?;
    zip.write_all(&serde_json::to_vec_pretty(metadata)?)?;

    zip.finish()?;

    info!(path = %path.display(), "saved model artifact");
    Ok(())
}

fn read_entry(archive: &mut ZipArchive<File>, name: &str, path: &Path) -> RiskResult<Vec<u8>> {
    let corrupt = |message: String| RiskError::CorruptArtifact {
        path: path.to_path_buf(),
        message,
    };
    let mut entry = archive
        .by_name(name)
        .map_err(|e| corrupt(format!("missing entry '{}': {}", name, e)))?;
    let mut bytes = Vec::new();
    entry
        .read_to_end(&mut bytes)
        .map_err(|e| corrupt(format!("cannot read entry '{}': {}", name, e)))?;
    Ok(bytes)
}

/// Read an artifact written by [`save_pipeline`]
///
/// A missing file is [`RiskError::ArtifactNotFound`]; anything unreadable
/// after that is [`RiskError::CorruptArtifact`].
pub fn load_pipeline(path: &Path) -> RiskResult<LoadedArtifact> {
    if !path.is_file() {
        return Err(RiskError::ArtifactNotFound {
            path: path.to_path_buf(),
        });
    }

    let corrupt = |message: String| RiskError::CorruptArtifact {
        path: path.to_path_buf(),
        message,
    };

    let mut archive =
        ZipArchive::new(File::open(path)?).map_err(|e| corrupt(format!("not a zip archive: {}", e)))?;

    let pipeline: CreditPipeline = serde_json::from_slice(&read_entry(&mut archive, PIPELINE_ENTRY, path)?)
        .map_err(|e| corrupt(format!("invalid {}: {}", PIPELINE_ENTRY, e)))?;
    let metadata: ArtifactMetadata = serde_json::from_slice(&read_entry(&mut archive, METADATA_ENTRY, path)?)
        .map_err(|e| corrupt(format!("invalid {}: {}", METADATA_ENTRY, e)))?;

    Ok(LoadedArtifact {
        path: path.to_path_buf(),
        pipeline,
        metadata,
    })
}

static SERVING: OnceLock<LoadedArtifact> = OnceLock::new();

/// Load the artifact into the process-wide serving slot
///
/// Once a model is loaded, later calls return it without touching `path`.
/// A failed load leaves the slot empty.
pub fn init_serving_model(path: &Path) -> RiskResult<&'static LoadedArtifact> {
    if let Some(model) = SERVING.get() {
        return Ok(model);
    }
    let loaded = load_pipeline(path)?;
    Ok(SERVING.get_or_init(|| loaded))
}

/// The serving model, if [`init_serving_model`] has succeeded
pub fn serving_model() -> Option<&'static LoadedArtifact> {
    SERVING.get()
}
