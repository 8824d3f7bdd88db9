//! Tests for artifact persistence

use riskscore::pipeline::*;
use riskscore::RiskError;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn trained() -> (TrainingOutcome, Dataset, Dataset) {
    let (_temp_dir, csv_path) = create_temp_dataset(200, 31);
    let dataset = load_data(&csv_path, 100).unwrap();
    let (train, test) = split_data(&dataset, 0.2, 42).unwrap();
    let outcome = train_model(&train, &small_train_config()).unwrap();
    (outcome, train, test)
}

#[test]
fn test_save_then_load_preserves_pipeline() {
    let (outcome, train, test) = trained();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("models").join("credit_risk_model.bin");

    let metrics = evaluate_model(&outcome.pipeline, &test).unwrap();
    let metadata = ArtifactMetadata::from_outcome(&outcome, "german_credit_data.csv", train.len(), 42)
        .with_evaluation(test.len(), metrics.clone());
    save_pipeline(&path, &outcome.pipeline, &metadata).unwrap();

    let loaded = load_pipeline(&path).unwrap();
    assert_eq!(loaded.pipeline, outcome.pipeline);
    assert_eq!(loaded.metadata, metadata);
    assert_eq!(loaded.metadata.test_metrics, Some(metrics));
    assert_eq!(
        loaded.metadata.feature_names,
        outcome.pipeline.preprocessor.feature_names()
    );
}

#[test]
fn test_loaded_model_scores_identically() {
    let (outcome, train, test) = trained();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("model.bin");

    let metadata = ArtifactMetadata::from_outcome(&outcome, "data.csv", train.len(), 42);
    save_pipeline(&path, &outcome.pipeline, &metadata).unwrap();
    let loaded = load_pipeline(&path).unwrap();

    for record in &test.records {
        assert_eq!(
            make_prediction(&loaded, record).unwrap(),
            make_prediction(&outcome.pipeline, record).unwrap()
        );
    }
}

#[test]
fn test_artifact_is_a_zip_with_both_entries() {
    let (outcome, train, _) = trained();
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("model.bin");

    let metadata = ArtifactMetadata::from_outcome(&outcome, "data.csv", train.len(), 42);
    save_pipeline(&path, &outcome.pipeline, &metadata).unwrap();

    let mut archive = zip::ZipArchive::new(std::fs::File::open(&path).unwrap()).unwrap();
    let mut names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["metadata.json", "pipeline.json"]);
    assert!(archive.by_name("metadata.json").is_ok());
}

#[test]
fn test_missing_artifact_is_distinct_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("credit_risk_model.bin");

    match load_pipeline(&path) {
        Err(RiskError::ArtifactNotFound { path: reported }) => assert_eq!(reported, path),
        other => panic!("expected ArtifactNotFound, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_zip_without_pipeline_entry_is_corrupt() {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("model.bin");
    let mut zip = zip::ZipWriter::new(std::fs::File::create(&path).unwrap());
    zip.start_file("readme.txt", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"nothing here").unwrap();
    zip.finish().unwrap();

    assert!(matches!(
        load_pipeline(&path),
        Err(RiskError::CorruptArtifact { .. })
    ));
}
