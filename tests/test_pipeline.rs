//! End-to-end tests: load, split, grid search, evaluate

use riskscore::pipeline::forest::RandomForest;
use riskscore::pipeline::*;
use riskscore::RiskError;

#[path = "common/mod.rs"]
mod common;

use common::*;

fn train_and_test(seed: u64) -> (Dataset, Dataset) {
    let (_temp_dir, csv_path) = create_temp_dataset(200, seed);
    let dataset = load_data(&csv_path, 100).unwrap();
    split_data(&dataset, 0.2, 42).unwrap()
}

#[test]
fn test_grid_search_scores_every_configuration() {
    let (train, _) = train_and_test(21);
    let config = small_train_config();
    let outcome = train_model(&train, &config).unwrap();

    assert_eq!(outcome.cv_results.len(), config.grid.len());
    for (result, params) in outcome.cv_results.iter().zip(config.grid.candidates()) {
        assert_eq!(result.params, params, "results keep enumeration order");
        assert_eq!(result.fold_recalls.len(), config.cv_folds);
        assert!((0.0..=1.0).contains(&result.mean_recall));
    }
}

#[test]
fn test_best_is_first_maximum() {
    let (train, _) = train_and_test(22);
    let outcome = train_model(&train, &small_train_config()).unwrap();

    let max = outcome
        .cv_results
        .iter()
        .map(|r| r.mean_recall)
        .fold(f64::MIN, f64::max);
    let first_best = outcome
        .cv_results
        .iter()
        .find(|r| r.mean_recall == max)
        .unwrap();

    assert_eq!(outcome.best_params, first_best.params);
    assert_eq!(outcome.best_score, max);
    assert_eq!(first_best.rank, 1);
}

#[test]
fn test_training_is_deterministic() {
    let (train, _) = train_and_test(23);
    let config = small_train_config();

    let a = train_model(&train, &config).unwrap();
    let b = train_model(&train, &config).unwrap();
    assert_eq!(a.pipeline, b.pipeline);
    assert_eq!(a.cv_results, b.cv_results);
}

#[test]
fn test_thread_count_does_not_change_result() {
    let (train, _) = train_and_test(24);
    let config = small_train_config();

    let single = rayon::ThreadPoolBuilder::new()
        .num_threads(1)
        .build()
        .unwrap()
        .install(|| train_model(&train, &config).unwrap());
    let many = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap()
        .install(|| train_model(&train, &config).unwrap());

    assert_eq!(single.best_params, many.best_params);
    assert_eq!(single.pipeline, many.pipeline);
}

#[test]
fn test_evaluation_metrics_in_range() {
    let (train, test) = train_and_test(25);
    let outcome = train_model(&train, &small_train_config()).unwrap();
    let metrics = evaluate_model(&outcome.pipeline, &test).unwrap();

    assert!((0.0..=1.0).contains(&metrics.accuracy));
    assert!((0.0..=1.0).contains(&metrics.roc_auc));
    assert_eq!(metrics.accuracy, metrics.report.accuracy);
    assert_eq!(
        metrics.report.classes[0].support + metrics.report.classes[1].support,
        test.len()
    );
    // the synthetic data carries real signal
    assert!(metrics.roc_auc > 0.55, "ROC-AUC too low: {}", metrics.roc_auc);
}

#[test]
fn test_evaluation_does_not_mutate_pipeline() {
    let (train, test) = train_and_test(26);
    let outcome = train_model(&train, &small_train_config()).unwrap();
    let before = outcome.pipeline.clone();

    let _ = evaluate_model(&outcome.pipeline, &test).unwrap();
    assert_eq!(outcome.pipeline, before);
}

#[test]
fn test_preprocessor_fit_on_training_rows_only() {
    let (train, test) = train_and_test(27);
    let outcome = train_model(&train, &small_train_config()).unwrap();

    let refit = build_preprocessor().fit(&train.records).unwrap();
    assert_eq!(outcome.pipeline.preprocessor, refit);

    let with_test = build_preprocessor()
        .fit(&[train.records.clone(), test.records.clone()].concat())
        .unwrap();
    assert_ne!(outcome.pipeline.preprocessor.scalers, with_test.scalers);
}

#[test]
fn test_single_class_training_fails() {
    let (train, _) = train_and_test(28);
    let goods: Vec<usize> = (0..train.len()).filter(|&i| train.labels[i] == 0).collect();
    let only_good = train.subset(&goods);

    let err = train_model(&only_good, &small_train_config()).unwrap_err();
    assert!(matches!(err, RiskError::InsufficientData(_)));
}

#[test]
fn test_invalid_grid_rejected_before_training() {
    let (train, _) = train_and_test(29);
    let mut config = small_train_config();
    config.grid.min_samples_split = vec![1];

    let err = train_model(&train, &config).unwrap_err();
    assert!(matches!(err, RiskError::InvalidConfig(_)));
}

#[test]
fn test_fit_pipeline_forest_width_matches_preprocessor() {
    let (train, _) = train_and_test(30);
    let params = small_grid().candidates()[0];
    let pipeline = fit_pipeline(&train.records, &train.labels, &params, 5, 42).unwrap();

    let forest: &RandomForest = &pipeline.classifier;
    assert_eq!(forest.n_features(), pipeline.preprocessor.n_features());
    assert_eq!(forest.trees().len(), params.n_estimators);
}
