//! Pipeline module - loading, preprocessing, training, evaluation and scoring

pub mod artifact;
pub mod config;
pub mod evaluate;
pub mod forest;
pub mod loader;
pub mod predict;
pub mod preprocess;
pub mod schema;
pub mod smote;
pub mod split;
pub mod target;
pub mod trainer;

pub use artifact::{
    init_serving_model, load_pipeline, save_pipeline, serving_model, ArtifactMetadata,
    LoadedArtifact,
};
pub use config::{ClassWeight, ForestParams, MaxDepth, ParamGrid, TrainConfig};
pub use evaluate::{evaluate_model, ClassificationReport, EvaluationMetrics};
pub use forest::RandomForest;
pub use loader::*;
pub use predict::{make_prediction, PredictionResult};
pub use preprocess::{build_preprocessor, FittedPreprocessor, Preprocessor};
pub use schema::{ApplicantRecord, Dataset};
pub use smote::Smote;
pub use split::{split_data, stratified_kfold};
pub use target::*;
pub use trainer::{fit_pipeline, train_model, CreditPipeline, RiskModel, TrainingOutcome};
