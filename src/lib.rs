//! Riskscore: Credit Default Risk Library
//!
//! Trains a random forest on the German Credit dataset with SMOTE
//! oversampling and a recall-driven grid search, and scores single
//! applicants with the persisted pipeline.

pub mod cli;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod utils;

pub use error::{RiskError, RiskResult};
