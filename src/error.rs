//! Error types for the credit risk pipeline.
//!
//! `RiskError` covers the failure modes of loading, training, persisting and
//! scoring. The first four variants are the domain taxonomy; the rest wrap
//! errors raised by the libraries the pipeline sits on.

use std::path::PathBuf;

use polars::prelude::PolarsError;

/// Convenience alias used throughout the library.
pub type RiskResult<T> = std::result::Result<T, RiskError>;

/// Errors that can occur while training or serving the credit risk model.
#[derive(Debug, thiserror::Error)]
pub enum RiskError {
    /// Input data is malformed.
    ///
    /// Raised for missing expected columns, values of the wrong type,
    /// categorical values outside their vocabulary, and risk labels that
    /// map to neither "good" nor "bad".
    #[error("Data error: {0}")]
    Data(String),

    /// A class has too few members for the requested operation.
    ///
    /// Stratified splitting, stratified k-fold and SMOTE neighbour search
    /// all need a minimum number of samples per class.
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// The serialized pipeline does not exist at serving startup.
    #[error("Model artifact not found at '{}'", path.display())]
    ArtifactNotFound {
        /// Path that was expected to hold the artifact
        path: PathBuf,
    },

    /// A submitted record lacks one or more required feature columns.
    #[error("Record is missing required feature column(s): {}", missing.join(", "))]
    InferenceShape {
        /// Names of every missing column, in schema order
        missing: Vec<String>,
    },

    /// Training or grid configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The artifact exists but could not be decoded.
    #[error("Corrupt model artifact '{}': {message}", path.display())]
    CorruptArtifact { path: PathBuf, message: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Archive(#[from] zip::result::ZipError),
}

impl RiskError {
    /// Shorthand for building a [`RiskError::Data`].
    pub fn data(message: impl Into<String>) -> Self {
        RiskError::Data(message.into())
    }

    /// Shorthand for building a [`RiskError::InsufficientData`].
    pub fn insufficient(message: impl Into<String>) -> Self {
        RiskError::InsufficientData(message.into())
    }
}
