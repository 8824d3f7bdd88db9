//! Report module - console summaries and the training report export

pub mod evaluation;
pub mod summary;
pub mod training_report;

pub use evaluation::*;
pub use summary::*;
pub use training_report::*;
