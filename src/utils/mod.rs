//! Utilities - progress bars, terminal styling and logging setup

pub mod logging;
pub mod progress;
pub mod styling;

pub use progress::*;
pub use styling::*;
