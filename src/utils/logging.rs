//! Diagnostic logging setup.
//!
//! Installs a global `tracing` subscriber writing to stderr, so diagnostics
//! never interleave with the styled report on stdout.

use std::sync::OnceLock;

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `riskscore=debug`
pub const LOG_ENV_VAR: &str = "RISKSCORE_LOG";

static INITIALIZED: OnceLock<()> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Another subscriber was already installed by someone else.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(String),
}

/// Filter directive for a `-v` count; 0 defers to the environment
fn level_for_verbosity(verbosity: u8) -> Option<&'static str> {
    match verbosity {
        0 => None,
        1 => Some("info"),
        _ => Some("debug"),
    }
}

fn build_env_filter(verbosity: u8) -> EnvFilter {
    match level_for_verbosity(verbosity) {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}

/// Initialize tracing.
///
/// `-v` flags take precedence over `RISKSCORE_LOG`; the default is `warn`.
/// Subsequent calls are no-ops.
pub fn init(verbosity: u8) -> Result<(), LoggingError> {
    if INITIALIZED.get().is_some() {
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(build_env_filter(verbosity))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| LoggingError::SetGlobal(e.to_string()))?;

    let _ = INITIALIZED.set(());
    tracing::debug!("logging initialized");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(level_for_verbosity(0), None);
        assert_eq!(level_for_verbosity(1), Some("info"));
        assert_eq!(level_for_verbosity(2), Some("debug"));
        assert_eq!(level_for_verbosity(9), Some("debug"));
    }

    #[test]
    fn test_init_is_idempotent() {
        assert!(init(1).is_ok());
        assert!(init(2).is_ok());
    }
}
