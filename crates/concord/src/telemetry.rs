//! Tracing subscriber setup.

use crate::StartupError;
use concord_core::{ConcordConfig, LogFormat};
use tracing_subscriber::EnvFilter;

/// Install the global `fmt` subscriber described by `config`.
///
/// Logs go to stderr, so they follow a stream redirection made earlier.
///
/// # Errors
///
/// Returns error if the filter does not parse or a subscriber is already set
pub fn init_tracing(config: &ConcordConfig) -> Result<(), StartupError> {
    let filter = EnvFilter::try_new(&config.log_filter).map_err(|err| StartupError::LogFilter {
        filter: config.log_filter.clone(),
        reason: err.to_string(),
    })?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match config.log_format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    };
    installed.map_err(|err| StartupError::Subscriber(err.to_string()))
}
