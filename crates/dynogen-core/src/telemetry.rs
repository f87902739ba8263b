use std::sync::OnceLock;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

pub const DEFAULT_LOG_FILTER: &str = "dynogen=info,dynogen_core=info";
static TRACING_INSTALLED: OnceLock<()> = OnceLock::new();

#[derive(Debug, Error)]
pub enum TelemetryInitError {
    #[error("invalid log filter `{directive}`: {source}")]
    InvalidFilter {
        directive: String,
        source: tracing_subscriber::filter::ParseError,
    },
    #[error("failed to install log subscriber: {0}")]
    SetGlobalDefault(#[from] tracing::subscriber::SetGlobalDefaultError),
}

/// Installs a compact stderr subscriber for generator logs.
///
/// `RUST_LOG` wins when set and valid, otherwise [`DEFAULT_LOG_FILTER`]
/// applies. Calls after the first successful one do nothing.
pub fn init_tracing() -> Result<(), TelemetryInitError> {
    if TRACING_INSTALLED.get().is_some() {
        return Ok(());
    }

    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_env_filter(log_filter()?)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    let _ = TRACING_INSTALLED.set(());
    Ok(())
}

fn log_filter() -> Result<EnvFilter, TelemetryInitError> {
    EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(DEFAULT_LOG_FILTER).map_err(|source| {
            TelemetryInitError::InvalidFilter {
                directive: DEFAULT_LOG_FILTER.to_string(),
                source,
            }
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filter_parses() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_FILTER).is_ok());
    }

    #[test]
    fn repeated_init_is_a_no_op() {
        init_tracing().unwrap();
        init_tracing().unwrap();
    }
}
