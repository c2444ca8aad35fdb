//! Tracing subscriber setup for binaries embedding the workflow services.

use thiserror::Error;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Default filter when neither a directive nor `RUST_LOG` is given.
pub const DEFAULT_FILTER: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directive does not parse.
    #[error("invalid log filter '{directive}': {reason}")]
    InvalidFilter {
        /// Rejected directive.
        directive: String,
        /// Parser message.
        reason: String,
    },

    /// A global subscriber is already installed.
    #[error("tracing subscriber already installed: {0}")]
    AlreadyInstalled(String),
}

/// Builds the filter from `directive`, then `RUST_LOG`, then [`DEFAULT_FILTER`].
///
/// # Errors
///
/// Returns [`TelemetryError::InvalidFilter`] when an explicit directive does
/// not parse. An unparsable `RUST_LOG` falls back to the default.
pub fn build_filter(directive: Option<&str>) -> Result<EnvFilter, TelemetryError> {
    if let Some(raw) = directive.map(str::trim).filter(|raw| !raw.is_empty()) {
        return EnvFilter::try_new(raw).map_err(|error| TelemetryError::InvalidFilter {
            directive: raw.to_owned(),
            reason: error.to_string(),
        });
    }
    Ok(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
}

/// Installs a global `fmt` subscriber filtered by [`build_filter`].
///
/// # Errors
///
/// Returns [`TelemetryError`] when the filter is invalid or a subscriber is
/// already installed.
pub fn init_tracing(directive: Option<&str>) -> Result<(), TelemetryError> {
    let filter = build_filter(directive)?;
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|error| TelemetryError::AlreadyInstalled(error.to_string()))
}
