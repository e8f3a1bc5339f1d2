//! Tracing subscriber setup for binaries and harnesses embedding the engine.

use anyhow::Result;
use tracing_subscriber::{
    EnvFilter, Registry, fmt, layer::SubscriberExt, reload, util::SubscriberInitExt,
};

use crate::config::LoggingConfig;

/// Handle used to swap the active filter after startup.
pub type FilterHandle = reload::Handle<EnvFilter, Registry>;

/// ## Summary
/// Parses a log level directive, falling back to `debug` when it is invalid.
#[must_use]
pub fn filter_for(level: &str) -> EnvFilter {
    EnvFilter::try_new(level).unwrap_or_else(|e| {
        tracing::warn!(level = %level, error = %e, "Invalid log level, using debug");
        EnvFilter::new("debug")
    })
}

/// ## Summary
/// Installs the global tracing subscriber with a reloadable filter.
///
/// ## Errors
/// Returns an error if a global subscriber or logger is already installed.
pub fn init(config: &LoggingConfig) -> Result<FilterHandle> {
    let (filter_layer, filter_handle) = reload::Layer::new(filter_for(&config.level));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            fmt::layer()
                .with_target(true)
                .with_file(true)
                .with_line_number(true),
        )
        .try_init()?;

    tracing::debug!(level = %config.level, "Logging initialized");
    Ok(filter_handle)
}

/// ## Summary
/// Replaces the active filter with the level from `config`.
///
/// ## Errors
/// Returns an error if the subscriber owning the handle has been dropped.
pub fn set_level(handle: &FilterHandle, config: &LoggingConfig) -> Result<()> {
    let filter = filter_for(&config.level);
    handle.modify(|current| *current = filter)?;
    Ok(())
}
