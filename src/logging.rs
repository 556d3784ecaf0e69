//! Structured logging setup
//!
//! Library code only emits `tracing` events. Calling tools that want them on
//! stderr install a subscriber here once at start-up. `RUST_LOG` takes
//! precedence over the level passed in.

use crate::{Error, Result};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Standard logging with uptime timestamps
///
/// # Errors
/// Returns `Error::Configuration` if a global subscriber is already set
pub fn init_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(create_filter(level))
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .map_err(|e| Error::configuration(format!("Cannot initialise logging: {}", e)))?;

    debug!("Logging initialized at level: {}", level);
    Ok(())
}

/// Compact logging without timestamps, for batch tools running quietly
///
/// # Errors
/// Returns `Error::Configuration` if a global subscriber is already set
pub fn init_compact_logging(level: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(create_filter(level))
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init()
        .map_err(|e| Error::configuration(format!("Cannot initialise logging: {}", e)))
}

fn create_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), level)))
}
