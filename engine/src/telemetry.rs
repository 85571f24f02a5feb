//! Logging setup
//!
//! Structured logging via `tracing-subscriber`. The filter comes from
//! `RUST_LOG` when set, otherwise from the configured level. Debug builds
//! log human-readable output; release builds emit JSON with span context
//! for log shipping.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber at the given level.
///
/// The first call wins: repeated initialization leaves the original
/// subscriber in place rather than erroring.
pub fn init(log_level: &str) {
    let filter = env_filter(log_level);

    #[cfg(debug_assertions)]
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).pretty())
        .try_init()
        .ok();

    #[cfg(not(debug_assertions))]
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().with_current_span(true))
        .try_init()
        .ok();
}

fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{level},analyst_engine={level}",
            level = log_level
        ))
    })
}
