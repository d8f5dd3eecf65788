//! Telemetry
//!
//! Sets up `tracing-subscriber`. Status log entries are mirrored as tracing
//! events, so the same decisions reach the terminal and the in-memory log.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Build the filter directive for a log level.
///
/// Dependencies stay at `warn` so agent events are not drowned out.
pub fn filter_directive(log_level: &str) -> String {
    format!("warn,autocfo_engine={0},autocfo={0}", log_level)
}

/// Initialize the tracing subscriber with the given log level.
///
/// Priority: `RUST_LOG` env var > `log_level` parameter.
///
/// Debug builds print compact terminal output, release builds print JSON.
/// Calling this more than once is harmless; only the first call installs.
pub fn init_telemetry_with_level(log_level: &str) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(log_level)));

    #[cfg(debug_assertions)]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().compact().with_target(false))
            .try_init()
            .ok();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json().with_current_span(true))
            .try_init()
            .ok();
    }
}
