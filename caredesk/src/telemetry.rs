//! Tracing initialization.
//!
//! Log output goes to stdout through the `tracing-subscriber` fmt layer. Verbosity is taken from
//! `RUST_LOG` using the usual `EnvFilter` directives and falls back to `info`:
//!
//! ```bash
//! RUST_LOG=caredesk=debug,tower_http=debug caredesk -f config.yaml
//! ```
//!
//! sqlx reports statements slower than `slow_statement_threshold_ms` through the `log` facade,
//! which the fmt subscriber picks up alongside native `tracing` events.

use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const DEFAULT_FILTER: &str = "info";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_telemetry() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer())
        .try_init()?;

    info!("Telemetry initialized");
    Ok(())
}
