//! Logging bootstrap.
//!
//! Filter precedence: an explicit directive from the caller (e.g. `--log`),
//! then `RUST_LOG`, then the configured filter. The filter applies to the
//! formatted output only; the optional [`ToolbarEventLayer`] selects its own
//! events by target. Output goes to stderr so it never interleaves with the
//! REPL's stdout.

use crate::tracing_layer::ToolbarEventLayer;
use anyhow::Context as _;
use promptbar_core::config::LoggingConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt};

/// Installs the global subscriber.
///
/// Fails if a global subscriber is already set or the filter is invalid.
pub fn init_tracing(
    config: &LoggingConfig,
    explicit_filter: Option<&str>,
    events: Option<ToolbarEventLayer>,
) -> anyhow::Result<()> {
    let directive = resolve_filter(
        explicit_filter,
        std::env::var(EnvFilter::DEFAULT_ENV).ok(),
        config,
    );
    let env_filter = EnvFilter::try_new(&directive)
        .with_context(|| format!("Invalid log filter '{}'", directive))?;

    let registry = Registry::default().with(events);
    if config.json {
        registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            )
            .try_init()
            .context("Failed to set subscriber")?;
    } else {
        registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_writer(std::io::stderr)
                    .with_filter(env_filter),
            )
            .try_init()
            .context("Failed to set subscriber")?;
    }
    Ok(())
}

fn resolve_filter(explicit: Option<&str>, env: Option<String>, config: &LoggingConfig) -> String {
    if let Some(filter) = explicit {
        return filter.to_string();
    }
    env.filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.filter.clone())
}
