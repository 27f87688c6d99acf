//! Log subscriber setup for the binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the executable.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose { "debug" } else { "info" }
}

/// Installs a stderr fmt subscriber filtered by `RUST_LOG`.
///
/// # Errors
///
/// Returns a message if the filter is invalid or a global subscriber is
/// already installed.
pub fn init(verbose: bool) -> Result<(), String> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive(verbose)))
        .map_err(|e| e.to_string())?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_ansi(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbose_switches_to_debug() {
        assert_eq!(default_directive(true), "debug");
        assert_eq!(default_directive(false), "info");
    }
}
