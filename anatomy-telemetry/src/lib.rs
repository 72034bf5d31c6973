//! Observability setup for the prompt anatomy command-line tools.
//!
//! Log output goes to stderr so that stdout carries only classification
//! results.

#![warn(missing_docs, clippy::pedantic)]

use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Directive used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_DIRECTIVE: &str = "info";

/// Errors raised while installing the subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// A global subscriber was already installed.
    #[error("failed to install tracing subscriber: {reason}")]
    Install {
        /// Reason reported by `tracing-subscriber`.
        reason: String,
    },
}

/// Builds the level filter from an optional `RUST_LOG`-style directive.
///
/// Invalid directives fall back to `default_directive`.
#[must_use]
pub fn build_filter(directive: Option<&str>, default_directive: &str) -> EnvFilter {
    directive
        .and_then(|raw| EnvFilter::try_new(raw).ok())
        .unwrap_or_else(|| EnvFilter::new(default_directive))
}

/// Installs a compact fmt subscriber writing to stderr, filtered by
/// `RUST_LOG` (default [`DEFAULT_DIRECTIVE`]).
///
/// # Errors
///
/// Returns [`TelemetryError::Install`] if a global subscriber already exists.
pub fn init_tracing() -> Result<(), TelemetryError> {
    let directive = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = build_filter(directive.as_deref(), DEFAULT_DIRECTIVE);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| TelemetryError::Install {
            reason: err.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_directive_wins() {
        let filter = build_filter(Some("anatomy_classifier=debug"), DEFAULT_DIRECTIVE);
        assert_eq!(filter.to_string(), "anatomy_classifier=debug");
    }

    #[test]
    fn missing_or_invalid_directive_uses_default() {
        assert_eq!(build_filter(None, "warn").to_string(), "warn");
        assert_eq!(build_filter(Some("anatomy=verbose"), "warn").to_string(), "warn");
    }
}
