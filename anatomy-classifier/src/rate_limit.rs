//! Interpretation of adapter failures for the retry loop.

use std::sync::LazyLock;
use std::time::Duration;

use anatomy_adapters::traits::AdapterError;
use regex::Regex;

static WAIT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin\s+(\d+(?:\.\d+)?)\s*s\b").expect("wait pattern is valid")
});

/// Where a rate-limit pause length came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WaitSource {
    /// Parsed from an `in <n>s` hint in the error text.
    Message,
    /// Taken from the provider's `retry-after` header.
    Header,
    /// No usable hint; the configured fallback applies.
    Fallback,
}

/// How the classifier should react to a failed service call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Failure {
    /// The provider is throttling; pause for `wait` before the next attempt.
    RateLimited {
        /// Pause length.
        wait: Duration,
        /// Origin of the pause length.
        source: WaitSource,
    },
    /// Any other failure; retry immediately.
    Other,
}

/// Extracts the wait time from messages such as
/// `"Rate limit reached ... Please try again in 7.66s."`.
///
/// The last `in <number>s` occurrence wins. Returns `None` when no such
/// substring exists or the number is not a valid duration.
#[must_use]
pub fn parse_wait_time(message: &str) -> Option<Duration> {
    let captures = WAIT_PATTERN.captures_iter(message).last()?;
    let seconds: f64 = captures.get(1)?.as_str().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

/// Decides whether `err` is a rate-limit signal and, if so, how long to wait.
#[must_use]
pub fn classify_failure(err: &AdapterError, fallback: Duration) -> Failure {
    let message = err.to_string();
    let lowered = message.to_lowercase();
    let throttled = matches!(err, AdapterError::RateLimited { .. })
        || lowered.contains("429")
        || lowered.contains("rate limit");
    if !throttled {
        return Failure::Other;
    }

    let (wait, source) = if let Some(wait) = parse_wait_time(&message) {
        (wait, WaitSource::Message)
    } else if let Some(wait) = err.retry_after() {
        (wait, WaitSource::Header)
    } else {
        (fallback, WaitSource::Fallback)
    };
    Failure::RateLimited { wait, source }
}
