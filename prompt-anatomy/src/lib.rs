//! Prompt anatomy toolkit facade.
//!
//! Splits prompts into a fixed taxonomy of components and labels the
//! placeholders of prompt templates. The member crates are bundled behind
//! feature flags so callers can depend on the offline pieces alone.

#![warn(missing_docs, clippy::pedantic)]

/// Taxonomies, component maps and placeholder records.
pub use anatomy_primitives as primitives;

/// Placeholder detection, fuzzy matching and response validation.
pub use anatomy_analysis as analysis;

/// Text-generation service adapters (enabled by `adapters` feature).
#[cfg(feature = "adapters")]
pub use anatomy_adapters as adapters;

/// Instruction templates (enabled by `prompts` feature).
#[cfg(feature = "prompts")]
pub use anatomy_prompts as prompts;

/// Component and placeholder classifiers (enabled by `classifier` feature).
#[cfg(feature = "classifier")]
pub use anatomy_classifier as classifier;

/// Settings and credential loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use anatomy_config as config;

/// Logging setup (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use anatomy_telemetry as telemetry;
