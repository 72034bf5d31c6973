//! Configuration management for the prompt classifiers.
//!
//! [`schema`] holds the strongly typed settings with their defaults;
//! [`loader`] resolves credentials from the process environment.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

mod error;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ApiKey, EnvLoader};
pub use schema::{ComponentSettings, PlaceholderSettings};
