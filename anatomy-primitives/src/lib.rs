//! Core shared types for prompt anatomy classifiers.

#![warn(missing_docs, clippy::pedantic)]

mod component;
mod error;
mod placeholder;
mod taxonomy;

/// Eight-slot breakdown of a prompt into functional components.
pub use component::ComponentMap;
/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Placeholder categories, positions, and per-occurrence records.
pub use placeholder::{PlaceholderCategory, PlaceholderRecord, Position};
/// Fixed, ordered category lists injected into classifiers.
pub use taxonomy::{COMPONENT_LABELS, PLACEHOLDER_LABELS, Taxonomy};
