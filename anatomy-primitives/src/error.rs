//! Shared error definitions for prompt anatomy primitives.

use thiserror::Error;

/// Result alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing or manipulating primitive types.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// Taxonomy definition failed validation.
    #[error("invalid taxonomy: {reason}")]
    InvalidTaxonomy {
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// A label was used that the taxonomy does not define.
    #[error("label `{label}` is not part of the taxonomy")]
    UnknownLabel {
        /// The offending label.
        label: String,
    },
}

impl Error {
    pub(crate) fn invalid_taxonomy(reason: impl Into<String>) -> Self {
        Self::InvalidTaxonomy {
            reason: reason.into(),
        }
    }
}
