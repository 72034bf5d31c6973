//! Error types for configuration loading.

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required credential is absent from the environment.
    #[error("please set the {var} environment variable")]
    MissingCredential {
        /// Name of the environment variable.
        var: String,
    },

    /// A setting holds an out-of-range value.
    #[error("invalid setting `{field}`: {reason}")]
    Invalid {
        /// Offending setting.
        field: &'static str,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Result alias for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
