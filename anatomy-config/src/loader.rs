//! Environment-backed configuration loading.

use std::fmt;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};

/// Secret API key. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Returns the raw key for handing to an adapter.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

type Lookup = Box<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Reads configuration values from the process environment, or from any
/// lookup function supplied for tests.
pub struct EnvLoader {
    lookup: Lookup,
}

impl fmt::Debug for EnvLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvLoader").finish_non_exhaustive()
    }
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self::from_process()
    }
}

impl EnvLoader {
    /// Loader backed by `std::env::var`.
    #[must_use]
    pub fn from_process() -> Self {
        Self::with_lookup(|name| std::env::var(name).ok())
    }

    /// Loader backed by an arbitrary lookup function.
    #[must_use]
    pub fn with_lookup(lookup: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            lookup: Box::new(lookup),
        }
    }

    /// Returns the trimmed value of `var`, treating blank values as unset.
    #[must_use]
    pub fn optional(&self, var: &str) -> Option<String> {
        (self.lookup)(var)
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
    }

    /// Loads a required credential.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingCredential`] when `var` is unset or blank.
    pub fn credential(&self, var: &str) -> ConfigResult<ApiKey> {
        let key = self
            .optional(var)
            .ok_or_else(|| ConfigError::MissingCredential {
                var: var.to_owned(),
            })?;
        debug!(var, "loaded credential");
        Ok(ApiKey(key))
    }
}
