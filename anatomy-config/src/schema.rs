//! Strongly typed classifier settings.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Default model for component classification (served by Groq).
pub const DEFAULT_COMPONENT_MODEL: &str = "llama3-70b-8192";

/// Default model for placeholder classification (served by `OpenAI`).
pub const DEFAULT_PLACEHOLDER_MODEL: &str = "gpt-4o";

/// Settings for the component classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentSettings {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Attempts made before falling back to the empty breakdown.
    pub max_retries: u32,
    /// Minimum key similarity, exclusive, for a response key to be kept.
    pub similarity_threshold: f64,
    /// Pause after a rate-limit error whose wait time cannot be parsed.
    #[serde(rename = "rate_limit_fallback_secs", with = "seconds")]
    pub rate_limit_fallback: Duration,
}

impl Default for ComponentSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_COMPONENT_MODEL.to_owned(),
            max_retries: 3,
            similarity_threshold: 0.7,
            rate_limit_fallback: Duration::from_secs(60),
        }
    }
}

impl ComponentSettings {
    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a blank model, zero retries, or a
    /// threshold outside `[0, 1]`.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_model(&self.model)?;
        if self.max_retries == 0 {
            return Err(ConfigError::invalid(
                "max_retries",
                "at least one attempt is required",
            ));
        }
        validate_unit_interval("similarity_threshold", self.similarity_threshold)
    }
}

/// Settings for the placeholder classifier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderSettings {
    /// Model identifier sent to the provider.
    pub model: String,
    /// Minimum similarity, inclusive, for an answer to select a category.
    pub match_cutoff: f64,
    /// Sampling temperature for classification requests.
    pub temperature: f32,
}

impl Default for PlaceholderSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_PLACEHOLDER_MODEL.to_owned(),
            match_cutoff: 0.6,
            temperature: 0.0,
        }
    }
}

impl PlaceholderSettings {
    /// Checks that every value is in range.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a blank model, a cutoff outside
    /// `[0, 1]`, or a negative temperature.
    pub fn validate(&self) -> ConfigResult<()> {
        validate_model(&self.model)?;
        validate_unit_interval("match_cutoff", self.match_cutoff)?;
        if !(self.temperature.is_finite() && self.temperature >= 0.0) {
            return Err(ConfigError::invalid(
                "temperature",
                format!("{} is not a non-negative number", self.temperature),
            ));
        }
        Ok(())
    }
}

fn validate_model(model: &str) -> ConfigResult<()> {
    if model.trim().is_empty() {
        return Err(ConfigError::invalid("model", "model name cannot be blank"));
    }
    Ok(())
}

fn validate_unit_interval(field: &'static str, value: f64) -> ConfigResult<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::invalid(
            field,
            format!("{value} is outside [0, 1]"),
        ));
    }
    Ok(())
}

mod seconds {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    pub(super) fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}
