//! Coercion of untrusted model output into a [`ComponentMap`].

use anatomy_primitives::{ComponentMap, Taxonomy};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::matcher::best_match;

/// Minimum similarity a response key needs to be accepted for a label.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Reasons a raw response could not be read as a key-value structure.
#[derive(Debug, Error)]
pub enum ResponseError {
    /// The response is not valid JSON, even after stripping commentary.
    #[error("response is not valid JSON: {source}")]
    Malformed {
        /// Underlying decode error.
        #[from]
        source: serde_json::Error,
    },

    /// The response decoded to something other than an object.
    #[error("expected a JSON object, found {kind}")]
    NotAnObject {
        /// JSON type that was found instead.
        kind: &'static str,
    },
}

/// Returns the fallback map for `taxonomy`: every label, every value empty.
#[must_use]
pub fn default_response(taxonomy: &Taxonomy) -> ComponentMap {
    ComponentMap::empty(taxonomy)
}

/// Normalises raw model output against a fixed taxonomy.
#[derive(Clone, Debug)]
pub struct ResponseValidator {
    taxonomy: Taxonomy,
    threshold: f64,
}

impl ResponseValidator {
    /// Creates a validator with the default similarity threshold.
    #[must_use]
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self {
            taxonomy,
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// Overrides the similarity threshold; keys must score strictly above it.
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Returns the taxonomy this validator enforces.
    #[must_use]
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Returns the configured similarity threshold.
    #[must_use]
    pub const fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the fallback map for this validator's taxonomy.
    #[must_use]
    pub fn default_response(&self) -> ComponentMap {
        default_response(&self.taxonomy)
    }

    /// Validates `raw`, falling back to [`Self::default_response`] when it
    /// cannot be parsed.
    #[must_use]
    pub fn validate(&self, raw: &str) -> ComponentMap {
        match self.try_validate(raw) {
            Ok(map) => map,
            Err(err) => {
                warn!(error = %err, "discarding unparseable response");
                self.default_response()
            }
        }
    }

    /// Validates `raw`, reporting why it could not be parsed.
    ///
    /// # Errors
    ///
    /// Returns [`ResponseError`] when the lower-cased response is not a JSON
    /// object.
    pub fn try_validate(&self, raw: &str) -> Result<ComponentMap, ResponseError> {
        let object = parse_object(&raw.to_lowercase())?;
        Ok(self.reconcile(&object))
    }

    /// Maps each taxonomy label to the value of its closest response key.
    ///
    /// Keys that match no label are dropped; labels with no sufficiently
    /// similar key are left empty.
    #[must_use]
    pub fn reconcile(&self, object: &Map<String, Value>) -> ComponentMap {
        ComponentMap::from_fn(&self.taxonomy, |label| {
            let best = best_match(object.keys().map(String::as_str), label);
            match best.above(self.threshold) {
                Some(key) => {
                    debug!(label, key, score = best.score, "matched response key");
                    object.get(key).map(coerce_value).unwrap_or_default()
                }
                None => String::new(),
            }
        })
    }
}

/// Parses `text` as a JSON object, retrying on the outermost `{...}` slice
/// when the model wrapped its answer in prose or code fences.
fn parse_object(text: &str) -> Result<Map<String, Value>, ResponseError> {
    let value = match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => value,
        Err(err) => match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str::<Value>(&text[start..=end]).map_err(|_| err)?
            }
            _ => return Err(err.into()),
        },
    };

    match value {
        Value::Object(object) => Ok(object),
        other => Err(ResponseError::NotAnObject {
            kind: json_kind(&other),
        }),
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn coerce_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validator() -> ResponseValidator {
        ResponseValidator::new(Taxonomy::components())
    }

    #[test]
    fn default_response_has_all_labels_empty() {
        let map = default_response(&Taxonomy::components());
        let labels: Vec<_> = map.iter().map(|(label, _)| label).collect();
        assert_eq!(labels, anatomy_primitives::COMPONENT_LABELS);
        assert!(map.iter().all(|(_, value)| value.is_empty()));
    }

    #[test]
    fn exact_keys_are_copied_lowercased() {
        let raw = r#"{"Directive": "Summarise THE text", "Constraints": "Be brief"}"#;
        let map = validator().validate(raw);
        assert_eq!(map.get("directive"), Some("summarise the text"));
        assert_eq!(map.get("constraints"), Some("be brief"));
        assert_eq!(map.get("context"), Some(""));
        assert_eq!(map.len(), 8);
    }

    #[test]
    fn extra_keys_are_dropped_and_missing_filled() {
        let raw = r#"{"profile / role": "a tutor", "mood": "cheerful", "tone of voice": "calm"}"#;
        let map = validator().validate(raw);
        assert_eq!(map.get("profile/role"), Some("a tutor"));
        assert_eq!(map.get("mood"), None);
        assert_eq!(map.iter().filter(|(_, value)| !value.is_empty()).count(), 1);
    }

    #[test]
    fn unparseable_text_yields_default() {
        let map = validator().validate("I could not classify this prompt.");
        assert_eq!(map, validator().default_response());
    }

    #[test]
    fn non_object_json_is_rejected() {
        let err = validator().try_validate(r#"["directive"]"#).expect_err("array");
        assert!(matches!(err, ResponseError::NotAnObject { kind: "array" }));
        assert!(validator().validate("42").is_default());
    }

    #[test]
    fn commentary_and_fences_are_stripped() {
        let raw = "Here is the breakdown:\n```json\n{\"examples\": \"q: 1+1 a: 2\"}\n```\nHope it helps!";
        let map = validator().validate(raw);
        assert_eq!(map.get("examples"), Some("q: 1+1 a: 2"));
    }

    #[test]
    fn non_string_values_are_coerced() {
        let raw = r#"{"workflows": ["step one", "step two"], "others": null, "examples": 3}"#;
        let map = validator().validate(raw);
        assert_eq!(map.get("workflows"), Some("step one\nstep two"));
        assert_eq!(map.get("others"), Some(""));
        assert_eq!(map.get("examples"), Some("3"));
    }

    #[test]
    fn ties_go_to_the_first_key_in_the_response() {
        let map = validator().validate(r#"{"directivez": "a", "directivey": "b"}"#);
        assert_eq!(map.get("directive"), Some("a"));
        let map = validator().validate(r#"{"directivey": "b", "directivez": "a"}"#);
        assert_eq!(map.get("directive"), Some("b"));
    }

    #[test]
    fn threshold_is_strict() {
        // "directives" vs "directive": one edit over ten chars.
        let raw = r#"{"directives": "x"}"#;
        assert_eq!(validator().validate(raw).get("directive"), Some("x"));
        let strict = validator().with_threshold(0.95);
        assert_eq!(strict.validate(raw).get("directive"), Some(""));
    }
}
