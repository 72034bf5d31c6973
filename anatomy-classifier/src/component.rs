//! Component classification with bounded retries.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anatomy_adapters::traits::{InferenceRequest, ModelAdapter, complete};
use anatomy_analysis::ResponseValidator;
use anatomy_config::ComponentSettings;
use anatomy_primitives::{ComponentMap, Taxonomy};
use anatomy_prompts::component_request;
use tracing::{debug, info, warn};

use crate::rate_limit::{Failure, classify_failure};

/// Result of a single attempt.
#[derive(Debug)]
enum Attempt {
    /// A non-empty breakdown was obtained.
    Success(ComponentMap),
    /// The attempt failed; pause for the given duration (if any) before the
    /// next one.
    Retry { pause: Option<Duration> },
}

/// Splits a prompt into the components of a fixed taxonomy.
///
/// Each call runs a bounded loop: an attempt either yields a non-empty map,
/// which is returned at once, or counts against `max_retries`. Responses that
/// fail to parse and responses that parse to the all-empty map are treated
/// alike. Once every attempt is spent the all-empty map is returned, so
/// [`ComponentClassifier::classify`] never fails.
pub struct ComponentClassifier {
    adapter: Arc<dyn ModelAdapter>,
    validator: ResponseValidator,
    max_retries: u32,
    rate_limit_fallback: Duration,
}

impl fmt::Debug for ComponentClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClassifier")
            .field("adapter", self.adapter.metadata())
            .field("validator", &self.validator)
            .field("max_retries", &self.max_retries)
            .field("rate_limit_fallback", &self.rate_limit_fallback)
            .finish()
    }
}

impl ComponentClassifier {
    /// Creates a classifier over `taxonomy` using default settings.
    #[must_use]
    pub fn new(adapter: Arc<dyn ModelAdapter>, taxonomy: Taxonomy) -> Self {
        Self::from_settings(adapter, taxonomy, &ComponentSettings::default())
    }

    /// Creates a classifier using explicit settings.
    #[must_use]
    pub fn from_settings(
        adapter: Arc<dyn ModelAdapter>,
        taxonomy: Taxonomy,
        settings: &ComponentSettings,
    ) -> Self {
        Self {
            adapter,
            validator: ResponseValidator::new(taxonomy)
                .with_threshold(settings.similarity_threshold),
            max_retries: settings.max_retries,
            rate_limit_fallback: settings.rate_limit_fallback,
        }
    }

    /// Overrides the number of attempts per call.
    #[must_use]
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Overrides the pause used when a rate-limit error carries no hint.
    #[must_use]
    pub fn with_rate_limit_fallback(mut self, fallback: Duration) -> Self {
        self.rate_limit_fallback = fallback;
        self
    }

    /// Returns the taxonomy every result conforms to.
    #[must_use]
    pub fn taxonomy(&self) -> &Taxonomy {
        self.validator.taxonomy()
    }

    /// Returns the number of attempts per call.
    #[must_use]
    pub const fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Returns the all-empty map produced when classification fails.
    #[must_use]
    pub fn default_response(&self) -> ComponentMap {
        self.validator.default_response()
    }

    /// Classifies `prompt`, returning the all-empty map when every attempt
    /// fails.
    pub async fn classify(&self, prompt: &str) -> ComponentMap {
        let request = match component_request(prompt, self.taxonomy()) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "failed to build component request");
                return self.default_response();
            }
        };

        for attempt in 1..=self.max_retries {
            match self.attempt(&request, attempt).await {
                Attempt::Success(components) => {
                    info!(
                        attempt,
                        model = self.adapter.metadata().model(),
                        "classified prompt components"
                    );
                    return components;
                }
                Attempt::Retry { pause: Some(pause) } if attempt < self.max_retries => {
                    warn!(attempt, pause_secs = pause.as_secs_f64(), "rate limited; pausing");
                    tokio::time::sleep(pause).await;
                }
                Attempt::Retry { .. } => {}
            }
        }

        warn!(
            attempts = self.max_retries,
            "component classification exhausted; returning empty breakdown"
        );
        self.default_response()
    }

    async fn attempt(&self, request: &str, attempt: u32) -> Attempt {
        debug!(attempt, "requesting component breakdown");
        let response = complete(self.adapter.as_ref(), InferenceRequest::user(request)).await;

        match response {
            Ok(raw) => match self.validator.try_validate(&raw) {
                Ok(components) if components != self.default_response() => {
                    Attempt::Success(components)
                }
                Ok(_) => {
                    warn!(attempt, "received default response");
                    Attempt::Retry { pause: None }
                }
                Err(err) => {
                    warn!(attempt, error = %err, "error decoding response");
                    Attempt::Retry { pause: None }
                }
            },
            Err(err) => match classify_failure(&err, self.rate_limit_fallback) {
                Failure::RateLimited { wait, source } => {
                    warn!(attempt, error = %err, ?source, "rate limit signal");
                    Attempt::Retry { pause: Some(wait) }
                }
                Failure::Other => {
                    warn!(attempt, error = %err, "unexpected error");
                    Attempt::Retry { pause: None }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anatomy_adapters::traits::{
        AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk,
    };
    use async_trait::async_trait;
    use futures::stream;

    struct EchoAdapter {
        metadata: AdapterMetadata,
        response: String,
    }

    #[async_trait]
    impl ModelAdapter for EchoAdapter {
        fn metadata(&self) -> &AdapterMetadata {
            &self.metadata
        }

        async fn infer(&self, _request: InferenceRequest) -> AdapterResult<AdapterStream> {
            let chunk = InferenceChunk::new(self.response.clone(), true);
            Ok(Box::pin(stream::once(async move { Ok(chunk) })))
        }
    }

    fn classifier(response: &str) -> ComponentClassifier {
        let adapter = Arc::new(EchoAdapter {
            metadata: AdapterMetadata::new("test", "echo"),
            response: response.to_owned(),
        });
        ComponentClassifier::new(adapter, Taxonomy::components())
    }

    #[test]
    fn defaults_come_from_settings() {
        let classifier = classifier("{}");
        assert_eq!(classifier.max_retries(), 3);
        assert_eq!(classifier.taxonomy(), &Taxonomy::components());
        assert!(classifier.default_response().is_default());
    }

    #[tokio::test]
    async fn first_good_response_wins() {
        let map = classifier(r#"{"directive": "translate the text"}"#)
            .classify("Translate {text} to French.")
            .await;
        assert_eq!(map.get("directive"), Some("translate the text"));
    }

    #[tokio::test]
    async fn zero_retries_returns_default_without_calls() {
        let map = classifier(r#"{"directive": "x"}"#)
            .with_max_retries(0)
            .classify("prompt")
            .await;
        assert!(map.is_default());
    }
}
