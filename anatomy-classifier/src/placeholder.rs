//! Placeholder detection and single-shot classification.

use std::fmt;
use std::sync::Arc;

use anatomy_adapters::traits::{InferenceRequest, ModelAdapter, complete};
use anatomy_analysis::{closest_match, detect_placeholders, normalize_label, relative_word_positions};
use anatomy_config::PlaceholderSettings;
use anatomy_primitives::{PlaceholderCategory, PlaceholderRecord, Taxonomy};
use anatomy_prompts::placeholder_request;
use tracing::{debug, info, warn};

/// Labels every placeholder of a prompt template with a category and a
/// position.
///
/// Each placeholder costs one service call with no retry. Failures and
/// answers that resemble no category become [`PlaceholderCategory::Others`].
pub struct PlaceholderClassifier {
    adapter: Arc<dyn ModelAdapter>,
    taxonomy: Taxonomy,
    lowered_labels: Vec<String>,
    match_cutoff: f64,
    temperature: f32,
}

impl fmt::Debug for PlaceholderClassifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaceholderClassifier")
            .field("adapter", self.adapter.metadata())
            .field("taxonomy", &self.taxonomy)
            .field("match_cutoff", &self.match_cutoff)
            .field("temperature", &self.temperature)
            .finish_non_exhaustive()
    }
}

impl PlaceholderClassifier {
    /// Creates a classifier with default settings.
    #[must_use]
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self::from_settings(adapter, &PlaceholderSettings::default())
    }

    /// Creates a classifier using explicit settings.
    #[must_use]
    pub fn from_settings(adapter: Arc<dyn ModelAdapter>, settings: &PlaceholderSettings) -> Self {
        let taxonomy = Taxonomy::placeholders();
        let lowered_labels = taxonomy.iter().map(str::to_lowercase).collect();
        Self {
            adapter,
            taxonomy,
            lowered_labels,
            match_cutoff: settings.match_cutoff,
            temperature: settings.temperature,
        }
    }

    /// Overrides the similarity an answer needs to select a category.
    #[must_use]
    pub fn with_match_cutoff(mut self, cutoff: f64) -> Self {
        self.match_cutoff = cutoff;
        self
    }

    /// Detects, locates and classifies every placeholder in
    /// `prompt_template`, in order of appearance.
    pub async fn identify(&self, prompt_template: &str) -> Vec<PlaceholderRecord> {
        let placeholders = detect_placeholders(prompt_template);
        debug!(count = placeholders.len(), "detected placeholders");

        let mut records = Vec::with_capacity(placeholders.len());
        for (placeholder, position) in relative_word_positions(prompt_template, &placeholders) {
            let category = self.classify_placeholder(placeholder, prompt_template).await;
            info!(placeholder, %category, %position, "classified placeholder");
            records.push(PlaceholderRecord::new(placeholder, category, position));
        }
        records
    }

    /// Asks the service for the category of one placeholder.
    pub async fn classify_placeholder(
        &self,
        placeholder: &str,
        prompt_template: &str,
    ) -> PlaceholderCategory {
        let request = match placeholder_request(placeholder, prompt_template) {
            Ok(request) => request,
            Err(err) => {
                warn!(placeholder, error = %err, "failed to build placeholder request");
                return PlaceholderCategory::Others;
            }
        };

        let request = InferenceRequest::user(request).with_temperature(self.temperature);
        match complete(self.adapter.as_ref(), request).await {
            Ok(answer) => self.resolve(&answer),
            Err(err) => {
                warn!(placeholder, error = %err, "placeholder classification failed");
                PlaceholderCategory::Others
            }
        }
    }

    /// Maps a free-form answer to the closest category, or
    /// [`PlaceholderCategory::Others`] when nothing reaches the cutoff.
    #[must_use]
    pub fn resolve(&self, answer: &str) -> PlaceholderCategory {
        let normalized = normalize_label(answer);
        closest_match(
            self.lowered_labels.iter().map(String::as_str),
            &normalized,
            self.match_cutoff,
        )
        .and_then(|hit| self.lowered_labels.iter().position(|label| label == hit))
        .and_then(|index| PlaceholderCategory::from_label(&self.taxonomy.labels()[index]))
        .unwrap_or_else(|| {
            debug!(answer, "answer matched no category");
            PlaceholderCategory::Others
        })
    }
}
