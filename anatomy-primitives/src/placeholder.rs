//! Placeholder categories and per-occurrence classification records.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Semantic role of a templating placeholder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaceholderCategory {
    /// Queries or questions supplied by the end user.
    #[serde(rename = "User Question")]
    UserQuestion,
    /// Background material such as chat history or preferences.
    #[serde(rename = "Contextual Information")]
    ContextualInformation,
    /// The primary content the prompt processes.
    #[serde(rename = "Knowledge Input")]
    KnowledgeInput,
    /// Short configuration values: names, formats, languages.
    #[serde(rename = "Metadata/Short Phrases")]
    Metadata,
    /// Anything that fits none of the above.
    #[serde(rename = "Others")]
    Others,
}

impl PlaceholderCategory {
    /// All categories in canonical order.
    pub const ALL: [Self; 5] = [
        Self::UserQuestion,
        Self::ContextualInformation,
        Self::KnowledgeInput,
        Self::Metadata,
        Self::Others,
    ];

    /// Returns the canonical label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::UserQuestion => "User Question",
            Self::ContextualInformation => "Contextual Information",
            Self::KnowledgeInput => "Knowledge Input",
            Self::Metadata => "Metadata/Short Phrases",
            Self::Others => "Others",
        }
    }

    /// Looks up a category by its exact canonical label.
    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|category| category.label() == label)
    }
}

impl fmt::Display for PlaceholderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse location of a placeholder within the prompt, by word thirds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Position {
    /// First third of the prompt.
    Beginning,
    /// Middle third of the prompt.
    Middle,
    /// Final third of the prompt.
    End,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Beginning => "Beginning",
            Self::Middle => "Middle",
            Self::End => "End",
        })
    }
}

/// Classification of one placeholder occurrence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderRecord {
    placeholder: String,
    category: PlaceholderCategory,
    position: Position,
}

impl PlaceholderRecord {
    /// Creates a record for the supplied placeholder text.
    #[must_use]
    pub fn new(
        placeholder: impl Into<String>,
        category: PlaceholderCategory,
        position: Position,
    ) -> Self {
        Self {
            placeholder: placeholder.into(),
            category,
            position,
        }
    }

    /// Returns the literal placeholder text, e.g. `{{question}}`.
    #[must_use]
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Returns the resolved category.
    #[must_use]
    pub const fn category(&self) -> PlaceholderCategory {
        self.category
    }

    /// Returns the position label.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::PLACEHOLDER_LABELS;

    #[test]
    fn labels_match_taxonomy_constants() {
        let labels: Vec<_> = PlaceholderCategory::ALL
            .into_iter()
            .map(PlaceholderCategory::label)
            .collect();
        assert_eq!(labels, PLACEHOLDER_LABELS);
    }

    #[test]
    fn from_label_is_exact() {
        assert_eq!(
            PlaceholderCategory::from_label("Knowledge Input"),
            Some(PlaceholderCategory::KnowledgeInput)
        );
        assert_eq!(PlaceholderCategory::from_label("knowledge input"), None);
    }

    #[test]
    fn record_serializes_with_labels() {
        let record = PlaceholderRecord::new(
            "{{name}}",
            PlaceholderCategory::Metadata,
            Position::Beginning,
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["placeholder"], "{{name}}");
        assert_eq!(json["category"], "Metadata/Short Phrases");
        assert_eq!(json["position"], "Beginning");
    }
}
