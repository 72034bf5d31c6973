//! Fixed category lists that classifiers reconcile free-form text against.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

const MAX_LABEL_LEN: usize = 64;

/// Canonical component categories, in output order.
pub const COMPONENT_LABELS: [&str; 8] = [
    "profile/role",
    "directive",
    "workflows",
    "context",
    "examples",
    "output format/style",
    "constraints",
    "others",
];

/// Canonical placeholder categories, in output order.
pub const PLACEHOLDER_LABELS: [&str; 5] = [
    "User Question",
    "Contextual Information",
    "Knowledge Input",
    "Metadata/Short Phrases",
    "Others",
];

/// Immutable, ordered list of category labels.
///
/// Cloning is cheap: the label list is shared behind an [`Arc`]. Two
/// taxonomies compare equal when they hold the same labels in the same order.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Taxonomy {
    labels: Arc<[String]>,
}

impl Taxonomy {
    /// Creates a taxonomy from the supplied labels after validating them.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTaxonomy`] if the list is empty, a label is
    /// blank or too long, or a label appears more than once.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(Error::invalid_taxonomy("taxonomy requires at least one label"));
        }

        let mut seen = BTreeSet::new();
        for label in &labels {
            if label.trim().is_empty() {
                return Err(Error::invalid_taxonomy("labels cannot be blank"));
            }
            if label.len() > MAX_LABEL_LEN {
                return Err(Error::invalid_taxonomy(format!(
                    "label `{label}` exceeds {MAX_LABEL_LEN} bytes"
                )));
            }
            if !seen.insert(label.as_str()) {
                return Err(Error::invalid_taxonomy(format!(
                    "label `{label}` is declared twice"
                )));
            }
        }

        Ok(Self {
            labels: labels.into(),
        })
    }

    /// The eight prompt component categories.
    #[must_use]
    pub fn components() -> Self {
        Self::from_static(&COMPONENT_LABELS)
    }

    /// The five placeholder categories.
    #[must_use]
    pub fn placeholders() -> Self {
        Self::from_static(&PLACEHOLDER_LABELS)
    }

    fn from_static(labels: &[&str]) -> Self {
        Self {
            labels: labels.iter().map(|label| (*label).to_owned()).collect(),
        }
    }

    /// Returns the labels in declaration order.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always `false` for a validated taxonomy; provided for API symmetry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Returns the index of `label`, if defined.
    #[must_use]
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|candidate| candidate == label)
    }

    /// Returns `true` when `label` is part of the taxonomy.
    #[must_use]
    pub fn contains(&self, label: &str) -> bool {
        self.position(label).is_some()
    }

    /// Iterates over the labels in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

impl fmt::Debug for Taxonomy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.labels.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_taxonomies_keep_order() {
        let components = Taxonomy::components();
        assert_eq!(components.len(), 8);
        assert_eq!(components.labels()[0], "profile/role");
        assert_eq!(components.labels()[7], "others");

        let placeholders = Taxonomy::placeholders();
        assert_eq!(placeholders.len(), 5);
        assert_eq!(placeholders.position("Knowledge Input"), Some(2));
    }

    #[test]
    fn rejects_empty_taxonomy() {
        let err = Taxonomy::new(Vec::<String>::new()).expect_err("empty taxonomy");
        assert!(matches!(err, Error::InvalidTaxonomy { .. }));
    }

    #[test]
    fn rejects_duplicate_and_blank_labels() {
        assert!(Taxonomy::new(["a", "b", "a"]).is_err());
        assert!(Taxonomy::new(["a", "  "]).is_err());
        assert!(Taxonomy::new(["x".repeat(MAX_LABEL_LEN + 1)]).is_err());
    }

    #[test]
    fn custom_taxonomy_lookup() {
        let taxonomy = Taxonomy::new(["intro", "body"]).unwrap();
        assert!(taxonomy.contains("body"));
        assert!(!taxonomy.contains("outro"));
        assert_eq!(taxonomy.iter().collect::<Vec<_>>(), vec!["intro", "body"]);
    }
}
