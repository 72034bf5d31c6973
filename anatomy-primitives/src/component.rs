//! Component breakdown of a single prompt.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::{Error, Result};
use crate::taxonomy::Taxonomy;

/// Mapping from every taxonomy label to the prompt text assigned to it.
///
/// Every label of the taxonomy is always present and maps to a plain string,
/// possibly empty. Labels outside the taxonomy can never be inserted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentMap {
    taxonomy: Taxonomy,
    values: Vec<String>,
}

impl ComponentMap {
    /// Creates the fallback map: all labels present, all values empty.
    #[must_use]
    pub fn empty(taxonomy: &Taxonomy) -> Self {
        Self {
            taxonomy: taxonomy.clone(),
            values: vec![String::new(); taxonomy.len()],
        }
    }

    /// Builds a map by computing the value of every label in taxonomy order.
    #[must_use]
    pub fn from_fn(taxonomy: &Taxonomy, mut value_for: impl FnMut(&str) -> String) -> Self {
        Self {
            taxonomy: taxonomy.clone(),
            values: taxonomy.iter().map(&mut value_for).collect(),
        }
    }

    /// Assigns `value` to `label`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLabel`] if `label` is not part of the taxonomy.
    pub fn set(&mut self, label: &str, value: impl Into<String>) -> Result<()> {
        let index = self
            .taxonomy
            .position(label)
            .ok_or_else(|| Error::UnknownLabel {
                label: label.to_owned(),
            })?;
        self.values[index] = value.into();
        Ok(())
    }

    /// Builder-style variant of [`ComponentMap::set`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownLabel`] if `label` is not part of the taxonomy.
    pub fn with_value(mut self, label: &str, value: impl Into<String>) -> Result<Self> {
        self.set(label, value)?;
        Ok(self)
    }

    /// Returns the value stored under `label`.
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&str> {
        self.taxonomy
            .position(label)
            .map(|index| self.values[index].as_str())
    }

    /// Returns `true` when no label carries any text.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.values.iter().all(String::is_empty)
    }

    /// Returns the taxonomy backing this map.
    #[must_use]
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Returns the number of entries, always equal to the taxonomy size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` only for a map over an empty taxonomy.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over `(label, value)` pairs in taxonomy order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.taxonomy
            .iter()
            .zip(self.values.iter().map(String::as_str))
    }
}

impl Serialize for ComponentMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (label, value) in self.iter() {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}
