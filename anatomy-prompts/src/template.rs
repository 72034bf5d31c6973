//! Instruction templates with `{{slot}}` substitution.

use std::fmt;

use thiserror::Error;

/// Result alias for template rendering.
pub type TemplateResult<T> = Result<T, TemplateError>;

/// Rendering failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// The template has a slot that no value was supplied for.
    #[error("no value supplied for slot `{name}`")]
    MissingValue {
        /// Slot name.
        name: String,
    },

    /// A value was supplied for a slot the template does not have.
    #[error("template has no slot named `{name}`")]
    UnknownSlot {
        /// Name of the stray value.
        name: String,
    },
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(String),
}

/// A template split once into literal text and named slots.
///
/// `{{name}}` (surrounding whitespace allowed) marks a slot when `name`
/// consists of ASCII letters, digits and `_`. Anything else between double
/// braces, single braces, and unterminated `{{` are plain text. Values are
/// inserted verbatim and never parsed themselves, so a prompt containing
/// `{{...}}` survives rendering unchanged.
///
/// ```
/// use anatomy_prompts::template::PromptTemplate;
///
/// let template = PromptTemplate::parse("Classify '{{placeholder}}'.");
/// let rendered = template.render(&[("placeholder", "{{question}}")]).unwrap();
/// assert_eq!(rendered, "Classify '{{question}}'.");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Splits `source` into segments.
    #[must_use]
    pub fn parse(source: impl Into<String>) -> Self {
        let source = source.into();
        let segments = split_segments(&source);
        Self { source, segments }
    }

    /// Distinct slot names in order of first appearance.
    #[must_use]
    pub fn slots(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(name) = segment {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }

    /// Fills every slot from `values`.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::UnknownSlot`] for a value naming no slot and
    /// [`TemplateError::MissingValue`] for a slot left without a value.
    pub fn render(&self, values: &[(&str, &str)]) -> TemplateResult<String> {
        let slots = self.slots();
        if let Some((stray, _)) = values.iter().find(|(name, _)| !slots.contains(name)) {
            return Err(TemplateError::UnknownSlot {
                name: (*stray).to_owned(),
            });
        }

        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(name) => {
                    let (_, value) = values
                        .iter()
                        .find(|(candidate, _)| candidate == name)
                        .ok_or_else(|| TemplateError::MissingValue { name: name.clone() })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }

    /// The unparsed template text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for PromptTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn is_slot_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn split_segments(source: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut rest = source;

    while let Some(open) = rest.find("{{") {
        let inner = &rest[open + 2..];
        let Some(close) = inner.find("}}") else {
            break;
        };
        let name = inner[..close].trim();
        if is_slot_name(name) {
            literal.push_str(&rest[..open]);
            if !literal.is_empty() {
                segments.push(Segment::Literal(std::mem::take(&mut literal)));
            }
            segments.push(Segment::Slot(name.to_owned()));
            rest = &inner[close + 2..];
        } else {
            literal.push_str(&rest[..open + 2]);
            rest = inner;
        }
    }

    literal.push_str(rest);
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    segments
}
