//! Request construction for the prompt classifiers.
//!
//! [`template`] provides `{{slot}}` rendering; [`requests`] holds the two
//! instruction templates sent to the text-generation service.

#![warn(missing_docs, clippy::pedantic)]

pub mod requests;
pub mod template;

pub use requests::{component_request, placeholder_request};
pub use template::{PromptTemplate, TemplateError, TemplateResult};
