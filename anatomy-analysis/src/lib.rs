//! Pure analysis routines behind the classifiers.
//!
//! Nothing in this crate talks to the network: [`position`] inspects prompt
//! text, [`matcher`] scores labels against a taxonomy, and [`validator`]
//! coerces untrusted model output into a [`anatomy_primitives::ComponentMap`].

#![warn(missing_docs, clippy::pedantic)]

pub mod matcher;
pub mod position;
pub mod validator;

pub use matcher::{
    BestMatch, answer_similarity, best_match, closest_match, normalize_label, similarity,
};
pub use position::{classify_position, detect_placeholders, relative_word_positions};
pub use validator::{
    DEFAULT_SIMILARITY_THRESHOLD, ResponseError, ResponseValidator, default_response,
};
