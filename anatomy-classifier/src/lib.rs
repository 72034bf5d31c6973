//! Classifiers that pair the pure analysis routines with a text-generation
//! service.
//!
//! Both classifiers are infallible once constructed: service failures turn
//! into an empty [`anatomy_primitives::ComponentMap`] or an
//! [`anatomy_primitives::PlaceholderCategory::Others`] label so that callers
//! need no error path.

#![warn(missing_docs, clippy::pedantic)]

mod component;
mod placeholder;
mod rate_limit;

pub use component::ComponentClassifier;
pub use placeholder::PlaceholderClassifier;
pub use rate_limit::{Failure, WaitSource, classify_failure, parse_wait_time};
