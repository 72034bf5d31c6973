//! Text-generation service adapters used by the classifiers.
//!
//! [`traits`] defines the capability the classifiers depend on; [`chat`]
//! implements it over the chat-completions protocol spoken by `OpenAI` and
//! Groq.

#![warn(missing_docs, clippy::pedantic)]

pub mod chat;
pub mod traits;

mod http_client;
