//! The text-generation capability consumed by the classifiers.
//!
//! A [`ModelAdapter`] turns an [`InferenceRequest`] into a stream of
//! [`InferenceChunk`]s. Classifiers only need the final text, which
//! [`complete`] collects.

use std::pin::Pin;
use std::time::Duration;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use thiserror::Error;

/// Result alias for adapter operations.
pub type AdapterResult<T> = Result<T, AdapterError>;

/// Chunks produced by one [`ModelAdapter::infer`] call.
pub type AdapterStream = Pin<Box<dyn Stream<Item = AdapterResult<InferenceChunk>> + Send>>;

/// Failures raised while talking to a text-generation service.
#[derive(Debug, Error)]
pub enum AdapterError {
    /// Missing credentials or an unusable endpoint.
    #[error("service misconfigured: {reason}")]
    Configuration {
        /// What is wrong with the configuration.
        reason: String,
    },

    /// The request could not be formed or encoded.
    #[error("completion request rejected: {reason}")]
    InvalidRequest {
        /// What is wrong with the request.
        reason: String,
    },

    /// The service could not be reached, or the exchange broke off.
    #[error("service unreachable: {reason}")]
    Transport {
        /// Underlying I/O or protocol failure.
        reason: String,
    },

    /// The service is throttling this client.
    #[error("service rate limited: {reason}")]
    RateLimited {
        /// Provider message, usually carrying a `try again in <n>s` hint.
        reason: String,
        /// Delay advertised by the `retry-after` header, if any.
        retry_after: Option<Duration>,
    },

    /// A non-success status or an undecodable body.
    #[error("unusable service response: {reason}")]
    Response {
        /// Status line or decoding failure.
        reason: String,
    },
}

impl AdapterError {
    /// Builds an [`AdapterError::Configuration`].
    #[must_use]
    pub fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }

    /// Builds an [`AdapterError::InvalidRequest`].
    #[must_use]
    pub fn invalid_request(reason: impl Into<String>) -> Self {
        Self::InvalidRequest {
            reason: reason.into(),
        }
    }

    /// Builds an [`AdapterError::Transport`].
    #[must_use]
    pub fn transport(reason: impl Into<String>) -> Self {
        Self::Transport {
            reason: reason.into(),
        }
    }

    /// Builds an [`AdapterError::RateLimited`].
    #[must_use]
    pub fn rate_limited(reason: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            reason: reason.into(),
            retry_after,
        }
    }

    /// The `retry-after` hint of a rate-limit error.
    #[must_use]
    pub const fn retry_after(&self) -> Option<Duration> {
        if let Self::RateLimited { retry_after, .. } = self {
            *retry_after
        } else {
            None
        }
    }
}

/// Identifies the provider and model behind an adapter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdapterMetadata {
    provider: &'static str,
    model: String,
}

impl AdapterMetadata {
    /// Describes `model` served by `provider`.
    #[must_use]
    pub fn new(provider: &'static str, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
        }
    }

    /// Provider identifier such as `"groq"` or `"openai"`.
    #[must_use]
    pub const fn provider(&self) -> &'static str {
        self.provider
    }

    /// Model identifier sent with each request.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Author of a [`Message`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Standing instructions.
    System,
    /// The request proper.
    User,
}

impl Role {
    /// Wire name used by chat-completions APIs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

/// One turn of a chat-style request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    role: Role,
    content: String,
}

impl Message {
    /// A system turn.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// A user turn.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Author of the turn.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Text of the turn.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Input to [`ModelAdapter::infer`].
#[derive(Clone, Debug, PartialEq)]
pub struct InferenceRequest {
    messages: Vec<Message>,
    max_output_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl InferenceRequest {
    /// Builds a request from a conversation.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::InvalidRequest`] for an empty conversation.
    pub fn new(messages: Vec<Message>) -> AdapterResult<Self> {
        if messages.is_empty() {
            return Err(AdapterError::invalid_request("no messages to send"));
        }
        Ok(Self {
            messages,
            max_output_tokens: None,
            temperature: None,
        })
    }

    /// Builds a request consisting of one user message, which is how both
    /// classifiers talk to the service.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::user(content)],
            max_output_tokens: None,
            temperature: None,
        }
    }

    /// Caps the length of the generated text.
    #[must_use]
    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    /// Overrides the sampling temperature.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// The conversation to send.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Output length cap, if any.
    #[must_use]
    pub const fn max_output_tokens(&self) -> Option<u32> {
        self.max_output_tokens
    }

    /// Sampling temperature; `None` leaves the adapter default in place.
    #[must_use]
    pub const fn temperature(&self) -> Option<f32> {
        self.temperature
    }
}

/// A piece of generated text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InferenceChunk {
    /// Text produced since the previous chunk.
    pub delta: String,
    /// Set on the last chunk of a response.
    pub done: bool,
}

impl InferenceChunk {
    /// Wraps a piece of text.
    #[must_use]
    pub fn new(delta: impl Into<String>, done: bool) -> Self {
        Self {
            delta: delta.into(),
            done,
        }
    }
}

/// A text-generation service.
#[async_trait]
pub trait ModelAdapter: Send + Sync {
    /// Provider and model behind this adapter.
    fn metadata(&self) -> &AdapterMetadata;

    /// Sends `request` and streams back the generated text.
    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream>;
}

/// Sends `request` and joins the streamed text, stopping at the first chunk
/// marked `done`.
///
/// # Errors
///
/// Propagates the first error raised by the adapter or its stream.
pub async fn complete(
    adapter: &dyn ModelAdapter,
    request: InferenceRequest,
) -> AdapterResult<String> {
    let mut chunks = adapter.infer(request).await?;
    let mut text = String::new();
    while let Some(InferenceChunk { delta, done }) = chunks.next().await.transpose()? {
        text.push_str(&delta);
        if done {
            break;
        }
    }
    Ok(text)
}
