//! Chat-completions adapter for `OpenAI` and Groq.
//!
//! Groq serves the same wire protocol as `OpenAI` under a different base URL,
//! so one adapter covers both; [`Provider`] selects the defaults.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use hyper::header::{AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use hyper::{Body, HeaderMap, Request, StatusCode, Uri};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, trace};

use crate::http_client::{HyperClient, build_https_client};
use crate::traits::{
    AdapterError, AdapterMetadata, AdapterResult, AdapterStream, InferenceChunk, InferenceRequest,
    ModelAdapter,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// A chat-completions provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Provider {
    /// `api.openai.com`.
    OpenAi,
    /// Groq's OpenAI-compatible endpoint.
    Groq,
}

impl Provider {
    /// Short identifier used in logs and errors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Groq => "groq",
        }
    }

    /// Environment variable conventionally holding the API key.
    #[must_use]
    pub const fn api_key_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_API_KEY",
            Self::Groq => "GROQ_API_KEY",
        }
    }

    /// Environment variable that may override the base URL.
    #[must_use]
    pub const fn base_url_env(self) -> &'static str {
        match self {
            Self::OpenAi => "OPENAI_BASE_URL",
            Self::Groq => "GROQ_BASE_URL",
        }
    }

    const fn default_base_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1/",
            Self::Groq => "https://api.groq.com/openai/v1/",
        }
    }
}

/// Settings for a [`ChatAdapter`].
#[derive(Clone)]
pub struct ChatConfig {
    provider: Provider,
    model: String,
    api_key: Option<String>,
    base_url: String,
    timeout: Duration,
    temperature: Option<f32>,
}

impl fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatConfig")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("temperature", &self.temperature)
            .finish()
    }
}

impl ChatConfig {
    /// Targets `model` on `provider` at its public endpoint.
    #[must_use]
    pub fn new(provider: Provider, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            api_key: None,
            base_url: provider.default_base_url().to_owned(),
            timeout: DEFAULT_TIMEOUT,
            temperature: None,
        }
    }

    /// Shorthand for [`Provider::OpenAi`].
    #[must_use]
    pub fn openai(model: impl Into<String>) -> Self {
        Self::new(Provider::OpenAi, model)
    }

    /// Shorthand for [`Provider::Groq`].
    #[must_use]
    pub fn groq(model: impl Into<String>) -> Self {
        Self::new(Provider::Groq, model)
    }

    /// Points the adapter at another compatible endpoint;
    /// `chat/completions` is appended to it.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] unless `base_url` is an
    /// absolute `http` or `https` URL.
    pub fn with_base_url(mut self, base_url: impl AsRef<str>) -> AdapterResult<Self> {
        self.base_url = normalize_base_url(base_url.as_ref())?;
        Ok(self)
    }

    /// Supplies the bearer token.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Temperature sent when a request does not set its own.
    #[must_use]
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Bounds connection setup and each whole exchange.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Selected provider.
    #[must_use]
    pub const fn provider(&self) -> Provider {
        self.provider
    }

    /// Model requested from the provider.
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }
}

/// Calls a chat-completions endpoint over HTTPS, yielding the whole answer
/// as a single chunk.
pub struct ChatAdapter {
    client: HyperClient,
    endpoint: Uri,
    metadata: AdapterMetadata,
    authorization: String,
    timeout: Duration,
    temperature: Option<f32>,
}

impl fmt::Debug for ChatAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChatAdapter")
            .field("metadata", &self.metadata)
            .field("endpoint", &self.endpoint)
            .finish_non_exhaustive()
    }
}

impl ChatAdapter {
    /// Builds the HTTPS client for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AdapterError::Configuration`] when no non-blank API key was
    /// supplied or the endpoint URL is malformed.
    pub fn new(config: ChatConfig) -> AdapterResult<Self> {
        let provider = config.provider.name();
        let Some(api_key) = config.api_key.filter(|key| !key.trim().is_empty()) else {
            return Err(AdapterError::configuration(format!(
                "{provider} requires an API key"
            )));
        };
        let endpoint: Uri = format!("{}chat/completions", config.base_url)
            .parse()
            .map_err(|err| {
                AdapterError::configuration(format!("bad {provider} endpoint: {err}"))
            })?;

        Ok(Self {
            client: build_https_client(config.timeout),
            endpoint,
            metadata: AdapterMetadata::new(provider, config.model),
            authorization: format!("Bearer {}", api_key.trim()),
            timeout: config.timeout,
            temperature: config.temperature,
        })
    }

    fn payload<'a>(&'a self, request: &'a InferenceRequest) -> CompletionBody<'a> {
        CompletionBody {
            model: self.metadata.model(),
            messages: request
                .messages()
                .iter()
                .map(|message| WireMessage {
                    role: message.role().as_str(),
                    content: message.content(),
                })
                .collect(),
            temperature: request.temperature().or(self.temperature),
            max_tokens: request.max_output_tokens(),
        }
    }

    async fn post(&self, body: Vec<u8>) -> AdapterResult<(StatusCode, Option<Duration>, Vec<u8>)> {
        let provider = self.metadata.provider();
        let request = Request::post(self.endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, &self.authorization)
            .body(Body::from(body))
            .map_err(|err| AdapterError::invalid_request(format!("{provider}: {err}")))?;

        let exchange = async move {
            let response = self.client.request(request).await?;
            let status = response.status();
            let retry_after = retry_after(response.headers());
            let bytes = hyper::body::to_bytes(response.into_body()).await?;
            Ok::<_, hyper::Error>((status, retry_after, bytes.to_vec()))
        };

        tokio::time::timeout(self.timeout, exchange)
            .await
            .map_err(|_| {
                AdapterError::transport(format!(
                    "{provider} did not answer within {:?}",
                    self.timeout
                ))
            })?
            .map_err(|err| AdapterError::transport(format!("{provider}: {err}")))
    }
}

#[async_trait]
impl ModelAdapter for ChatAdapter {
    fn metadata(&self) -> &AdapterMetadata {
        &self.metadata
    }

    async fn infer(&self, request: InferenceRequest) -> AdapterResult<AdapterStream> {
        let body = serde_json::to_vec(&self.payload(&request))
            .map_err(|err| AdapterError::invalid_request(err.to_string()))?;
        debug!(
            provider = self.metadata.provider(),
            model = self.metadata.model(),
            "requesting chat completion"
        );

        let (status, retry_after, bytes) = self.post(body).await?;
        let text = interpret(self.metadata.provider(), status, retry_after, &bytes)?;
        trace!(chars = text.len(), "chat completion received");
        Ok(Box::pin(stream::once(async move {
            Ok(InferenceChunk::new(text, true))
        })))
    }
}

#[derive(Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Maps a finished exchange to the generated text or an [`AdapterError`].
/// HTTP 429 becomes [`AdapterError::RateLimited`] carrying the provider's
/// own message.
fn interpret(
    provider: &str,
    status: StatusCode,
    retry_after: Option<Duration>,
    body: &[u8],
) -> AdapterResult<String> {
    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    if !status.is_success() {
        let detail = parsed
            .as_ref()
            .and_then(|value| value.pointer("/error/message"))
            .and_then(Value::as_str)
            .map_or_else(
                || String::from_utf8_lossy(body).trim().to_owned(),
                str::to_owned,
            );
        let reason = format!("{provider} returned {status}: {detail}");
        return Err(if status == StatusCode::TOO_MANY_REQUESTS {
            AdapterError::rate_limited(reason, retry_after)
        } else {
            AdapterError::Response { reason }
        });
    }

    let Some(value) = parsed else {
        return Err(AdapterError::Response {
            reason: format!("{provider} sent a body that is not JSON"),
        });
    };
    Ok(value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned())
}

fn retry_after(headers: &HeaderMap) -> Option<Duration> {
    let seconds: f64 = headers.get(RETRY_AFTER)?.to_str().ok()?.trim().parse().ok()?;
    Duration::try_from_secs_f64(seconds).ok()
}

fn normalize_base_url(raw: &str) -> AdapterResult<String> {
    let trimmed = raw.trim();
    if !trimmed.starts_with("https://") && !trimmed.starts_with("http://") {
        return Err(AdapterError::configuration(format!(
            "base URL `{trimmed}` needs an http:// or https:// scheme"
        )));
    }
    let base = if trimmed.ends_with('/') {
        trimmed.to_owned()
    } else {
        format!("{trimmed}/")
    };
    base.parse::<Uri>()
        .map_err(|err| AdapterError::configuration(format!("base URL `{trimmed}`: {err}")))?;
    Ok(base)
}
