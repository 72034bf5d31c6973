//! Classifies every placeholder of a prompt template.
//!
//! Requires `OPENAI_API_KEY`; `OPENAI_BASE_URL` optionally points at another
//! compatible endpoint.

use std::sync::Arc;

use anatomy_adapters::chat::{ChatAdapter, ChatConfig, Provider};
use anatomy_classifier::PlaceholderClassifier;
use anatomy_config::schema::DEFAULT_PLACEHOLDER_MODEL;
use anatomy_config::{EnvLoader, PlaceholderSettings};
use anyhow::Result;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "identify-placeholders", version, about)]
struct Args {
    /// Prompt template containing `{{name}}`, `{name}` or `PLACEHOLDER` markers.
    #[arg(long)]
    prompt: String,

    /// Model served by `OpenAI`.
    #[arg(long, default_value = DEFAULT_PLACEHOLDER_MODEL)]
    model: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    anatomy_telemetry::init_tracing()?;

    let settings = PlaceholderSettings {
        model: args.model,
        ..PlaceholderSettings::default()
    };
    settings.validate()?;

    let env = EnvLoader::from_process();
    let api_key = env.credential(Provider::OpenAi.api_key_env())?;
    let mut config = ChatConfig::openai(settings.model.clone()).with_api_key(api_key.expose());
    if let Some(base_url) = env.optional(Provider::OpenAi.base_url_env()) {
        config = config.with_base_url(base_url)?;
    }
    let adapter = ChatAdapter::new(config)?;
    info!(model = %settings.model, "classifying placeholders");

    let classifier = PlaceholderClassifier::from_settings(Arc::new(adapter), &settings);
    let records = classifier.identify(&args.prompt).await;

    println!("Prompt template: {}", args.prompt);
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
