//! Prints the component breakdown of a prompt.
//!
//! Requires `GROQ_API_KEY`; `GROQ_BASE_URL` optionally points at another
//! compatible endpoint.

use std::sync::Arc;

use anatomy_adapters::chat::{ChatAdapter, ChatConfig, Provider};
use anatomy_classifier::ComponentClassifier;
use anatomy_config::schema::DEFAULT_COMPONENT_MODEL;
use anatomy_config::{ComponentSettings, EnvLoader};
use anatomy_primitives::Taxonomy;
use anyhow::Result;
use clap::Parser;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "identify-components", version, about)]
struct Args {
    /// Prompt to break into components.
    #[arg(long)]
    prompt: String,

    /// Model served by Groq.
    #[arg(long, default_value = DEFAULT_COMPONENT_MODEL)]
    model: String,

    /// Attempts before giving up and printing the empty breakdown.
    #[arg(long, default_value_t = 3)]
    max_retries: u32,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    anatomy_telemetry::init_tracing()?;

    let settings = ComponentSettings {
        model: args.model,
        max_retries: args.max_retries,
        ..ComponentSettings::default()
    };
    settings.validate()?;

    let env = EnvLoader::from_process();
    let api_key = env.credential(Provider::Groq.api_key_env())?;
    let mut config = ChatConfig::groq(settings.model.clone()).with_api_key(api_key.expose());
    if let Some(base_url) = env.optional(Provider::Groq.base_url_env()) {
        config = config.with_base_url(base_url)?;
    }
    let adapter = ChatAdapter::new(config)?;
    info!(model = %settings.model, "classifying prompt components");

    let classifier =
        ComponentClassifier::from_settings(Arc::new(adapter), Taxonomy::components(), &settings);
    let components = classifier.classify(&args.prompt).await;

    println!("Detected Components:");
    println!("{}", serde_json::to_string_pretty(&components)?);
    Ok(())
}
