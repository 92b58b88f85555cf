//! OpenAI-compatible client construction.

use crate::config::LlmSettings;
use crate::error::{PodclipError, Result};
use async_openai::{config::OpenAIConfig, Client};
use std::time::Duration;

/// Create a client from the language model settings.
///
/// The API key is read from the environment variable named in
/// `settings.api_key_env`, and `settings.api_base` lets the same client
/// talk to any OpenAI-compatible endpoint.
pub fn create_client(settings: &LlmSettings) -> Result<Client<OpenAIConfig>> {
    let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
        PodclipError::Config(format!("{} is not set", settings.api_key_env))
    })?;

    let mut config = OpenAIConfig::new().with_api_key(api_key);
    if let Some(base) = settings.api_base.as_deref().filter(|b| !b.is_empty()) {
        config = config.with_api_base(base);
    }

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(settings.timeout_seconds))
        .build()?;

    Ok(Client::with_config(config).with_http_client(http_client))
}
