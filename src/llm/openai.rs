//! OpenAI-compatible structured output.

use super::{parse_json_content, LanguageModel, StructuredRequest};
use crate::config::LlmSettings;
use crate::error::{PodclipError, Result};
use crate::openai::create_client;
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs, ResponseFormat,
    ResponseFormatJsonSchema,
};
use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

/// Chat-completions model constrained by a strict JSON schema.
pub struct OpenAiModel {
    client: async_openai::Client<async_openai::config::OpenAIConfig>,
    model: String,
    temperature: f32,
}

impl OpenAiModel {
    pub fn from_settings(settings: &LlmSettings) -> Result<Self> {
        Ok(Self {
            client: create_client(settings)?,
            model: settings.model.clone(),
            temperature: settings.temperature,
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    #[instrument(skip(self, request), fields(schema = request.name, model = %self.model))]
    async fn complete_json(&self, request: &StructuredRequest) -> Result<Value> {
        let messages: Vec<ChatCompletionRequestMessage> = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(request.system.clone())
                .build()
                .map_err(|e| PodclipError::Model(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(request.user.clone())
                .build()
                .map_err(|e| PodclipError::Model(e.to_string()))?
                .into(),
        ];

        let response_format = ResponseFormat::JsonSchema {
            json_schema: ResponseFormatJsonSchema {
                description: None,
                name: request.name.to_string(),
                schema: Some(request.schema.clone()),
                strict: Some(true),
            },
        };

        let chat_request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(self.temperature)
            .response_format(response_format)
            .build()
            .map_err(|e| PodclipError::Model(e.to_string()))?;

        let response = self.client.chat().create(chat_request).await.map_err(|e| {
            PodclipError::OpenAI(format!("'{}' request failed: {}", request.name, e))
        })?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.as_ref())
            .ok_or_else(|| PodclipError::Model("Empty response from model".to_string()))?;

        debug!("Model response: {}", content.chars().take(500).collect::<String>());

        parse_json_content(content)
    }
}
