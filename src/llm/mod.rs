//! Structured-output language model access.
//!
//! Everything podclip asks a model for comes back as a JSON object of a
//! fixed shape. Callers describe that shape with a JSON schema and parse
//! the returned value into their own serde types, validating it on the way
//! in because the model is an untrusted producer.

mod openai;
#[cfg(test)]
mod scripted;

pub use openai::OpenAiModel;
#[cfg(test)]
pub use scripted::ScriptedModel;

use crate::error::{PodclipError, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// One structured-output request.
#[derive(Debug, Clone)]
pub struct StructuredRequest {
    /// Schema name, also used to route scripted responses in tests.
    pub name: &'static str,
    pub system: String,
    pub user: String,
    /// JSON schema the response object must follow.
    pub schema: Value,
}

/// Trait for models that answer with a JSON object.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Run the request and return the parsed JSON object.
    async fn complete_json(&self, request: &StructuredRequest) -> Result<Value>;
}

/// Deserialize a model response into `T`.
pub fn decode<T: DeserializeOwned>(request: &StructuredRequest, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        PodclipError::Model(format!("Response for '{}' has the wrong shape: {}", request.name, e))
    })
}

/// Parse a raw completion into a JSON value.
///
/// Some OpenAI-compatible backends wrap JSON in a markdown fence even in
/// JSON mode, so the outermost object is cut out before parsing.
pub fn parse_json_content(content: &str) -> Result<Value> {
    let start = content.find('{');
    let end = content.rfind('}');

    let json_str = match (start, end) {
        (Some(start), Some(end)) if end > start => &content[start..=end],
        _ => content,
    };

    serde_json::from_str(json_str).map_err(|e| {
        PodclipError::Model(format!(
            "Failed to parse model response: {}. Response was: {}",
            e,
            content.chars().take(500).collect::<String>()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_json() {
        let value = parse_json_content(r#"{"selected": true}"#).unwrap();
        assert_eq!(value["selected"], true);
    }

    #[test]
    fn test_parse_fenced_json() {
        let response = "```json\n{\"moments\": []}\n```";
        let value = parse_json_content(response).unwrap();
        assert!(value["moments"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_json_content("no json here").is_err());
    }
}
