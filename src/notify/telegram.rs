//! Telegram Bot API alerts.

use super::Notifier;
use crate::error::Result;
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Sends alerts to one Telegram chat.
pub struct TelegramNotifier {
    http: reqwest::Client,
    endpoint: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(token: String, chat_id: String) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            endpoint: format!("https://api.telegram.org/bot{}/sendMessage", token),
            chat_id,
        })
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text: message,
        };

        match self.http.post(&self.endpoint).json(&body).send().await {
            Ok(response) if response.status().is_success() => debug!("Alert sent"),
            Ok(response) => warn!("Telegram rejected alert: {}", response.status()),
            Err(e) => warn!("Failed to send alert: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_shape() {
        let body = serde_json::to_value(SendMessage {
            chat_id: "42",
            text: "UPLOADING 3 videos",
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({ "chat_id": "42", "text": "UPLOADING 3 videos" }));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_swallowed() {
        let mut notifier = TelegramNotifier::new("token".to_string(), "1".to_string()).unwrap();
        notifier.endpoint = "http://127.0.0.1:9/sendMessage".to_string();
        notifier.notify("hello").await;
    }
}
