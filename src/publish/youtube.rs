//! YouTube Data API v3 uploads.

use super::{ClipMetadata, Publisher};
use crate::config::PublishSettings;
use crate::error::{PodclipError, Result};
use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const UPLOAD_URL: &str =
    "https://www.googleapis.com/upload/youtube/v3/videos?uploadType=resumable&part=snippet,status";

/// Statuses worth retrying; anything else is final.
const RETRIABLE_STATUSES: [u16; 4] = [500, 502, 503, 504];

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// How a failed HTTP exchange should be handled.
#[derive(Debug, PartialEq, Eq)]
enum Failure {
    Retriable(String),
    Auth(String),
    Fatal(String),
}

impl Failure {
    fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!("{}: {}", status, body.chars().take(300).collect::<String>());
        if RETRIABLE_STATUSES.contains(&status.as_u16()) {
            Failure::Retriable(message)
        } else if status == StatusCode::UNAUTHORIZED
            || status == StatusCode::FORBIDDEN
            || body.contains("invalid_grant")
        {
            Failure::Auth(message)
        } else {
            Failure::Fatal(message)
        }
    }

    fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() || e.is_request() || e.is_body() {
            Failure::Retriable(e.to_string())
        } else {
            Failure::Fatal(e.to_string())
        }
    }

    fn into_error(self) -> PodclipError {
        match self {
            Failure::Auth(msg) => PodclipError::PublishAuth(msg),
            Failure::Retriable(msg) | Failure::Fatal(msg) => PodclipError::Publish(msg),
        }
    }
}

/// Uploads clips with an OAuth refresh token.
pub struct YoutubePublisher {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    privacy_status: String,
    category_id: String,
    max_retries: u32,
}

impl YoutubePublisher {
    pub fn from_settings(settings: &PublishSettings) -> Result<Self> {
        let missing = |name: &str| {
            PodclipError::Config(format!(
                "YouTube {} not configured. Set it in [publish] or via the PODCLIP_YT_* environment variables.",
                name
            ))
        };

        Ok(Self {
            http: reqwest::Client::builder()
                .timeout(Duration::from_secs(600))
                .build()?,
            client_id: settings.client_id().ok_or_else(|| missing("client_id"))?,
            client_secret: settings.client_secret().ok_or_else(|| missing("client_secret"))?,
            refresh_token: settings.refresh_token().ok_or_else(|| missing("refresh_token"))?,
            privacy_status: settings.privacy_status.clone(),
            category_id: settings.category_id.clone(),
            max_retries: settings.max_retries,
        })
    }

    /// Exchange the refresh token for a short-lived access token.
    async fn access_token(&self) -> Result<String> {
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("refresh_token", &self.refresh_token)
            .append_pair("grant_type", "refresh_token")
            .finish();

        let response = self
            .http
            .post(TOKEN_URL)
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(match Failure::from_status(status, &text) {
                // The token endpoint answers 400 for revoked or expired refresh tokens.
                Failure::Fatal(msg) if status == StatusCode::BAD_REQUEST => PodclipError::PublishAuth(msg),
                other => other.into_error(),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Open a resumable session and return its upload URL.
    async fn start_session(&self, token: &str, metadata: &ClipMetadata, length: usize) -> std::result::Result<String, Failure> {
        let response = self
            .http
            .post(UPLOAD_URL)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header("X-Upload-Content-Type", "video/mp4")
            .header("X-Upload-Content-Length", length.to_string())
            .json(&self.video_resource(metadata))
            .send()
            .await
            .map_err(Failure::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(Failure::from_status(status, &text));
        }

        response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
            .ok_or_else(|| Failure::Fatal("Upload session has no location".to_string()))
    }

    async fn send_file(&self, token: &str, session: &str, bytes: Vec<u8>) -> std::result::Result<String, Failure> {
        let response = self
            .http
            .put(session)
            .header(AUTHORIZATION, format!("Bearer {}", token))
            .header(CONTENT_TYPE, "video/mp4")
            .body(bytes)
            .send()
            .await
            .map_err(Failure::from_transport)?;

        let status = response.status();
        let text = response.text().await.map_err(Failure::from_transport)?;
        if !status.is_success() {
            return Err(Failure::from_status(status, &text));
        }

        let json: Value = serde_json::from_str(&text)
            .map_err(|e| Failure::Fatal(format!("Unexpected upload response: {}", e)))?;
        json["id"]
            .as_str()
            .map(|s| s.to_string())
            .ok_or_else(|| Failure::Fatal(format!("Upload response without id: {}", text)))
    }

    fn video_resource(&self, metadata: &ClipMetadata) -> Value {
        json!({
            "snippet": {
                "title": metadata.title,
                "description": metadata.description,
                "tags": metadata.keywords,
                "categoryId": self.category_id,
            },
            "status": {
                "privacyStatus": self.privacy_status,
            }
        })
    }
}

/// Exponential backoff before retry number `attempt` (1-based), capped at 64s.
fn backoff(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(6))
}

#[async_trait]
impl Publisher for YoutubePublisher {
    #[instrument(skip(self, metadata), fields(title = %metadata.title))]
    async fn publish(&self, clip: &Path, metadata: &ClipMetadata) -> Result<String> {
        let bytes = tokio::fs::read(clip).await?;
        let token = self.access_token().await?;

        let mut attempt = 0;
        loop {
            let result = match self.start_session(&token, metadata, bytes.len()).await {
                Ok(session) => {
                    debug!("Upload session opened");
                    self.send_file(&token, &session, bytes.clone()).await
                }
                Err(failure) => Err(failure),
            };

            match result {
                Ok(id) => {
                    info!("Uploaded {} as {}", clip.display(), id);
                    return Ok(id);
                }
                Err(Failure::Retriable(msg)) if attempt < self.max_retries => {
                    attempt += 1;
                    let delay = backoff(attempt);
                    warn!("Retriable upload error ({}), retry {} in {:?}", msg, attempt, delay);
                    tokio::time::sleep(delay).await;
                }
                Err(failure) => return Err(failure.into_error()),
            }
        }
    }
}
