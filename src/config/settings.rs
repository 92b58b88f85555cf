//! Configuration settings for podclip.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub discovery: DiscoverySettings,
    pub llm: LlmSettings,
    pub moments: MomentSettings,
    pub selection: SelectionSettings,
    pub publish: PublishSettings,
    pub notify: NotifySettings,
    pub pipeline: PipelineSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory for persistent application data.
    pub data_dir: String,
    /// Working directory for per-cycle media artifacts. Emptied after every cycle.
    pub work_dir: String,
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.podclip".to_string(),
            work_dir: "/tmp/podclip".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Podcast discovery settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Search query sent to the video platform.
    pub query: String,
    /// Maximum number of search results per discovery call.
    pub max_results: usize,
    /// Platform filter code restricting results to the current week.
    pub week_filter: String,
    /// Platform filter code restricting results to the current month.
    pub month_filter: String,
    /// Netscape-format cookies file passed to yt-dlp.
    pub cookies_file: Option<String>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            query: "podcast".to_string(),
            max_results: 15,
            week_filter: "EgIIAw".to_string(),
            month_filter: "EgQIBBAB".to_string(),
            cookies_file: None,
        }
    }
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmSettings {
    /// Chat model used for selection and moment extraction.
    pub model: String,
    /// Base URL of an OpenAI-compatible API. Defaults to OpenAI.
    pub api_base: Option<String>,
    /// Environment variable holding the API key.
    pub api_key_env: String,
    pub temperature: f32,
    /// Request timeout in seconds.
    pub timeout_seconds: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4.1-mini".to_string(),
            api_base: None,
            api_key_env: "OPENAI_API_KEY".to_string(),
            temperature: 0.7,
            timeout_seconds: 300,
        }
    }
}

/// Moment extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentSettings {
    /// Soft cap on the rendered size of one transcript chunk.
    pub chunk_max_chars: usize,
    /// Shortest accepted clip, in seconds.
    pub min_seconds: u64,
    /// Longest accepted clip, in seconds.
    pub max_seconds: u64,
    /// Pause between consecutive model calls, in seconds.
    pub call_delay_seconds: u64,
}

impl Default for MomentSettings {
    fn default() -> Self {
        Self {
            chunk_max_chars: 70_000,
            min_seconds: 60,
            max_seconds: 150,
            call_delay_seconds: 5,
        }
    }
}

/// Podcast selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Content languages a podcast may be in.
    pub languages: Vec<String>,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            languages: vec!["en".to_string(), "hi".to_string()],
        }
    }
}

/// Clip upload settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishSettings {
    /// Privacy status of uploaded clips (public, private, unlisted).
    pub privacy_status: String,
    /// Platform category id.
    pub category_id: String,
    /// OAuth client id (env: PODCLIP_YT_CLIENT_ID).
    pub client_id: Option<String>,
    /// OAuth client secret (env: PODCLIP_YT_CLIENT_SECRET).
    pub client_secret: Option<String>,
    /// OAuth refresh token (env: PODCLIP_YT_REFRESH_TOKEN).
    pub refresh_token: Option<String>,
    /// Pause between consecutive uploads, in seconds.
    pub upload_delay_seconds: u64,
    /// Retries for a single upload on transient failures.
    pub max_retries: u32,
}

impl Default for PublishSettings {
    fn default() -> Self {
        Self {
            privacy_status: "public".to_string(),
            category_id: "27".to_string(),
            client_id: None,
            client_secret: None,
            refresh_token: None,
            upload_delay_seconds: 300,
            max_retries: 10,
        }
    }
}

impl PublishSettings {
    pub fn client_id(&self) -> Option<String> {
        env_or("PODCLIP_YT_CLIENT_ID", &self.client_id)
    }

    pub fn client_secret(&self) -> Option<String> {
        env_or("PODCLIP_YT_CLIENT_SECRET", &self.client_secret)
    }

    pub fn refresh_token(&self) -> Option<String> {
        env_or("PODCLIP_YT_REFRESH_TOKEN", &self.refresh_token)
    }

    /// Whether all OAuth credentials needed for uploading are present.
    pub fn has_credentials(&self) -> bool {
        self.client_id().is_some() && self.client_secret().is_some() && self.refresh_token().is_some()
    }
}

/// Operator notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct NotifySettings {
    /// Telegram bot token (env: PODCLIP_TELEGRAM_TOKEN).
    pub telegram_bot_token: Option<String>,
    /// Telegram chat id (env: PODCLIP_TELEGRAM_CHAT_ID).
    pub telegram_chat_id: Option<String>,
}

impl NotifySettings {
    /// Telegram token and chat id, if both are configured.
    pub fn telegram(&self) -> Option<(String, String)> {
        let token = env_or("PODCLIP_TELEGRAM_TOKEN", &self.telegram_bot_token)?;
        let chat_id = env_or("PODCLIP_TELEGRAM_CHAT_ID", &self.telegram_chat_id)?;
        Some((token, chat_id))
    }
}

/// Pipeline control settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// JSON file holding the ids of already published podcasts.
    pub exclusion_path: String,
    /// Idle time after a failed cycle before starting a fresh one, in seconds.
    pub failure_backoff_seconds: u64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            exclusion_path: "~/.podclip/burnt_podcasts.json".to_string(),
            failure_backoff_seconds: 3600,
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

fn env_or(var: &str, fallback: &Option<String>) -> Option<String> {
    std::env::var(var)
        .ok()
        .or_else(|| fallback.clone())
        .filter(|v| !v.trim().is_empty())
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::PodclipError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("podclip")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded work directory path.
    pub fn work_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.work_dir)
    }

    /// Get the expanded exclusion store path.
    pub fn exclusion_path(&self) -> PathBuf {
        Self::expand_path(&self.pipeline.exclusion_path)
    }

    /// Expanded cookies file path, if configured.
    pub fn cookies_file(&self) -> Option<PathBuf> {
        self.discovery
            .cookies_file
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(Self::expand_path)
    }

    pub fn upload_delay(&self) -> Duration {
        Duration::from_secs(self.publish.upload_delay_seconds)
    }

    pub fn failure_backoff(&self) -> Duration {
        Duration::from_secs(self.pipeline.failure_backoff_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.discovery.max_results, 15);
        assert_eq!(settings.moments.min_seconds, 60);
        assert_eq!(settings.moments.max_seconds, 150);
        assert_eq!(settings.selection.languages, vec!["en", "hi"]);
        assert_eq!(settings.upload_delay(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [moments]
            chunk_max_chars = 5000

            [discovery]
            query = "interview"
            "#,
        )
        .unwrap();

        assert_eq!(settings.moments.chunk_max_chars, 5000);
        assert_eq!(settings.moments.max_seconds, 150);
        assert_eq!(settings.discovery.query, "interview");
        assert_eq!(settings.discovery.week_filter, "EgIIAw");
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut settings = Settings::default();
        settings.llm.model = "custom-model".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.llm.model, "custom-model");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = PathBuf::from("/nonexistent/podclip/config.toml");
        let settings = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(settings.pipeline.failure_backoff_seconds, 3600);
    }
}
