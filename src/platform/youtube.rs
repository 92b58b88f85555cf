//! YouTube discovery through yt-dlp.

use super::{Discovery, SearchHit, SearchWindow, VideoDetails};
use crate::config::Settings;
use crate::error::{PodclipError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::{debug, instrument};
use url::Url;

const RESULTS_URL: &str = "https://www.youtube.com/results";

/// YouTube search and metadata lookup.
pub struct YoutubeDiscovery {
    max_results: usize,
    week_filter: String,
    month_filter: String,
    cookies_file: Option<PathBuf>,
}

impl YoutubeDiscovery {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            max_results: settings.discovery.max_results,
            week_filter: settings.discovery.week_filter.clone(),
            month_filter: settings.discovery.month_filter.clone(),
            cookies_file: settings.cookies_file(),
        }
    }

    /// Results page URL for `query`, with the upload-date filter for `window`.
    pub fn search_url(&self, query: &str, window: SearchWindow) -> Result<Url> {
        let mut url = Url::parse(RESULTS_URL)
            .map_err(|e| PodclipError::Discovery(format!("Invalid results URL: {}", e)))?;
        url.query_pairs_mut().append_pair("search_query", query);

        let filter = match window {
            SearchWindow::Any => None,
            SearchWindow::ThisMonth => Some(&self.month_filter),
            SearchWindow::ThisWeek => Some(&self.week_filter),
        };
        if let Some(code) = filter.filter(|c| !c.is_empty()) {
            url.query_pairs_mut().append_pair("sp", code);
        }

        Ok(url)
    }

    async fn ytdlp(&self, args: &[&str]) -> Result<String> {
        let mut command = Command::new("yt-dlp");
        if let Some(cookies) = &self.cookies_file {
            command.arg("--cookies").arg(cookies);
        }

        let output = command
            .args(["--no-warnings", "--quiet"])
            .args(args)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PodclipError::ToolNotFound("yt-dlp".to_string())
                } else {
                    PodclipError::Discovery(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PodclipError::Discovery(format!("yt-dlp failed: {}", stderr.trim())));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

#[async_trait]
impl Discovery for YoutubeDiscovery {
    #[instrument(skip(self))]
    async fn search(&self, query: &str, window: SearchWindow) -> Result<Vec<SearchHit>> {
        let url = self.search_url(query, window)?;
        let limit = self.max_results.to_string();
        debug!("Searching {}", url);

        let stdout = self
            .ytdlp(&["--flat-playlist", "--dump-json", "--playlist-end", &limit, url.as_str()])
            .await?;

        Ok(stdout.lines().filter_map(parse_search_line).collect())
    }

    #[instrument(skip(self))]
    async fn lookup(&self, video_id: &str) -> Result<VideoDetails> {
        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let stdout = self
            .ytdlp(&["--skip-download", "--dump-json", &url])
            .await
            .map_err(|e| match e {
                PodclipError::Discovery(msg) => {
                    PodclipError::VideoNotFound(format!("{}: {}", video_id, msg))
                }
                other => other,
            })?;

        let json: Value = serde_json::from_str(stdout.trim()).map_err(|e| {
            PodclipError::Discovery(format!("Failed to parse yt-dlp output: {}", e))
        })?;

        Ok(parse_video_details(&json))
    }
}

/// Parse one `--flat-playlist --dump-json` line. Channels and playlists
/// mixed into the results page are ignored.
fn parse_search_line(line: &str) -> Option<SearchHit> {
    let json: Value = serde_json::from_str(line.trim()).ok()?;

    if let Some(ie_key) = json["ie_key"].as_str() {
        if ie_key != "Youtube" {
            return None;
        }
    }

    let id = json["id"].as_str()?.to_string();
    let title = json["title"].as_str().unwrap_or("Unknown Title").to_string();
    let channel = json["channel"]
        .as_str()
        .or_else(|| json["uploader"].as_str())
        .map(|s| s.to_string());

    Some(SearchHit {
        id,
        title,
        channel,
        view_count: json["view_count"].as_u64(),
    })
}

fn parse_video_details(json: &Value) -> VideoDetails {
    let description = json["description"].as_str().unwrap_or_default().to_string();

    // yt-dlp returns dates as YYYYMMDD
    let upload_date = json["upload_date"]
        .as_str()
        .and_then(|d| chrono::NaiveDate::parse_from_str(d, "%Y%m%d").ok());

    let caption_language = json["automatic_captions"]
        .as_object()
        .and_then(|captions| captions.keys().find(|code| code.ends_with("-orig")))
        .cloned();

    VideoDetails {
        description,
        upload_date,
        caption_language,
    }
}
