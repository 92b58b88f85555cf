//! Podcast discovery on the video platform.
//!
//! Discovery is a two-step affair: a search returns lightweight hits, then
//! each hit is looked up individually for its description, upload date and
//! caption language. A failed lookup only costs that one candidate.

mod youtube;

pub use youtube::YoutubeDiscovery;

use crate::error::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Upload-date window applied to a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchWindow {
    Any,
    ThisMonth,
    ThisWeek,
}

impl std::fmt::Display for SearchWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchWindow::Any => write!(f, "any"),
            SearchWindow::ThisMonth => write!(f, "month"),
            SearchWindow::ThisWeek => write!(f, "week"),
        }
    }
}

/// One row of a search result page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub id: String,
    pub title: String,
    pub channel: Option<String>,
    pub view_count: Option<u64>,
}

/// Per-video details that the search page does not carry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoDetails {
    pub description: String,
    pub upload_date: Option<NaiveDate>,
    /// Language selector for the video's original-language automatic captions.
    pub caption_language: Option<String>,
}

/// A podcast discovered in this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub title: String,
    pub description: String,
    pub channel: Option<String>,
    pub publish_time: Option<NaiveDate>,
    pub view_count: Option<u64>,
    pub caption_language: String,
}

/// Trait for platforms podcasts are discovered on.
#[async_trait]
pub trait Discovery: Send + Sync {
    /// Search for videos matching `query` within `window`.
    async fn search(&self, query: &str, window: SearchWindow) -> Result<Vec<SearchHit>>;

    /// Fetch details for a single video.
    async fn lookup(&self, video_id: &str) -> Result<VideoDetails>;
}

/// Search, then look up every hit.
///
/// Hits whose lookup fails, or that have no usable captions, are skipped.
/// Only a failing search is an error.
#[instrument(skip(discovery), fields(window = %window))]
pub async fn discover_candidates(
    discovery: &dyn Discovery,
    query: &str,
    window: SearchWindow,
) -> Result<Vec<Candidate>> {
    let hits = discovery.search(query, window).await?;
    debug!("Search returned {} hits", hits.len());

    let mut candidates = Vec::with_capacity(hits.len());
    for hit in hits {
        let details = match discovery.lookup(&hit.id).await {
            Ok(details) => details,
            Err(e) => {
                warn!("Skipping {}: {}", hit.id, e);
                continue;
            }
        };

        let Some(caption_language) = details.caption_language else {
            debug!("Skipping {}: no original-language captions", hit.id);
            continue;
        };

        candidates.push(Candidate {
            id: hit.id,
            title: hit.title,
            description: details.description,
            channel: hit.channel,
            publish_time: details.upload_date,
            view_count: hit.view_count,
            caption_language,
        });
    }

    info!("Discovered {} candidates", candidates.len());
    Ok(candidates)
}
