//! Viral moment extraction.
//!
//! Each transcript chunk goes to the model once, together with the podcast
//! title and description. The model proposes clip windows; every proposal
//! is re-checked here because the model does not reliably respect the
//! duration limits it is given.

use crate::chunking::Chunk;
use crate::config::{MomentSettings, Prompts};
use crate::error::{PodclipError, Result};
use crate::llm::{decode, LanguageModel, StructuredRequest};
use crate::subtitle::Timestamp;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Schema name of moment requests.
pub const MOMENTS_SCHEMA: &str = "viral_moments";

/// A proposed short-form clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Moment {
    /// Why the moment should perform, in one line.
    pub reason: String,
    pub start: Timestamp,
    pub end: Timestamp,
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

impl Moment {
    pub fn duration(&self) -> Duration {
        self.end.since(self.start).unwrap_or_default()
    }
}

/// Accepted clip length, inclusive at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DurationBounds {
    pub min: Duration,
    pub max: Duration,
}

impl DurationBounds {
    pub fn contains(&self, duration: Duration) -> bool {
        self.min <= duration && duration <= self.max
    }
}

impl Default for DurationBounds {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(60),
            max: Duration::from_secs(150),
        }
    }
}

/// Moment exactly as the model wrote it.
#[derive(Debug, Deserialize)]
struct RawMoment {
    #[serde(default)]
    reason: String,
    #[serde(default)]
    start_time: Option<String>,
    #[serde(default)]
    end_time: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct MomentsPayload {
    #[serde(alias = "Moments")]
    moments: Vec<Value>,
}

/// Why a proposal was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    Malformed(String),
    MissingTimestamp,
    BadTimestamp(String),
    EndBeforeStart,
    OutOfRange(Duration),
    MissingTitle,
}

/// Moments gathered over all chunks of one transcript.
#[derive(Debug, Default)]
pub struct MomentBatch {
    /// Accepted moments, in chunk order.
    pub moments: Vec<Moment>,
    /// Indexes of chunks whose model call failed.
    pub failed_chunks: Vec<usize>,
}

impl MomentBatch {
    /// Whether every one of `chunks` chunks failed. False when there were none.
    pub fn all_failed(&self, chunks: usize) -> bool {
        chunks > 0 && self.failed_chunks.len() == chunks
    }
}

/// What happened to one chunk in [`MomentExtractor::extract_all_with`].
#[derive(Debug)]
pub enum ChunkOutcome<'e> {
    Extracted { index: usize, moments: usize },
    Failed { index: usize, error: &'e PodclipError },
}

/// Finds clip-worthy moments with a language model.
pub struct MomentExtractor {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
    bounds: DurationBounds,
    call_delay: Duration,
}

impl MomentExtractor {
    pub fn new(model: Arc<dyn LanguageModel>, prompts: Prompts) -> Self {
        Self {
            model,
            prompts,
            bounds: DurationBounds::default(),
            call_delay: Duration::from_secs(5),
        }
    }

    pub fn from_settings(model: Arc<dyn LanguageModel>, prompts: Prompts, settings: &MomentSettings) -> Self {
        Self::new(model, prompts)
            .with_bounds(DurationBounds {
                min: Duration::from_secs(settings.min_seconds),
                max: Duration::from_secs(settings.max_seconds),
            })
            .with_call_delay(Duration::from_secs(settings.call_delay_seconds))
    }

    pub fn with_bounds(mut self, bounds: DurationBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Pause between consecutive model calls in [`extract_all`](Self::extract_all).
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = delay;
        self
    }

    /// Ask the model for moments in one chunk of transcript text.
    ///
    /// An empty list is a normal answer for weak material.
    #[instrument(skip(self, podcast_description, chunk_text), fields(chars = chunk_text.len()))]
    pub async fn extract(
        &self,
        podcast_title: &str,
        podcast_description: &str,
        chunk_text: &str,
    ) -> Result<Vec<Moment>> {
        let request = self.build_request(podcast_title, podcast_description, chunk_text);
        let response = self.model.complete_json(&request).await?;
        let payload: MomentsPayload = decode(&request, response)?;

        let proposed = payload.moments.len();
        let moments: Vec<Moment> = payload
            .moments
            .into_iter()
            .filter_map(|value| match self.validate(value) {
                Ok(moment) => Some(moment),
                Err(rejection) => {
                    debug!("Dropped proposed moment: {:?}", rejection);
                    None
                }
            })
            .collect();

        debug!("Kept {} of {} proposed moments", moments.len(), proposed);
        Ok(moments)
    }

    /// Extract moments from every chunk in order, pausing between calls.
    ///
    /// A failed call is logged and recorded; the remaining chunks are still
    /// processed. Moments are not deduplicated across chunks.
    pub async fn extract_all(
        &self,
        podcast_title: &str,
        podcast_description: &str,
        chunks: &[Chunk<'_>],
    ) -> MomentBatch {
        self.extract_all_with(podcast_title, podcast_description, chunks, |_| {})
            .await
    }

    /// Like [`extract_all`](Self::extract_all), calling `on_chunk` after each chunk's model call.
    #[instrument(skip_all, fields(chunks = chunks.len()))]
    pub async fn extract_all_with<F>(
        &self,
        podcast_title: &str,
        podcast_description: &str,
        chunks: &[Chunk<'_>],
        mut on_chunk: F,
    ) -> MomentBatch
    where
        F: FnMut(ChunkOutcome<'_>) + Send,
    {
        let mut batch = MomentBatch::default();

        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 && !self.call_delay.is_zero() {
                tokio::time::sleep(self.call_delay).await;
            }

            match self.extract(podcast_title, podcast_description, &chunk.text).await {
                Ok(moments) => {
                    info!("Chunk {}/{}: {} moments", i + 1, chunks.len(), moments.len());
                    on_chunk(ChunkOutcome::Extracted {
                        index: chunk.index,
                        moments: moments.len(),
                    });
                    batch.moments.extend(moments);
                }
                Err(e) => {
                    warn!("Moment extraction failed for chunk {}: {}", chunk.index, e);
                    on_chunk(ChunkOutcome::Failed {
                        index: chunk.index,
                        error: &e,
                    });
                    batch.failed_chunks.push(chunk.index);
                }
            }
        }

        batch
    }

    fn build_request(&self, title: &str, description: &str, transcript: &str) -> StructuredRequest {
        let mut vars = HashMap::new();
        vars.insert("title".to_string(), title.to_string());
        vars.insert("description".to_string(), description.to_string());
        vars.insert("transcript".to_string(), transcript.to_string());
        vars.insert("min_seconds".to_string(), self.bounds.min.as_secs().to_string());
        vars.insert("max_seconds".to_string(), self.bounds.max.as_secs().to_string());

        StructuredRequest {
            name: MOMENTS_SCHEMA,
            system: self.prompts.render_with_custom(&self.prompts.moments.system, &vars),
            user: self.prompts.render_with_custom(&self.prompts.moments.user, &vars),
            schema: moments_schema(),
        }
    }

    /// Turn one proposal into a [`Moment`], or say why it is unusable.
    pub fn validate(&self, value: Value) -> std::result::Result<Moment, Rejection> {
        let raw: RawMoment =
            serde_json::from_value(value).map_err(|e| Rejection::Malformed(e.to_string()))?;

        let (Some(start_raw), Some(end_raw)) = (raw.start_time, raw.end_time) else {
            return Err(Rejection::MissingTimestamp);
        };

        let start: Timestamp = start_raw
            .parse()
            .map_err(|_| Rejection::BadTimestamp(start_raw.clone()))?;
        let end: Timestamp = end_raw
            .parse()
            .map_err(|_| Rejection::BadTimestamp(end_raw.clone()))?;

        let duration = end.since(start).ok_or(Rejection::EndBeforeStart)?;
        if !self.bounds.contains(duration) {
            return Err(Rejection::OutOfRange(duration));
        }

        let title = raw.title.trim().to_string();
        if title.is_empty() {
            return Err(Rejection::MissingTitle);
        }

        Ok(Moment {
            reason: raw.reason.trim().to_string(),
            start,
            end,
            title,
            description: raw.description.trim().to_string(),
            keywords: raw
                .keywords
                .into_iter()
                .map(|k| k.trim().to_string())
                .filter(|k| !k.is_empty())
                .collect(),
        })
    }
}

fn moments_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "moments": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "reason": { "type": "string" },
                        "start_time": { "type": "string", "description": "SRT timestamp, e.g. 00:21:43,039" },
                        "end_time": { "type": "string", "description": "SRT timestamp, e.g. 00:23:10,500" },
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "keywords": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["reason", "start_time", "end_time", "title", "description", "keywords"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["moments"],
        "additionalProperties": false
    })
}
