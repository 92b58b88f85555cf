//! Podcast selection.
//!
//! The model sees candidate metadata and the excluded ids and names one
//! candidate, or declines. Its answer only carries an id; the full record
//! is always taken from the locally held candidates.

use crate::config::{Prompts, SelectionSettings};
use crate::error::{PodclipError, Result};
use crate::llm::{decode, LanguageModel, StructuredRequest};
use crate::platform::Candidate;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{info, instrument};

/// Schema name of selection requests.
pub const SELECTOR_SCHEMA: &str = "podcast_selection";

/// Outcome of a selection round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Selected(Choice),
    /// Every candidate is excluded or unsuitable.
    Exhausted,
}

/// A chosen candidate and the content language the model identified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choice {
    pub candidate: Candidate,
    pub language: String,
}

/// What the model is shown per candidate. Caption details stay local.
#[derive(Debug, Serialize)]
struct CandidateView<'a> {
    id: &'a str,
    title: &'a str,
    channel: Option<&'a str>,
    description: &'a str,
    publish_time: Option<NaiveDate>,
    view_count: Option<u64>,
}

impl<'a> From<&'a Candidate> for CandidateView<'a> {
    fn from(c: &'a Candidate) -> Self {
        Self {
            id: &c.id,
            title: &c.title,
            channel: c.channel.as_deref(),
            description: &c.description,
            publish_time: c.publish_time,
            view_count: c.view_count,
        }
    }
}

#[derive(Debug, Deserialize)]
struct Verdict {
    #[serde(default)]
    video_id: String,
    #[serde(default)]
    language: String,
    selected: bool,
}

/// Picks the podcast to clip with a language model.
pub struct PodcastSelector {
    model: Arc<dyn LanguageModel>,
    prompts: Prompts,
    languages: Vec<String>,
}

impl PodcastSelector {
    pub fn new(model: Arc<dyn LanguageModel>, prompts: Prompts, settings: &SelectionSettings) -> Self {
        Self {
            model,
            prompts,
            languages: settings.languages.clone(),
        }
    }

    /// Choose one candidate that is not in `excluded`.
    ///
    /// Returns [`Selection::Exhausted`] without asking the model when no
    /// candidate is left after exclusion. An id that is unknown, excluded or
    /// paired with an unsupported language is an integrity error.
    #[instrument(skip_all, fields(candidates = candidates.len(), excluded = excluded.len()))]
    pub async fn select(&self, candidates: &[Candidate], excluded: &HashSet<String>) -> Result<Selection> {
        if candidates.iter().all(|c| excluded.contains(&c.id)) {
            info!("No selectable candidates left");
            return Ok(Selection::Exhausted);
        }

        let request = self.build_request(candidates, excluded)?;
        let response = self.model.complete_json(&request).await?;
        let verdict: Verdict = decode(&request, response)?;

        if !verdict.selected {
            info!("Selector declined every candidate");
            return Ok(Selection::Exhausted);
        }

        let video_id = verdict.video_id.trim();
        let candidate = candidates
            .iter()
            .find(|c| c.id == video_id)
            .ok_or_else(|| {
                PodclipError::SelectorIntegrity(format!("unknown video id '{}'", video_id))
            })?;

        if excluded.contains(&candidate.id) {
            return Err(PodclipError::SelectorIntegrity(format!(
                "video id '{}' is already published",
                candidate.id
            )));
        }

        if !self.languages.iter().any(|l| l == &verdict.language) {
            return Err(PodclipError::SelectorIntegrity(format!(
                "unsupported language '{}' for '{}'",
                verdict.language, candidate.id
            )));
        }

        info!("Selected {} ({}): {}", candidate.id, verdict.language, candidate.title);
        Ok(Selection::Selected(Choice {
            candidate: candidate.clone(),
            language: verdict.language,
        }))
    }

    fn build_request(&self, candidates: &[Candidate], excluded: &HashSet<String>) -> Result<StructuredRequest> {
        let views: Vec<CandidateView<'_>> = candidates.iter().map(CandidateView::from).collect();

        let mut excluded_ids: Vec<&String> = excluded.iter().collect();
        excluded_ids.sort();

        let mut vars = HashMap::new();
        vars.insert("languages".to_string(), self.languages.join(", "));
        vars.insert("excluded".to_string(), serde_json::to_string(&excluded_ids)?);
        vars.insert("podcasts".to_string(), serde_json::to_string_pretty(&views)?);

        Ok(StructuredRequest {
            name: SELECTOR_SCHEMA,
            system: self.prompts.render_with_custom(&self.prompts.selector.system, &vars),
            user: self.prompts.render_with_custom(&self.prompts.selector.user, &vars),
            schema: self.schema(),
        })
    }

    fn schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "video_id": { "type": "string", "description": "Id of the chosen podcast" },
                "language": { "type": "string", "enum": self.languages },
                "selected": { "type": "boolean", "description": "false when no podcast can be chosen" }
            },
            "required": ["video_id", "language", "selected"],
            "additionalProperties": false
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedModel;

    fn candidate(id: &str) -> Candidate {
        Candidate {
            id: id.to_string(),
            title: format!("Podcast {}", id),
            description: "A long chat".to_string(),
            channel: Some("Channel".to_string()),
            publish_time: NaiveDate::from_ymd_opt(2025, 3, 1),
            view_count: Some(5000),
            caption_language: format!("{}-secret-orig", id),
        }
    }

    fn selector(model: ScriptedModel) -> (Arc<ScriptedModel>, PodcastSelector) {
        let model = Arc::new(model);
        let selector = PodcastSelector::new(model.clone(), Prompts::default(), &SelectionSettings::default());
        (model, selector)
    }

    fn excluded(ids: &[&str]) -> HashSet<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_all_excluded_is_exhausted() {
        let (model, selector) = selector(ScriptedModel::new());
        let candidates = vec![candidate("a"), candidate("b")];

        let selection = selector.select(&candidates, &excluded(&["a", "b"])).await.unwrap();

        assert_eq!(selection, Selection::Exhausted);
        assert!(model.requests().is_empty());
    }

    #[tokio::test]
    async fn test_single_remaining_candidate_is_chosen() {
        let (_, selector) = selector(ScriptedModel::new().respond(
            SELECTOR_SCHEMA,
            json!({ "video_id": "c", "language": "en", "selected": true }),
        ));
        let candidates = vec![candidate("a"), candidate("b"), candidate("c")];

        let selection = selector.select(&candidates, &excluded(&["a", "b"])).await.unwrap();

        match selection {
            Selection::Selected(choice) => {
                assert_eq!(choice.candidate, candidate("c"));
                assert_eq!(choice.language, "en");
            }
            Selection::Exhausted => panic!("expected a selection"),
        }
    }

    #[tokio::test]
    async fn test_declined_is_exhausted() {
        let (_, selector) = selector(ScriptedModel::new().respond(
            SELECTOR_SCHEMA,
            json!({ "video_id": "", "language": "en", "selected": false }),
        ));
        let selection = selector.select(&[candidate("a")], &HashSet::new()).await.unwrap();
        assert_eq!(selection, Selection::Exhausted);
    }

    #[tokio::test]
    async fn test_unknown_id_is_integrity_error() {
        let (_, selector) = selector(ScriptedModel::new().respond(
            SELECTOR_SCHEMA,
            json!({ "video_id": "zzz", "language": "en", "selected": true }),
        ));
        let err = selector.select(&[candidate("a")], &HashSet::new()).await.unwrap_err();
        assert!(matches!(err, PodclipError::SelectorIntegrity(_)));
    }

    #[tokio::test]
    async fn test_excluded_id_is_integrity_error() {
        let (_, selector) = selector(ScriptedModel::new().respond(
            SELECTOR_SCHEMA,
            json!({ "video_id": "a", "language": "hi", "selected": true }),
        ));
        let candidates = vec![candidate("a"), candidate("b")];
        let err = selector.select(&candidates, &excluded(&["a"])).await.unwrap_err();
        assert!(matches!(err, PodclipError::SelectorIntegrity(_)));
    }

    #[tokio::test]
    async fn test_unsupported_language_is_integrity_error() {
        let (_, selector) = selector(ScriptedModel::new().respond(
            SELECTOR_SCHEMA,
            json!({ "video_id": "a", "language": "fr", "selected": true }),
        ));
        let err = selector.select(&[candidate("a")], &HashSet::new()).await.unwrap_err();
        assert!(matches!(err, PodclipError::SelectorIntegrity(_)));
    }

    #[tokio::test]
    async fn test_prompt_hides_caption_language() {
        let (model, selector) = selector(ScriptedModel::new().respond(
            SELECTOR_SCHEMA,
            json!({ "video_id": "b", "language": "hi", "selected": true }),
        ));
        let candidates = vec![candidate("a"), candidate("b")];
        selector.select(&candidates, &excluded(&["a"])).await.unwrap();

        let request = &model.requests_named(SELECTOR_SCHEMA)[0];
        assert!(!request.user.contains("secret-orig"));
        assert!(!request.user.contains("caption_language"));
        assert!(request.user.contains("\"id\": \"b\""));
        assert!(request.system.contains("[\"a\"]"));
        assert!(request.system.contains("en, hi"));
        assert_eq!(request.schema["properties"]["language"]["enum"], json!(["en", "hi"]));
    }
}
