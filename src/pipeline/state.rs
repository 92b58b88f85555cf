//! Cycle state machine types.
//!
//! A cycle is a chain of [`Stage`] values. Each stage owns exactly the data
//! the next step needs and is consumed to produce its successor, so no
//! record is shared or edited in place between stages.

use crate::media::WorkDir;
use crate::moments::Moment;
use crate::platform::{Candidate, SearchWindow};
use crate::publish::ClipMetadata;
use crate::selector::Choice;
use crate::subtitle::Transcript;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;

/// Discovery window escalation after exhausted selections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RetryMode {
    #[default]
    None,
    Month,
    Week,
}

impl RetryMode {
    /// The next mode after an exhausted selection, or `None` when there is
    /// nothing left to try.
    pub fn escalate(self) -> Option<RetryMode> {
        match self {
            RetryMode::None => Some(RetryMode::Month),
            RetryMode::Month => Some(RetryMode::Week),
            RetryMode::Week => None,
        }
    }

    pub fn search_window(self) -> SearchWindow {
        match self {
            RetryMode::None => SearchWindow::Any,
            RetryMode::Month => SearchWindow::ThisMonth,
            RetryMode::Week => SearchWindow::ThisWeek,
        }
    }
}

/// Podcast chosen for the cycle.
#[derive(Debug, Clone)]
pub struct SelectedPodcast {
    pub video_id: String,
    pub title: String,
    pub description: String,
    pub publish_date: Option<NaiveDate>,
    pub subtitle_lang: String,
    pub language: String,
    /// Empty until the media has been fetched.
    pub transcript: Transcript,
}

impl SelectedPodcast {
    /// A copy of this record carrying `transcript`.
    pub fn with_transcript(&self, transcript: Transcript) -> Self {
        Self {
            transcript,
            ..self.clone()
        }
    }
}

impl From<Choice> for SelectedPodcast {
    fn from(choice: Choice) -> Self {
        let Choice { candidate, language } = choice;
        Self {
            video_id: candidate.id,
            title: candidate.title,
            description: candidate.description,
            publish_date: candidate.publish_time,
            subtitle_lang: candidate.caption_language,
            language,
            transcript: Transcript::default(),
        }
    }
}

/// A finished portrait clip ready for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedClip {
    pub index: usize,
    pub path: PathBuf,
    pub metadata: ClipMetadata,
}

impl RenderedClip {
    pub fn new(index: usize, moment: &Moment, work: &WorkDir) -> Self {
        Self {
            index,
            path: work.final_clip(index),
            metadata: ClipMetadata {
                title: moment.title.clone(),
                description: moment.description.clone(),
                keywords: moment.keywords.clone(),
            },
        }
    }
}

/// What a completed cycle did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CycleReport {
    pub video_id: String,
    pub title: String,
    pub moments: usize,
    pub clips: usize,
    /// Platform ids of uploaded clips.
    pub uploaded: Vec<String>,
    pub failed_uploads: usize,
}

/// Position in a cycle, with the data accumulated so far.
#[derive(Debug)]
pub enum Stage {
    SearchPodcasts {
        retry: RetryMode,
    },
    SelectBestPodcast {
        retry: RetryMode,
        candidates: Vec<Candidate>,
    },
    ProcessVideo {
        podcast: SelectedPodcast,
    },
    FetchClips {
        podcast: SelectedPodcast,
        video: PathBuf,
    },
    EditVideo {
        podcast: SelectedPodcast,
        video: PathBuf,
        moments: Vec<Moment>,
    },
    PostVideo {
        podcast: SelectedPodcast,
        moments: usize,
        clips: Vec<RenderedClip>,
    },
    Done(CycleReport),
}

impl Stage {
    pub fn name(&self) -> StageName {
        match self {
            Stage::SearchPodcasts { .. } => StageName::SearchPodcasts,
            Stage::SelectBestPodcast { .. } => StageName::SelectBestPodcast,
            Stage::ProcessVideo { .. } => StageName::ProcessVideo,
            Stage::FetchClips { .. } => StageName::FetchClips,
            Stage::EditVideo { .. } => StageName::EditVideo,
            Stage::PostVideo { .. } => StageName::PostVideo,
            Stage::Done(_) => StageName::Done,
        }
    }
}

/// Stage labels used in logs and alerts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageName {
    SearchPodcasts,
    SelectBestPodcast,
    ProcessVideo,
    FetchClips,
    EditVideo,
    PostVideo,
    ReportError,
    Done,
}

impl fmt::Display for StageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StageName::SearchPodcasts => "SEARCH_PODCASTS",
            StageName::SelectBestPodcast => "SELECT_BEST_PODCAST",
            StageName::ProcessVideo => "PROCESS_VIDEO",
            StageName::FetchClips => "FETCH_CLIPS",
            StageName::EditVideo => "EDIT_VIDEO",
            StageName::PostVideo => "POST_VIDEO",
            StageName::ReportError => "REPORT_ERROR",
            StageName::Done => "DONE",
        };
        write!(f, "{}", name)
    }
}
