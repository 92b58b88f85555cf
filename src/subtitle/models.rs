//! Subtitle data models.

use super::Timestamp;
use serde::{Deserialize, Serialize};

/// One SubRip cue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubtitleEntry {
    /// Index as it appeared in the source file.
    pub index: u32,
    pub start: Timestamp,
    pub end: Timestamp,
    /// Cue text; may span several lines.
    pub text: String,
}

impl SubtitleEntry {
    pub fn new(index: u32, start: Timestamp, end: Timestamp, text: impl Into<String>) -> Self {
        Self {
            index,
            start,
            end,
            text: text.into(),
        }
    }

    /// The cue as it is written in an SRT file, without the trailing blank line.
    pub fn render(&self) -> String {
        format!("{}\n{} --> {}\n{}", self.index, self.start, self.end, self.text)
    }

    /// Copy of this cue with both timestamps moved back by `origin`.
    pub fn rebased(&self, origin: Timestamp) -> Self {
        Self {
            index: self.index,
            start: self.start.saturating_sub(origin),
            end: self.end.saturating_sub(origin),
            text: self.text.clone(),
        }
    }
}

/// An ordered subtitle track for one video.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<SubtitleEntry>,
}

impl Transcript {
    /// Build a transcript, ordering entries by start time.
    ///
    /// The sort is stable, so cues sharing a start time keep their file order.
    pub fn new(mut entries: Vec<SubtitleEntry>) -> Self {
        entries.sort_by_key(|e| e.start);
        Self { entries }
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// End of the last cue.
    pub fn duration(&self) -> Timestamp {
        self.entries.iter().map(|e| e.end).max().unwrap_or_default()
    }
}
