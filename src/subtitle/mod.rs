//! Subtitle handling: timestamps, cues, and the SubRip format.

mod format;
mod models;
mod timestamp;

pub use format::{format_srt, parse_srt, read_srt, rebase};
pub use models::{SubtitleEntry, Transcript};
pub use timestamp::Timestamp;
