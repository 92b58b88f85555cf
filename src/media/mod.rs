//! Media download and transformation.
//!
//! Everything a cycle produces on disk lives in one [`WorkDir`]: the
//! downloaded podcast, its transcript, and three artifacts per moment
//! (subtitle range, trimmed clip, final portrait clip).

mod ffmpeg;
mod workdir;

pub use ffmpeg::FfmpegTools;
pub use workdir::WorkDir;

use crate::error::Result;
use crate::subtitle::Timestamp;
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Local copy of a podcast and its caption track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedMedia {
    pub video: PathBuf,
    pub transcript: PathBuf,
}

/// Cut `[start, end)` out of `input` into `output`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrimSpec {
    pub input: PathBuf,
    pub output: PathBuf,
    pub start: Timestamp,
    pub end: Timestamp,
}

/// Trait for the download and video editing backend.
#[async_trait]
pub trait MediaTools: Send + Sync {
    /// Download a video and its captions in `caption_language` into `dir`.
    async fn fetch(&self, video_id: &str, caption_language: &str, dir: &Path) -> Result<FetchedMedia>;

    /// Trim a clip without re-encoding. Returns the output path.
    async fn trim(&self, spec: &TrimSpec) -> Result<PathBuf>;

    /// Render `video` as a 9:16 clip on a blurred background with
    /// `subtitles` burned in. Returns the output path.
    async fn caption_burn(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<PathBuf>;
}
