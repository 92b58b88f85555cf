//! yt-dlp downloads and ffmpeg editing.

use super::{FetchedMedia, MediaTools, TrimSpec};
use crate::config::Settings;
use crate::error::{PodclipError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// File stem of the downloaded podcast inside the work directory.
const PODCAST_STEM: &str = "current_podcast";

/// Portrait composition: the source centred over a blurred, upscaled copy of itself.
const PORTRAIT_FILTER: &str = "split[original][copy];\
[copy]scale=-1:ih*(16/9)*(16/9),crop=w=ih*9/16,gblur=sigma=20[blurred];\
[blurred][original]overlay=(main_w-overlay_w)/2:(main_h-overlay_h)/2";

/// Media backend built on the yt-dlp and ffmpeg command line tools.
pub struct FfmpegTools {
    cookies_file: Option<PathBuf>,
}

impl FfmpegTools {
    pub fn new(cookies_file: Option<PathBuf>) -> Self {
        Self { cookies_file }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.cookies_file())
    }
}

#[async_trait]
impl MediaTools for FfmpegTools {
    #[instrument(skip(self, dir))]
    async fn fetch(&self, video_id: &str, caption_language: &str, dir: &Path) -> Result<FetchedMedia> {
        std::fs::create_dir_all(dir)?;

        let url = format!("https://www.youtube.com/watch?v={}", video_id);
        let template = dir.join(format!("{}.%(ext)s", PODCAST_STEM));
        info!("Downloading {}", url);

        let mut command = Command::new("yt-dlp");
        if let Some(cookies) = &self.cookies_file {
            command.arg("--cookies").arg(cookies);
        }
        command
            .arg("-f").arg("bv*[ext=mp4]+ba[ext=m4a]/b[ext=mp4]/b")
            .arg("--merge-output-format").arg("mp4")
            .arg("--write-auto-subs")
            .arg("--sub-langs").arg(caption_language)
            .arg("--convert-subs").arg("srt")
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("--no-warnings")
            .arg("-o").arg(&template)
            .arg(&url);

        run(command, "yt-dlp", PodclipError::MediaFetch).await?;

        let media = locate_download(dir)?;
        debug!("Fetched {:?}", media);
        Ok(media)
    }

    #[instrument(skip(self), fields(start = %spec.start, end = %spec.end))]
    async fn trim(&self, spec: &TrimSpec) -> Result<PathBuf> {
        let length = spec.end.since(spec.start).ok_or_else(|| {
            PodclipError::InvalidInput(format!("Trim ends before it starts: {} > {}", spec.start, spec.end))
        })?;

        let mut command = Command::new("ffmpeg");
        command
            .arg("-y")
            .arg("-ss").arg(spec.start.to_ffmpeg())
            .arg("-i").arg(&spec.input)
            .arg("-t").arg(format!("{:.3}", length.as_secs_f64()))
            .arg("-c").arg("copy")
            .arg("-loglevel").arg("error")
            .arg(&spec.output);

        run(command, "ffmpeg", PodclipError::MediaTransform).await?;
        Ok(spec.output.clone())
    }

    #[instrument(skip(self))]
    async fn caption_burn(&self, video: &Path, subtitles: &Path, output: &Path) -> Result<PathBuf> {
        let mut command = Command::new("ffmpeg");
        command
            .arg("-y")
            .arg("-i").arg(video)
            .arg("-vf").arg(portrait_filter(subtitles))
            .arg("-c:a").arg("copy")
            .arg("-loglevel").arg("error")
            .arg(output);

        run(command, "ffmpeg", PodclipError::MediaTransform).await?;
        Ok(output.to_path_buf())
    }
}

/// Run a tool to completion, mapping a missing binary and a failing exit.
async fn run(mut command: Command, tool: &str, failed: fn(String) -> PodclipError) -> Result<()> {
    let output = command
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PodclipError::ToolNotFound(tool.to_string())
            } else {
                failed(format!("{} execution failed: {}", tool, e))
            }
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(failed(format!("{} failed: {}", tool, stderr.trim())));
    }

    Ok(())
}

/// Find the video and SRT yt-dlp wrote for the current podcast.
fn locate_download(dir: &Path) -> Result<FetchedMedia> {
    let mut video = None;
    let mut transcript = None;

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with(PODCAST_STEM) {
            continue;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some("srt") => transcript = Some(path),
            Some("part") | Some("ytdl") | Some("vtt") => {}
            Some(_) => video = Some(path),
            None => {}
        }
    }

    let video = video.ok_or_else(|| PodclipError::MediaFetch("Video file not found after download".to_string()))?;
    let transcript = transcript.ok_or_else(|| {
        PodclipError::MediaFetch("No captions were downloaded for the selected language".to_string())
    })?;

    Ok(FetchedMedia { video, transcript })
}

/// The full `-vf` graph: burn subtitles, then compose the portrait frame.
fn portrait_filter(subtitles: &Path) -> String {
    format!("subtitles={},{}", escape_filter_path(subtitles), PORTRAIT_FILTER)
}

/// Escape a path for use as a filter option inside a filtergraph.
///
/// ffmpeg unescapes twice: once for the option value and once for the graph.
fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();

    let mut option = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | ':' | '\'') {
            option.push('\\');
        }
        option.push(c);
    }

    let mut graph = String::with_capacity(option.len());
    for c in option.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            graph.push('\\');
        }
        graph.push(c);
    }
    graph
}
