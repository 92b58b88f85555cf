//! Pipeline orchestrator for podclip.
//!
//! One cycle takes one podcast from discovery to published clips:
//!
//! ```text
//! SEARCH_PODCASTS -> SELECT_BEST_PODCAST -+-> PROCESS_VIDEO -> FETCH_CLIPS -> EDIT_VIDEO -> POST_VIDEO
//!        ^                                |
//!        +------- exhausted, wider -------+
//! ```
//!
//! Any stage error ends the cycle through `REPORT_ERROR`, which logs it and
//! alerts the operator. [`Pipeline::run`] then starts the next cycle from
//! scratch after a backoff.

mod state;
#[cfg(test)]
mod tests;

pub use state::{CycleReport, RenderedClip, RetryMode, SelectedPodcast, Stage, StageName};

use crate::chunking::{self, extract_range};
use crate::config::{Prompts, Settings};
use crate::error::{PodclipError, Result};
use crate::exclusion::ExclusionStore;
use crate::llm::{LanguageModel, OpenAiModel};
use crate::media::{FfmpegTools, MediaTools, TrimSpec, WorkDir};
use crate::moments::{Moment, MomentExtractor};
use crate::notify::{self, Notifier};
use crate::platform::{discover_candidates, Candidate, Discovery, YoutubeDiscovery};
use crate::publish::{Publisher, YoutubePublisher};
use crate::selector::{PodcastSelector, Selection};
use crate::subtitle::{read_srt, rebase};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, instrument, warn, Instrument};
use uuid::Uuid;

/// Totals over a [`Pipeline::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub succeeded: u64,
    pub failed: u64,
}

/// The podcast clipping pipeline.
pub struct Pipeline {
    settings: Settings,
    discovery: Arc<dyn Discovery>,
    media: Arc<dyn MediaTools>,
    publisher: Arc<dyn Publisher>,
    notifier: Arc<dyn Notifier>,
    selector: PodcastSelector,
    extractor: MomentExtractor,
    exclusions: ExclusionStore,
    work: WorkDir,
}

impl Pipeline {
    /// Create a pipeline backed by YouTube, yt-dlp/ffmpeg and the configured model.
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let model: Arc<dyn LanguageModel> = Arc::new(OpenAiModel::from_settings(&settings.llm)?);
        let discovery = Arc::new(YoutubeDiscovery::from_settings(&settings));
        let media = Arc::new(FfmpegTools::from_settings(&settings));
        let publisher = Arc::new(YoutubePublisher::from_settings(&settings.publish)?);
        let notifier = notify::from_settings(&settings.notify);

        Self::with_components(settings, prompts, model, discovery, media, publisher, notifier)
    }

    /// Create a pipeline with custom components.
    pub fn with_components(
        settings: Settings,
        prompts: Prompts,
        model: Arc<dyn LanguageModel>,
        discovery: Arc<dyn Discovery>,
        media: Arc<dyn MediaTools>,
        publisher: Arc<dyn Publisher>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let selector = PodcastSelector::new(model.clone(), prompts.clone(), &settings.selection);
        let extractor = MomentExtractor::from_settings(model, prompts, &settings.moments);
        let exclusions = ExclusionStore::new(settings.exclusion_path());
        let work = WorkDir::new(settings.work_dir());

        if settings.moments.min_seconds > settings.moments.max_seconds {
            return Err(PodclipError::Config(format!(
                "moments.min_seconds ({}) is larger than moments.max_seconds ({})",
                settings.moments.min_seconds, settings.moments.max_seconds
            )));
        }

        Ok(Self {
            settings,
            discovery,
            media,
            publisher,
            notifier,
            selector,
            extractor,
            exclusions,
            work,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run cycles until `max_cycles` have finished, or forever.
    ///
    /// A failed cycle has already been reported; the loop waits
    /// `failure_backoff` and starts a fresh cycle. `Some(0)` runs nothing.
    pub async fn run(&self, max_cycles: Option<u64>) -> RunSummary {
        let mut summary = RunSummary::default();
        if max_cycles == Some(0) {
            return summary;
        }

        loop {
            let span = info_span!("cycle", id = %Uuid::new_v4());
            let failed = match self.run_cycle().instrument(span).await {
                Ok(report) => {
                    summary.succeeded += 1;
                    info!(
                        "Cycle done: {} clips from '{}', {} uploaded",
                        report.clips,
                        report.title,
                        report.uploaded.len()
                    );
                    false
                }
                Err(_) => {
                    summary.failed += 1;
                    true
                }
            };

            let finished = summary.succeeded + summary.failed;
            if max_cycles.is_some_and(|max| finished >= max) {
                return summary;
            }

            if failed {
                let backoff = self.settings.failure_backoff();
                info!("Waiting {:?} before the next cycle", backoff);
                pause(backoff).await;
            }
        }
    }

    /// Run one cycle from discovery to publishing.
    ///
    /// Every cycle starts with [`RetryMode::None`].
    pub async fn run_cycle(&self) -> Result<CycleReport> {
        let mut stage = Stage::SearchPodcasts {
            retry: RetryMode::None,
        };

        loop {
            let name = stage.name();
            debug!("Entering {}", name);

            stage = match stage {
                Stage::Done(report) => return Ok(report),
                current => match self.advance(current).await {
                    Ok(next) => next,
                    Err(e) => {
                        self.report_error(name, &e).await;
                        return Err(e);
                    }
                },
            };
        }
    }

    /// Perform one stage and return its successor.
    pub async fn advance(&self, stage: Stage) -> Result<Stage> {
        match stage {
            Stage::SearchPodcasts { retry } => self.search_podcasts(retry).await,
            Stage::SelectBestPodcast { retry, candidates } => {
                self.select_best_podcast(retry, candidates).await
            }
            Stage::ProcessVideo { podcast } => self.process_video(podcast).await,
            Stage::FetchClips { podcast, video } => self.fetch_clips(podcast, video).await,
            Stage::EditVideo {
                podcast,
                video,
                moments,
            } => self.edit_video(podcast, video, moments).await,
            Stage::PostVideo {
                podcast,
                moments,
                clips,
            } => self.post_video(podcast, moments, clips).await,
            Stage::Done(report) => Ok(Stage::Done(report)),
        }
    }

    /// REPORT_ERROR: log a stage failure and alert the operator.
    pub async fn report_error(&self, stage: StageName, err: &PodclipError) {
        error!("{}: {} failed: {}", StageName::ReportError, stage, err);
        self.notifier
            .notify(&format!("podclip: {} failed: {}", stage, err))
            .await;
    }

    #[instrument(skip(self))]
    async fn search_podcasts(&self, retry: RetryMode) -> Result<Stage> {
        let candidates = discover_candidates(
            self.discovery.as_ref(),
            &self.settings.discovery.query,
            retry.search_window(),
        )
        .await?;

        Ok(Stage::SelectBestPodcast { retry, candidates })
    }

    #[instrument(skip(self, candidates), fields(candidates = candidates.len()))]
    async fn select_best_podcast(&self, retry: RetryMode, candidates: Vec<Candidate>) -> Result<Stage> {
        let excluded = self.exclusions.load()?;

        match self.selector.select(&candidates, &excluded).await? {
            Selection::Selected(choice) => Ok(Stage::ProcessVideo {
                podcast: SelectedPodcast::from(choice),
            }),
            Selection::Exhausted => match retry.escalate() {
                Some(next) => {
                    info!("All candidates exhausted, searching again with {:?}", next);
                    Ok(Stage::SearchPodcasts { retry: next })
                }
                None => Err(PodclipError::RetryExhausted),
            },
        }
    }

    #[instrument(skip(self, podcast), fields(video_id = %podcast.video_id))]
    async fn process_video(&self, podcast: SelectedPodcast) -> Result<Stage> {
        self.work.prepare()?;

        let fetched = self
            .media
            .fetch(&podcast.video_id, &podcast.subtitle_lang, self.work.path())
            .await?;

        let transcript = read_srt(&fetched.transcript)?;
        if transcript.is_empty() {
            return Err(PodclipError::Subtitle(format!(
                "No cues in {}",
                fetched.transcript.display()
            )));
        }
        info!("Transcript has {} cues", transcript.len());

        Ok(Stage::FetchClips {
            podcast: podcast.with_transcript(transcript),
            video: fetched.video,
        })
    }

    #[instrument(skip(self, podcast, video), fields(video_id = %podcast.video_id))]
    async fn fetch_clips(&self, podcast: SelectedPodcast, video: PathBuf) -> Result<Stage> {
        let chunks = chunking::chunk(&podcast.transcript, self.settings.moments.chunk_max_chars);
        info!("Transcript split into {} chunks", chunks.len());

        let batch = self
            .extractor
            .extract_all(&podcast.title, &podcast.description, &chunks)
            .await;

        if batch.all_failed(chunks.len()) {
            return Err(PodclipError::Model(format!(
                "Moment extraction failed for all {} chunks",
                chunks.len()
            )));
        }

        info!("Found {} moments", batch.moments.len());
        let moments = batch.moments;
        Ok(Stage::EditVideo {
            podcast,
            video,
            moments,
        })
    }

    #[instrument(skip_all, fields(moments = moments.len()))]
    async fn edit_video(&self, podcast: SelectedPodcast, video: PathBuf, moments: Vec<Moment>) -> Result<Stage> {
        let mut clips = Vec::with_capacity(moments.len());

        for (index, moment) in moments.iter().enumerate() {
            match self.render_clip(index, moment, &podcast, &video).await {
                Ok(clip) => clips.push(clip),
                Err(e) => {
                    warn!("Moment {} could not be rendered: {}", index, e);
                    self.work.discard(index);
                    self.notifier
                        .notify(&format!("podclip: {} skipped clip {}: {}", StageName::EditVideo, index, e))
                        .await;
                }
            }
        }

        info!("Rendered {} of {} clips", clips.len(), moments.len());
        Ok(Stage::PostVideo {
            podcast,
            moments: moments.len(),
            clips,
        })
    }

    /// Cut, caption and compose one moment. Touches only index `index`'s artifacts.
    async fn render_clip(&self, index: usize, moment: &Moment, podcast: &SelectedPodcast, video: &Path) -> Result<RenderedClip> {
        let cues = extract_range(podcast.transcript.entries(), moment.start, moment.end);
        let subtitles = self.work.subtitles(index);
        chunking::save(&rebase(&cues, moment.start), &subtitles)?;

        let trimmed = self
            .media
            .trim(&TrimSpec {
                input: video.to_path_buf(),
                output: self.work.trimmed(index),
                start: moment.start,
                end: moment.end,
            })
            .await?;

        let clip = RenderedClip::new(index, moment, &self.work);
        self.media.caption_burn(&trimmed, &subtitles, &clip.path).await?;

        debug!("Clip {} rendered with {} cues", index, cues.len());
        Ok(clip)
    }

    #[instrument(skip_all, fields(video_id = %podcast.video_id, clips = clips.len()))]
    async fn post_video(&self, podcast: SelectedPodcast, moments: usize, clips: Vec<RenderedClip>) -> Result<Stage> {
        // Marked before uploading so a crash mid-upload never republishes this podcast.
        self.exclusions.append(&podcast.video_id)?;

        self.notifier
            .notify(&format!("podclip: uploading {} clips from '{}'", clips.len(), podcast.title))
            .await;

        let mut uploaded = Vec::new();
        let mut failed_uploads = 0;

        for (n, clip) in clips.iter().enumerate() {
            if n > 0 {
                pause(self.settings.upload_delay()).await;
            }

            match self.publisher.publish(&clip.path, &clip.metadata).await {
                Ok(id) => uploaded.push(id),
                Err(e) if e.is_credential_failure() => {
                    warn!("Stopping uploads after {} of {} clips", uploaded.len(), clips.len());
                    return Err(e);
                }
                Err(e) => {
                    failed_uploads += 1;
                    warn!("Upload of clip {} failed: {}", clip.index, e);
                    self.notifier
                        .notify(&format!("podclip: upload of '{}' failed: {}", clip.metadata.title, e))
                        .await;
                }
            }
        }

        self.work.clear()?;

        Ok(Stage::Done(CycleReport {
            video_id: podcast.video_id,
            title: podcast.title,
            moments,
            clips: clips.len(),
            uploaded,
            failed_uploads,
        }))
    }
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}
