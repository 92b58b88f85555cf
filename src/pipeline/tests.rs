//! Cycle scenarios against in-memory collaborators.

use super::*;
use crate::exclusion::ExclusionStore;
use crate::llm::ScriptedModel;
use crate::media::FetchedMedia;
use crate::moments::MOMENTS_SCHEMA;
use crate::notify::recording::RecordingNotifier;
use crate::platform::{SearchHit, SearchWindow, VideoDetails};
use crate::publish::ClipMetadata;
use crate::selector::SELECTOR_SCHEMA;
use crate::subtitle::{parse_srt, Timestamp};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::Mutex;
use tempfile::TempDir;

const THREE_CUES: &str = "1
00:00:00,000 --> 00:00:05,000
first

2
00:01:20,000 --> 00:01:25,000
second

3
00:02:50,000 --> 00:02:55,000
third
";

struct FakeDiscovery {
    ids: Vec<String>,
    windows: Mutex<Vec<SearchWindow>>,
}

#[async_trait]
impl Discovery for FakeDiscovery {
    async fn search(&self, _query: &str, window: SearchWindow) -> Result<Vec<SearchHit>> {
        self.windows.lock().unwrap().push(window);
        Ok(self
            .ids
            .iter()
            .map(|id| SearchHit {
                id: id.clone(),
                title: format!("Podcast {}", id),
                channel: Some("Channel".to_string()),
                view_count: Some(10_000),
            })
            .collect())
    }

    async fn lookup(&self, video_id: &str) -> Result<VideoDetails> {
        Ok(VideoDetails {
            description: format!("About {}", video_id),
            upload_date: None,
            caption_language: Some("en-orig".to_string()),
        })
    }
}

#[derive(Default)]
struct FakeMedia {
    srt: String,
    fail_trim_for: Option<usize>,
    fetches: Mutex<Vec<String>>,
    trims: Mutex<Vec<TrimSpec>>,
    burned_subtitles: Mutex<Vec<String>>,
}

#[async_trait]
impl MediaTools for FakeMedia {
    async fn fetch(&self, video_id: &str, _caption_language: &str, dir: &Path) -> Result<FetchedMedia> {
        self.fetches.lock().unwrap().push(video_id.to_string());
        let video = dir.join("current_podcast.mp4");
        let transcript = dir.join("current_podcast.en-orig.srt");
        std::fs::write(&video, b"video")?;
        std::fs::write(&transcript, &self.srt)?;
        Ok(FetchedMedia { video, transcript })
    }

    async fn trim(&self, spec: &TrimSpec) -> Result<PathBuf> {
        if let Some(index) = self.fail_trim_for {
            let prefix = format!("{}_", index);
            let name = spec.output.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            if name.starts_with(&prefix) {
                return Err(PodclipError::MediaTransform("ffmpeg exploded".to_string()));
            }
        }
        self.trims.lock().unwrap().push(spec.clone());
        std::fs::write(&spec.output, b"trimmed")?;
        Ok(spec.output.clone())
    }

    async fn caption_burn(&self, _video: &Path, subtitles: &Path, output: &Path) -> Result<PathBuf> {
        let srt = std::fs::read_to_string(subtitles)?;
        self.burned_subtitles.lock().unwrap().push(srt);
        std::fs::write(output, b"final")?;
        Ok(output.to_path_buf())
    }
}

struct FakePublisher {
    store: ExclusionStore,
    results: Mutex<VecDeque<Result<String>>>,
    uploads: Mutex<Vec<(PathBuf, ClipMetadata)>>,
    excluded_at_upload: Mutex<Vec<Vec<String>>>,
}

#[async_trait]
impl Publisher for FakePublisher {
    async fn publish(&self, clip: &Path, metadata: &ClipMetadata) -> Result<String> {
        self.excluded_at_upload.lock().unwrap().push(self.store.list()?);

        let mut uploads = self.uploads.lock().unwrap();
        uploads.push((clip.to_path_buf(), metadata.clone()));
        let n = uploads.len() - 1;
        drop(uploads);

        self.results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(format!("up{}", n)))
    }
}

struct Harness {
    dir: TempDir,
    model: Arc<ScriptedModel>,
    discovery: Arc<FakeDiscovery>,
    media: Arc<FakeMedia>,
    publisher: Arc<FakePublisher>,
    notifier: Arc<RecordingNotifier>,
    settings: Settings,
}

impl Harness {
    fn new(ids: &[&str], media: FakeMedia, model: ScriptedModel) -> Self {
        let dir = tempfile::tempdir().unwrap();

        let mut settings = Settings::default();
        settings.general.work_dir = dir.path().join("work").display().to_string();
        settings.pipeline.exclusion_path = dir.path().join("burnt.json").display().to_string();
        settings.pipeline.failure_backoff_seconds = 0;
        settings.moments.call_delay_seconds = 0;
        settings.publish.upload_delay_seconds = 0;

        let publisher = Arc::new(FakePublisher {
            store: ExclusionStore::new(settings.exclusion_path()),
            results: Mutex::new(VecDeque::new()),
            uploads: Mutex::new(Vec::new()),
            excluded_at_upload: Mutex::new(Vec::new()),
        });

        Self {
            dir,
            model: Arc::new(model),
            discovery: Arc::new(FakeDiscovery {
                ids: ids.iter().map(|s| s.to_string()).collect(),
                windows: Mutex::new(Vec::new()),
            }),
            media: Arc::new(media),
            publisher,
            notifier: Arc::new(RecordingNotifier::default()),
            settings,
        }
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::with_components(
            self.settings.clone(),
            Prompts::default(),
            self.model.clone(),
            self.discovery.clone(),
            self.media.clone(),
            self.publisher.clone(),
            self.notifier.clone(),
        )
        .unwrap()
    }

    fn store(&self) -> ExclusionStore {
        ExclusionStore::new(self.settings.exclusion_path())
    }

    fn windows(&self) -> Vec<SearchWindow> {
        self.discovery.windows.lock().unwrap().clone()
    }

    fn fail_uploads(&self, results: Vec<Result<String>>) {
        self.publisher.results.lock().unwrap().extend(results);
    }

    fn alerts_mentioning(&self, needle: &str) -> usize {
        self.notifier
            .messages()
            .iter()
            .filter(|m| m.contains(needle))
            .count()
    }
}

fn media(srt: &str) -> FakeMedia {
    FakeMedia {
        srt: srt.to_string(),
        ..Default::default()
    }
}

fn pick(id: &str) -> Value {
    json!({ "video_id": id, "language": "en", "selected": true })
}

fn decline() -> Value {
    json!({ "video_id": "", "language": "en", "selected": false })
}

fn moment(start: &str, end: &str, title: &str) -> Value {
    json!({
        "reason": "hook",
        "start_time": start,
        "end_time": end,
        "title": title,
        "description": format!("{} description", title),
        "keywords": ["podcast", "shorts"]
    })
}

fn moments(list: Vec<Value>) -> Value {
    json!({ "moments": list })
}

#[tokio::test]
async fn test_single_moment_end_to_end() {
    let h = Harness::new(
        &["pod1"],
        media(THREE_CUES),
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .respond(
                MOMENTS_SCHEMA,
                moments(vec![moment("00:00:00,000", "00:01:50,000", "Clip one")]),
            ),
    );

    let report = h.pipeline().run_cycle().await.unwrap();

    assert_eq!(report.video_id, "pod1");
    assert_eq!(report.moments, 1);
    assert_eq!(report.clips, 1);
    assert_eq!(report.uploaded, vec!["up0"]);

    // Cues at 0s and 80s fall in the window; the cue at 170s does not.
    let burned = h.media.burned_subtitles.lock().unwrap().clone();
    assert_eq!(burned.len(), 1);
    let subs = parse_srt(&burned[0]);
    let texts: Vec<&str> = subs.entries().iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["first", "second"]);
    assert_eq!(subs.entries()[1].start, Timestamp::from_secs(80));

    let trims = h.media.trims.lock().unwrap().clone();
    assert_eq!(trims[0].start, Timestamp::ZERO);
    assert_eq!(trims[0].end, Timestamp::from_secs(110));

    let uploads = h.publisher.uploads.lock().unwrap().clone();
    assert!(uploads[0].0.ends_with("0_final.mp4"));
    assert_eq!(uploads[0].1.title, "Clip one");
    assert_eq!(uploads[0].1.keywords, vec!["podcast", "shorts"]);

    assert!(h.store().contains("pod1").unwrap());
    let work = h.dir.path().join("work");
    assert_eq!(std::fs::read_dir(work).unwrap().count(), 0);
    assert_eq!(h.alerts_mentioning("uploading 1 clips"), 1);
}

#[tokio::test]
async fn test_start_only_window_drops_earlier_cue() {
    let h = Harness::new(
        &["pod1"],
        media(THREE_CUES),
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .respond(
                MOMENTS_SCHEMA,
                moments(vec![moment("00:00:10,000", "00:02:00,000", "Clip one")]),
            ),
    );

    let report = h.pipeline().run_cycle().await.unwrap();
    assert_eq!(report.clips, 1);

    // The cue at 0s is still running at 10s but starts before the window.
    let burned = h.media.burned_subtitles.lock().unwrap().clone();
    let subs = parse_srt(&burned[0]);
    assert_eq!(subs.len(), 1);
    assert_eq!(subs.entries()[0].text, "second");
    assert_eq!(subs.entries()[0].start, Timestamp::from_secs(70));
}

#[tokio::test]
async fn test_out_of_range_moments_never_reach_editing() {
    let h = Harness::new(
        &["pod1"],
        media(THREE_CUES),
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .respond(
                MOMENTS_SCHEMA,
                moments(vec![
                    moment("00:00:00,000", "00:00:45,000", "Forty five"),
                    moment("00:00:00,000", "00:01:30,000", "Ninety"),
                ]),
            ),
    );

    let report = h.pipeline().run_cycle().await.unwrap();

    assert_eq!(report.moments, 1);
    assert_eq!(report.clips, 1);
    let uploads = h.publisher.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].1.title, "Ninety");
}

#[tokio::test]
async fn test_retry_escalates_then_gives_up() {
    let h = Harness::new(&["pod1", "pod2"], media(THREE_CUES), ScriptedModel::new());
    h.store().append("pod1").unwrap();
    h.store().append("pod2").unwrap();

    let err = h.pipeline().run_cycle().await.unwrap_err();

    assert!(matches!(err, PodclipError::RetryExhausted));
    assert_eq!(
        h.windows(),
        vec![SearchWindow::Any, SearchWindow::ThisMonth, SearchWindow::ThisWeek]
    );
    assert!(h.model.requests().is_empty());
    assert!(h.media.fetches.lock().unwrap().is_empty());
    assert_eq!(h.alerts_mentioning("SELECT_BEST_PODCAST failed"), 1);
}

#[tokio::test]
async fn test_retry_resets_for_next_cycle() {
    let h = Harness::new(
        &["pod1", "pod2"],
        media(THREE_CUES),
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, decline())
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .respond(SELECTOR_SCHEMA, pick("pod2"))
            .respond(MOMENTS_SCHEMA, moments(vec![]))
            .respond(MOMENTS_SCHEMA, moments(vec![])),
    );
    let pipeline = h.pipeline();

    let first = pipeline.run_cycle().await.unwrap();
    assert_eq!(first.video_id, "pod1");
    assert_eq!(first.clips, 0);
    assert_eq!(h.windows(), vec![SearchWindow::Any, SearchWindow::ThisMonth]);

    let second = pipeline.run_cycle().await.unwrap();
    assert_eq!(second.video_id, "pod2");
    assert_eq!(
        h.windows(),
        vec![SearchWindow::Any, SearchWindow::ThisMonth, SearchWindow::Any]
    );

    // The second selection was told pod1 is taken.
    let requests = h.model.requests_named(SELECTOR_SCHEMA);
    assert!(requests[2].system.contains("[\"pod1\"]"));
    assert_eq!(h.store().list().unwrap(), vec!["pod1", "pod2"]);
}

#[tokio::test]
async fn test_marked_published_before_upload_fails() {
    let h = Harness::new(
        &["pod1"],
        media(THREE_CUES),
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .respond(
                MOMENTS_SCHEMA,
                moments(vec![
                    moment("00:00:00,000", "00:01:10,000", "One"),
                    moment("00:01:20,000", "00:02:40,000", "Two"),
                ]),
            ),
    );
    h.fail_uploads(vec![Err(PodclipError::PublishAuth("token revoked".to_string()))]);

    let err = h.pipeline().run_cycle().await.unwrap_err();

    assert!(err.is_credential_failure());
    assert!(h.store().contains("pod1").unwrap());
    assert_eq!(*h.publisher.excluded_at_upload.lock().unwrap(), vec![vec!["pod1".to_string()]]);
    // Uploads halt on expired credentials.
    assert_eq!(h.publisher.uploads.lock().unwrap().len(), 1);
    assert_eq!(h.alerts_mentioning("POST_VIDEO failed"), 1);
}

#[tokio::test]
async fn test_other_upload_failures_are_skipped() {
    let h = Harness::new(
        &["pod1"],
        media(THREE_CUES),
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .respond(
                MOMENTS_SCHEMA,
                moments(vec![
                    moment("00:00:00,000", "00:01:10,000", "One"),
                    moment("00:01:20,000", "00:02:40,000", "Two"),
                ]),
            ),
    );
    h.fail_uploads(vec![Err(PodclipError::Publish("503".to_string()))]);

    let report = h.pipeline().run_cycle().await.unwrap();

    assert_eq!(report.failed_uploads, 1);
    assert_eq!(report.uploaded, vec!["up1"]);
    assert_eq!(h.alerts_mentioning("upload of 'One' failed"), 1);
}

#[tokio::test]
async fn test_unknown_selection_aborts_cycle() {
    let h = Harness::new(
        &["pod1"],
        media(THREE_CUES),
        ScriptedModel::new().respond(SELECTOR_SCHEMA, pick("ghost")),
    );

    let err = h.pipeline().run_cycle().await.unwrap_err();

    assert!(matches!(err, PodclipError::SelectorIntegrity(_)));
    assert!(h.media.fetches.lock().unwrap().is_empty());
    assert!(h.store().list().unwrap().is_empty());
    assert_eq!(h.alerts_mentioning("SELECT_BEST_PODCAST failed"), 1);
}

#[tokio::test]
async fn test_failed_edit_spares_other_clips() {
    let h = Harness::new(
        &["pod1"],
        FakeMedia {
            srt: THREE_CUES.to_string(),
            fail_trim_for: Some(0),
            ..Default::default()
        },
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .respond(
                MOMENTS_SCHEMA,
                moments(vec![
                    moment("00:00:00,000", "00:01:10,000", "One"),
                    moment("00:01:20,000", "00:02:40,000", "Two"),
                ]),
            ),
    );

    let report = h.pipeline().run_cycle().await.unwrap();

    assert_eq!(report.moments, 2);
    assert_eq!(report.clips, 1);
    let uploads = h.publisher.uploads.lock().unwrap().clone();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].0.ends_with("1_final.mp4"));
    assert_eq!(uploads[0].1.title, "Two");
    assert_eq!(h.alerts_mentioning("EDIT_VIDEO skipped clip 0"), 1);
}

#[tokio::test]
async fn test_empty_transcript_fails_processing() {
    let h = Harness::new(
        &["pod1"],
        media(""),
        ScriptedModel::new().respond(SELECTOR_SCHEMA, pick("pod1")),
    );

    let err = h.pipeline().run_cycle().await.unwrap_err();

    assert!(matches!(err, PodclipError::Subtitle(_)));
    assert_eq!(h.alerts_mentioning("PROCESS_VIDEO failed"), 1);
    assert!(h.store().list().unwrap().is_empty());
}

#[tokio::test]
async fn test_model_outage_fails_clip_search() {
    let h = Harness::new(
        &["pod1"],
        media(THREE_CUES),
        ScriptedModel::new()
            .respond(SELECTOR_SCHEMA, pick("pod1"))
            .fail(MOMENTS_SCHEMA, "quota exceeded"),
    );

    let err = h.pipeline().run_cycle().await.unwrap_err();

    assert!(matches!(err, PodclipError::Model(_)));
    assert_eq!(h.alerts_mentioning("FETCH_CLIPS failed"), 1);
}

#[tokio::test]
async fn test_run_counts_cycles() {
    let h = Harness::new(&["pod1"], media(THREE_CUES), ScriptedModel::new());
    h.store().append("pod1").unwrap();

    let summary = h.pipeline().run(Some(2)).await;

    assert_eq!(summary, RunSummary { succeeded: 0, failed: 2 });
    assert_eq!(h.windows().len(), 6);
}

#[tokio::test]
async fn test_zero_cycles_runs_nothing() {
    let h = Harness::new(&["pod1"], media(THREE_CUES), ScriptedModel::new());

    let summary = h.pipeline().run(Some(0)).await;

    assert_eq!(summary, RunSummary::default());
    assert!(h.windows().is_empty());
    assert!(h.publisher.uploads.lock().unwrap().is_empty());
}

#[test]
fn test_inverted_bounds_rejected() {
    let h = Harness::new(&[], media(""), ScriptedModel::new());
    let mut settings = h.settings.clone();
    settings.moments.min_seconds = 200;

    let result = Pipeline::with_components(
        settings,
        Prompts::default(),
        h.model.clone(),
        h.discovery.clone(),
        h.media.clone(),
        h.publisher.clone(),
        h.notifier.clone(),
    );
    assert!(matches!(result, Err(PodclipError::Config(_))));
}
