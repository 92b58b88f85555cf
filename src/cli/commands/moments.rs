//! Moments command implementation.

use crate::chunking::chunk;
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::{Prompts, Settings};
use crate::llm::{LanguageModel, OpenAiModel};
use crate::moments::{ChunkOutcome, MomentExtractor};
use crate::subtitle::read_srt;
use anyhow::Result;
use std::sync::Arc;

/// Find viral moments in a local SRT transcript.
///
/// Nothing is downloaded, edited or uploaded.
pub async fn run_moments(
    srt: &str,
    title: &str,
    description: &str,
    output: Option<String>,
    settings: Settings,
) -> Result<()> {
    preflight::check(Operation::Moments, &settings)?;

    let transcript = read_srt(&Settings::expand_path(srt))?;
    if transcript.is_empty() {
        anyhow::bail!("No subtitle cues found in {}", srt);
    }

    let prompts = Prompts::load(
        settings.prompts.custom_dir.as_deref(),
        Some(&settings.prompts.variables),
    )?;
    let model: Arc<dyn LanguageModel> = Arc::new(OpenAiModel::from_settings(&settings.llm)?);
    let extractor = MomentExtractor::from_settings(model, prompts, &settings.moments);

    let chunks = chunk(&transcript, settings.moments.chunk_max_chars);
    let pb = Output::progress_bar(chunks.len() as u64, "Asking for moments");

    let batch = extractor
        .extract_all_with(title, description, &chunks, |outcome| {
            if let ChunkOutcome::Failed { index, error } = outcome {
                pb.println(format!("Chunk {} failed: {}", index, error));
            }
            pb.inc(1);
        })
        .await;
    pb.finish_and_clear();

    if batch.all_failed(chunks.len()) {
        anyhow::bail!("Moment extraction failed for every chunk");
    }
    let failed = batch.failed_chunks.len();
    let moments = batch.moments;

    match output {
        Some(path) => {
            let json = serde_json::to_string_pretty(&moments)?;
            std::fs::write(&path, json)?;
            Output::success(&format!("Wrote {} moments to {}", moments.len(), path));
        }
        None => {
            Output::header(&format!("{} moments in '{}'", moments.len(), title));
            for m in &moments {
                Output::moment(
                    &m.title,
                    &m.start.to_string(),
                    &m.end.to_string(),
                    m.duration().as_secs(),
                    &m.reason,
                );
            }
        }
    }

    if failed > 0 {
        Output::warning(&format!("{} of {} chunks failed", failed, chunks.len()));
    }

    Ok(())
}
