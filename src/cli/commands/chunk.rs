//! Chunk command implementation.

use crate::chunking::chunk;
use crate::cli::Output;
use crate::config::Settings;
use crate::subtitle::read_srt;
use anyhow::Result;
use std::path::Path;

/// Show how a transcript would be split into model-sized chunks.
pub fn run_chunk(srt: &str, max_chars: Option<usize>, settings: &Settings) -> Result<()> {
    let transcript = read_srt(&Settings::expand_path(srt))?;
    if transcript.is_empty() {
        Output::warning(&format!("No subtitle cues found in {}", Path::new(srt).display()));
        return Ok(());
    }

    let budget = max_chars.unwrap_or(settings.moments.chunk_max_chars);
    let chunks = chunk(&transcript, budget);

    Output::header(&format!("{} chunks", chunks.len()));
    Output::kv("Cues", &transcript.len().to_string());
    Output::kv("Duration", &transcript.duration().to_string());
    Output::kv("Budget", &format!("{} chars", budget));
    println!();

    for c in &chunks {
        Output::chunk_info(
            c.index,
            &c.start.to_string(),
            &c.end.to_string(),
            c.entries.len(),
            c.text.chars().count(),
        );
    }

    Ok(())
}
