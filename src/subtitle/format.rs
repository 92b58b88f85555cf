//! SubRip (SRT) reading and writing.

use super::{SubtitleEntry, Timestamp, Transcript};
use crate::error::Result;
use regex::Regex;
use std::path::Path;
use tracing::debug;

fn timing_regex() -> Regex {
    Regex::new(
        r"^\s*(\d{1,3}:\d{2}:\d{2}(?:[,.]\d{1,3})?)\s*-->\s*(\d{1,3}:\d{2}:\d{2}(?:[,.]\d{1,3})?)",
    )
    .expect("Invalid regex")
}

/// Parse SRT text into a transcript.
///
/// Blocks without a readable timing line are skipped. A missing index line
/// is tolerated and the position in the file is used instead.
pub fn parse_srt(input: &str) -> Transcript {
    let timing = timing_regex();
    let normalized = input.trim_start_matches('\u{feff}').replace("\r\n", "\n");

    let mut entries = Vec::new();
    let mut skipped = 0usize;

    for (position, block) in normalized
        .split("\n\n")
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .enumerate()
    {
        let lines: Vec<&str> = block.lines().collect();

        let Some(timing_pos) = lines.iter().position(|l| timing.is_match(l)) else {
            skipped += 1;
            continue;
        };

        let index = lines[..timing_pos]
            .last()
            .and_then(|l| l.trim().parse::<u32>().ok())
            .unwrap_or(position as u32 + 1);

        let Some(caps) = timing.captures(lines[timing_pos]) else {
            skipped += 1;
            continue;
        };
        let (Ok(start), Ok(end)) = (
            caps[1].parse::<Timestamp>(),
            caps[2].parse::<Timestamp>(),
        ) else {
            skipped += 1;
            continue;
        };

        let text = lines[timing_pos + 1..].join("\n");
        entries.push(SubtitleEntry::new(index, start, end, text));
    }

    if skipped > 0 {
        debug!("Skipped {} unreadable subtitle blocks", skipped);
    }

    Transcript::new(entries)
}

/// Read and parse an SRT file.
pub fn read_srt(path: &Path) -> Result<Transcript> {
    let content = std::fs::read_to_string(path)?;
    Ok(parse_srt(&content))
}

/// Format entries as canonical SRT, numbering cues from 1 in the given order.
pub fn format_srt(entries: &[SubtitleEntry]) -> String {
    let mut output = String::new();

    for (i, entry) in entries.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!("{} --> {}\n", entry.start, entry.end));
        output.push_str(&entry.text);
        output.push_str("\n\n");
    }

    output
}

/// Move entries so that `origin` becomes the start of the timeline.
pub fn rebase(entries: &[SubtitleEntry], origin: Timestamp) -> Vec<SubtitleEntry> {
    entries.iter().map(|e| e.rebased(origin)).collect()
}
