//! Timestamp range extraction and SRT export.

use crate::error::Result;
use crate::subtitle::{format_srt, SubtitleEntry, Timestamp};
use std::path::Path;
use tracing::debug;

/// Cues whose own start lies within `[start, end]`, inclusive at both ends.
///
/// Only the cue start is compared. A cue that begins before `start` but runs
/// into the window is left out, and a cue that begins exactly at `end` is
/// kept even if it runs well past it.
pub fn extract_range(
    entries: &[SubtitleEntry],
    start: Timestamp,
    end: Timestamp,
) -> Vec<SubtitleEntry> {
    entries
        .iter()
        .filter(|e| start <= e.start && e.start <= end)
        .cloned()
        .collect()
}

/// Write cues to `destination` as SRT, renumbered from 1 in their current order.
pub fn save(entries: &[SubtitleEntry], destination: &Path) -> Result<()> {
    if let Some(parent) = destination.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(destination, format_srt(entries))?;
    debug!("Saved {} cues to {}", entries.len(), destination.display());
    Ok(())
}
