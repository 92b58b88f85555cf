//! Transcript chunking for model-sized windows.
//!
//! A long transcript is split into consecutive windows whose rendered SRT
//! text stays under a character budget, so each window fits in one model
//! call. Sub-ranges of a transcript can also be pulled out by timestamp and
//! written back to disk as a standalone SRT file.

mod range;

pub use range::{extract_range, save};

use crate::subtitle::{SubtitleEntry, Timestamp, Transcript};
use serde::Serialize;

/// Default character budget per chunk.
pub const DEFAULT_MAX_CHARS: usize = 70_000;

/// A contiguous, read-only window over a transcript.
#[derive(Debug, Clone, Serialize)]
pub struct Chunk<'a> {
    /// Position of this chunk in the transcript.
    pub index: usize,
    /// Start of the first cue.
    pub start: Timestamp,
    /// End of the last cue.
    pub end: Timestamp,
    /// Cues rendered as SRT blocks joined by newlines.
    pub text: String,
    #[serde(skip)]
    pub entries: &'a [SubtitleEntry],
}

impl<'a> Chunk<'a> {
    fn from_entries(index: usize, entries: &'a [SubtitleEntry]) -> Self {
        let text = entries
            .iter()
            .map(SubtitleEntry::render)
            .collect::<Vec<_>>()
            .join("\n");

        Chunk {
            index,
            start: entries.first().map(|e| e.start).unwrap_or_default(),
            end: entries.last().map(|e| e.end).unwrap_or_default(),
            text,
            entries,
        }
    }
}

/// Number of characters a cue contributes to a chunk's budget.
///
/// Counted as the cue's full SRT block including the blank separator line.
pub fn entry_size(entry: &SubtitleEntry) -> usize {
    entry.render().chars().count() + 2
}

/// Split a transcript into windows of at most `max_chars` rendered characters.
///
/// Cues are never split. A cue that alone exceeds the budget becomes a
/// chunk of its own, so the budget is a soft cap.
pub fn chunk(transcript: &Transcript, max_chars: usize) -> Vec<Chunk<'_>> {
    let entries = transcript.entries();
    let mut chunks = Vec::new();
    let mut chunk_start = 0;
    let mut size = 0;

    for (i, entry) in entries.iter().enumerate() {
        let entry_len = entry_size(entry);

        if size + entry_len > max_chars && i > chunk_start {
            chunks.push(Chunk::from_entries(chunks.len(), &entries[chunk_start..i]));
            chunk_start = i;
            size = 0;
        }

        size += entry_len;
    }

    if chunk_start < entries.len() {
        chunks.push(Chunk::from_entries(chunks.len(), &entries[chunk_start..]));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript_of(texts: &[&str]) -> Transcript {
        Transcript::new(
            texts
                .iter()
                .enumerate()
                .map(|(i, text)| {
                    SubtitleEntry::new(
                        i as u32 + 1,
                        Timestamp::from_secs(i as u64 * 5),
                        Timestamp::from_secs(i as u64 * 5 + 4),
                        *text,
                    )
                })
                .collect(),
        )
    }

    fn chunk_size(chunk: &Chunk<'_>) -> usize {
        chunk.entries.iter().map(entry_size).sum()
    }

    #[test]
    fn test_empty_transcript() {
        assert!(chunk(&Transcript::default(), 100).is_empty());
    }

    #[test]
    fn test_everything_fits_in_one_chunk() {
        let transcript = transcript_of(&["a", "b", "c"]);
        let chunks = chunk(&transcript, DEFAULT_MAX_CHARS);

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].entries.len(), 3);
        assert_eq!(chunks[0].start, Timestamp::ZERO);
        assert_eq!(chunks[0].end, Timestamp::from_secs(14));
        assert!(chunks[0].text.starts_with("1\n00:00:00,000 --> 00:00:04,000\na\n2\n"));
    }

    #[test]
    fn test_chunks_cover_transcript_in_order() {
        let texts: Vec<String> = (0..40).map(|i| format!("line number {}", i)).collect();
        let refs: Vec<&str> = texts.iter().map(String::as_str).collect();
        let transcript = transcript_of(&refs);

        for max_chars in [1, 50, 120, 333, 1000, 100_000] {
            let chunks = chunk(&transcript, max_chars);

            let rebuilt: Vec<SubtitleEntry> = chunks
                .iter()
                .flat_map(|c| c.entries.iter().cloned())
                .collect();
            assert_eq!(rebuilt.as_slice(), transcript.entries(), "max_chars={}", max_chars);

            for (i, c) in chunks.iter().enumerate() {
                assert_eq!(c.index, i);
                assert!(!c.entries.is_empty());
                assert!(
                    chunk_size(c) <= max_chars || c.entries.len() == 1,
                    "chunk {} over budget at max_chars={}",
                    i,
                    max_chars
                );
            }
        }
    }

    #[test]
    fn test_oversized_entry_gets_its_own_chunk() {
        let long = "x".repeat(500);
        let transcript = transcript_of(&["short", long.as_str(), "tail"]);
        let chunks = chunk(&transcript, 100);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].entries.len(), 1);
        assert!(chunks[1].text.contains(&long));
    }

    #[test]
    fn test_boundary_is_inclusive() {
        let transcript = transcript_of(&["a", "b"]);
        let exact: usize = transcript.entries().iter().map(entry_size).sum();

        assert_eq!(chunk(&transcript, exact).len(), 1);
        assert_eq!(chunk(&transcript, exact - 1).len(), 2);
    }
}
