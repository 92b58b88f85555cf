//! Per-cycle working directory.

use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Scratch directory for one cycle's media artifacts. Single writer.
#[derive(Debug, Clone)]
pub struct WorkDir {
    root: PathBuf,
}

impl WorkDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Create the directory and drop anything a crashed cycle left behind.
    pub fn prepare(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        self.clear()
    }

    /// Delete everything inside the directory, keeping the directory itself.
    pub fn clear(&self) -> Result<()> {
        if !self.root.exists() {
            return Ok(());
        }

        let mut removed = 0;
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.is_dir() {
                std::fs::remove_dir_all(&path)?;
            } else {
                std::fs::remove_file(&path)?;
            }
            removed += 1;
        }

        debug!("Cleared {} entries from {}", removed, self.root.display());
        Ok(())
    }

    pub fn subtitles(&self, index: usize) -> PathBuf {
        self.root.join(format!("{}_subs.srt", index))
    }

    pub fn trimmed(&self, index: usize) -> PathBuf {
        self.root.join(format!("{}_index.mp4", index))
    }

    pub fn final_clip(&self, index: usize) -> PathBuf {
        self.root.join(format!("{}_final.mp4", index))
    }

    /// Remove whatever exists of moment `index`'s artifacts.
    /// Remove clip `index`'s artifacts. Returns how many could not be removed.
    pub fn discard(&self, index: usize) -> usize {
        let mut leftovers = 0;
        for path in [self.subtitles(index), self.trimmed(index), self.final_clip(index)] {
            if !path.exists() {
                continue;
            }
            if let Err(e) = std::fs::remove_file(&path) {
                warn!("Could not remove {}: {}", path.display(), e);
                leftovers += 1;
            }
        }
        leftovers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_artifact_names() {
        let work = WorkDir::new("/tmp/podclip");
        assert_eq!(work.subtitles(0), PathBuf::from("/tmp/podclip/0_subs.srt"));
        assert_eq!(work.trimmed(2), PathBuf::from("/tmp/podclip/2_index.mp4"));
        assert_eq!(work.final_clip(11), PathBuf::from("/tmp/podclip/11_final.mp4"));
    }

    #[test]
    fn test_prepare_removes_stale_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let work = WorkDir::new(dir.path().join("work"));

        work.prepare().unwrap();
        std::fs::write(work.trimmed(0), b"old").unwrap();
        std::fs::create_dir(work.path().join("nested")).unwrap();

        work.prepare().unwrap();
        assert!(work.path().exists());
        assert_eq!(std::fs::read_dir(work.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_discard_counts_unremovable_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let work = WorkDir::new(dir.path());

        // A directory in place of the trimmed file cannot be removed as a file.
        std::fs::create_dir(work.trimmed(2)).unwrap();
        std::fs::write(work.subtitles(2), b"2").unwrap();

        assert_eq!(work.discard(2), 1);
        assert!(!work.subtitles(2).exists());
        assert!(work.trimmed(2).exists());
    }

    #[test]
    fn test_discard_only_touches_one_index() {
        let dir = tempfile::tempdir().unwrap();
        let work = WorkDir::new(dir.path());

        std::fs::write(work.subtitles(0), b"0").unwrap();
        std::fs::write(work.trimmed(0), b"0").unwrap();
        std::fs::write(work.final_clip(1), b"1").unwrap();

        assert_eq!(work.discard(0), 0);

        assert!(!work.subtitles(0).exists());
        assert!(!work.trimmed(0).exists());
        assert!(work.final_clip(1).exists());
    }

    #[test]
    fn test_clear_missing_dir_is_ok() {
        let work = WorkDir::new("/nonexistent/podclip/work");
        assert!(work.clear().is_ok());
    }
}
