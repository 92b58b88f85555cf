//! Durable set of already published podcast ids.
//!
//! Stored as a JSON array in a single file. Every append rewrites the whole
//! file and syncs it before returning. There is exactly one writer.

use crate::error::{PodclipError, Result};
use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub struct ExclusionStore {
    path: PathBuf,
}

impl ExclusionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ids in the order they were published. A missing or blank file is empty.
    pub fn list(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&content).map_err(|e| {
            PodclipError::Exclusion(format!("{} is not a JSON list of ids: {}", self.path.display(), e))
        })
    }

    pub fn load(&self) -> Result<HashSet<String>> {
        let ids: HashSet<String> = self.list()?.into_iter().collect();
        debug!("Loaded {} excluded ids", ids.len());
        Ok(ids)
    }

    pub fn contains(&self, id: &str) -> Result<bool> {
        Ok(self.list()?.iter().any(|existing| existing == id))
    }

    /// Add `id` and flush to disk. Returns `false` if it was already present.
    pub fn append(&self, id: &str) -> Result<bool> {
        let mut ids = self.list()?;
        if ids.iter().any(|existing| existing == id) {
            return Ok(false);
        }
        ids.push(id.to_string());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)?;
        file.write_all(&serde_json::to_vec_pretty(&ids)?)?;
        file.sync_all()?;

        info!("Marked {} as published", id);
        Ok(true)
    }

    /// Create an empty store if none exists yet.
    pub fn initialize(&self) -> Result<()> {
        if self.path.exists() {
            return Ok(());
        }
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, "[]")?;
        Ok(())
    }
}
