//! Clip publishing.

mod youtube;

pub use youtube::YoutubePublisher;

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Metadata attached to one uploaded clip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipMetadata {
    pub title: String,
    pub description: String,
    pub keywords: Vec<String>,
}

/// Trait for short-form video platforms.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Upload `clip` and return the platform's id for it.
    ///
    /// Expired or revoked credentials are reported as
    /// [`PodclipError::PublishAuth`](crate::error::PodclipError::PublishAuth).
    async fn publish(&self, clip: &Path, metadata: &ClipMetadata) -> Result<String>;
}
