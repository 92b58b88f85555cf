//! Excluded command implementation.

use crate::cli::{ExcludedAction, Output};
use crate::config::Settings;
use crate::exclusion::ExclusionStore;
use anyhow::Result;

/// List or extend the exclusion store.
pub fn run_excluded(action: &ExcludedAction, settings: &Settings) -> Result<()> {
    let store = ExclusionStore::new(settings.exclusion_path());

    match action {
        ExcludedAction::List => {
            let ids = store.list()?;
            if ids.is_empty() {
                Output::info("No podcasts have been published yet.");
                return Ok(());
            }

            Output::header(&format!("Published podcasts ({})", ids.len()));
            for id in &ids {
                Output::list_item(id);
            }
        }

        ExcludedAction::Add { video_id } => {
            let video_id = video_id.trim();
            if video_id.is_empty() {
                anyhow::bail!("Video id must not be empty");
            }

            if store.append(video_id)? {
                Output::success(&format!("Excluded {}", video_id));
            } else {
                Output::info(&format!("{} was already excluded", video_id));
            }
        }
    }

    Ok(())
}
