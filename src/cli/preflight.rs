//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and configuration are available
//! before starting operations that would otherwise fail midway.

use crate::config::Settings;
use crate::error::{PodclipError, Result};
use std::process::Command;

/// Requirements for different operations.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// The full pipeline needs tools, a model and upload credentials.
    Run,
    /// Moment extraction on a local transcript only needs the model.
    Moments,
    /// Chunking needs nothing.
    Chunk,
}

/// Run pre-flight checks for the given operation.
///
/// Returns Ok(()) if all checks pass, or an error describing what's missing.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Run => {
            check_api_key(&settings.llm.api_key_env)?;
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")?;
            check_publish_credentials(settings)?;
        }
        Operation::Moments => {
            check_api_key(&settings.llm.api_key_env)?;
        }
        Operation::Chunk => {}
    }
    Ok(())
}

/// Check that the model API key variable is set.
fn check_api_key(var: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        Ok(_) => Err(PodclipError::Config(format!(
            "{} is empty. Set it with: export {}='sk-...'",
            var, var
        ))),
        Err(_) => Err(PodclipError::Config(format!(
            "{} not set. Set it with: export {}='sk-...'",
            var, var
        ))),
    }
}

fn check_publish_credentials(settings: &Settings) -> Result<()> {
    if settings.publish.has_credentials() {
        Ok(())
    } else {
        Err(PodclipError::Config(
            "YouTube upload credentials missing. Set client_id, client_secret and refresh_token \
             in [publish] or PODCLIP_YT_CLIENT_ID, PODCLIP_YT_CLIENT_SECRET, PODCLIP_YT_REFRESH_TOKEN."
                .to_string(),
        ))
    }
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    // ffmpeg uses -version (single dash), yt-dlp uses --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(PodclipError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(PodclipError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(PodclipError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
