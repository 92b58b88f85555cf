//! podclip - podcast viral-clip pipeline
//!
//! An unattended service that turns trending long-form podcasts into short
//! captioned portrait clips and uploads them.
//!
//! # Overview
//!
//! Each cycle:
//! - Searches a video platform for trending podcasts, widening the upload-date window when needed
//! - Asks a language model to pick one podcast that has not been published yet
//! - Downloads the video and its auto-generated subtitles
//! - Asks the model for viral moments of a bounded length, chunk by chunk
//! - Cuts each moment, burns in captions and converts it to portrait format
//! - Marks the podcast as published, then uploads the clips
//!
//! # Architecture
//!
//! - `config` - Configuration and prompt templates
//! - `subtitle` - SRT timestamps, parsing and formatting
//! - `chunking` - Transcript windows and time-range extraction
//! - `llm` - Structured-output language model abstraction
//! - `platform` - Podcast discovery
//! - `selector` - Model-driven podcast choice
//! - `moments` - Model-driven moment extraction
//! - `media` - Download, trimming and caption burn-in
//! - `publish` - Clip uploads
//! - `notify` - Operator alerts
//! - `exclusion` - Already published podcast ids
//! - `pipeline` - The stage machine tying it all together
//!
//! # Example
//!
//! ```rust,no_run
//! use podclip::config::Settings;
//! use podclip::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Settings::load()?;
//!     let pipeline = Pipeline::new(settings)?;
//!
//!     let report = pipeline.run_cycle().await?;
//!     println!("Uploaded {} clips from {}", report.uploaded.len(), report.title);
//!
//!     Ok(())
//! }
//! ```

pub mod chunking;
pub mod cli;
pub mod config;
pub mod error;
pub mod exclusion;
pub mod llm;
pub mod media;
pub mod moments;
pub mod notify;
pub mod openai;
pub mod pipeline;
pub mod platform;
pub mod publish;
pub mod selector;
pub mod subtitle;

pub use error::{PodclipError, Result};
