//! CLI module for podclip.

pub mod commands;
mod output;
pub mod preflight;

pub use output::Output;

use clap::{Parser, Subcommand};

/// podclip - turn trending podcasts into short-form clips
///
/// Finds a trending podcast, asks a language model for its most viral
/// moments, cuts them into captioned portrait clips and uploads them.
#[derive(Parser, Debug)]
#[command(name = "podclip")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "PODCLIP_CONFIG")]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a default configuration and an empty exclusion list
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Run the clipping pipeline
    Run {
        /// Run a single cycle and exit
        #[arg(long, conflicts_with = "max_cycles")]
        once: bool,

        /// Stop after this many cycles (default: run forever)
        #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
        max_cycles: Option<u64>,
    },

    /// Show how a transcript is split for the model
    Chunk {
        /// SRT transcript file
        srt: String,

        /// Character budget per chunk
        #[arg(long)]
        max_chars: Option<usize>,
    },

    /// Find viral moments in a local transcript without editing or uploading
    Moments {
        /// SRT transcript file
        srt: String,

        /// Podcast title given to the model
        #[arg(short, long)]
        title: String,

        /// Podcast description given to the model
        #[arg(short, long, default_value = "")]
        description: String,

        /// Write moments as JSON to this file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Inspect or extend the list of already published podcasts
    Excluded {
        #[command(subcommand)]
        action: ExcludedAction,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ExcludedAction {
    /// List excluded video ids
    List,

    /// Mark a video id as published
    Add {
        /// Video id to exclude
        video_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}
