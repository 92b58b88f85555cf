//! Configuration module for podclip.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{MomentPrompts, Prompts, SelectorPrompts};
pub use settings::{
    DiscoverySettings, GeneralSettings, LlmSettings, MomentSettings, NotifySettings,
    PipelineSettings, PromptSettings, PublishSettings, SelectionSettings, Settings,
};
