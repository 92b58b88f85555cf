//! Prompt templates for podclip.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub moments: MomentPrompts,
    pub selector: SelectorPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: HashMap<String, String>,
}

/// Prompts for finding viral moments in a transcript chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MomentPrompts {
    pub system: String,
    pub user: String,
}

impl Default for MomentPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a short-form video editor who cuts podcasts into clips for YouTube Shorts, TikTok and Instagram Reels.

You receive a podcast title, its description and part of its transcript in SRT format. Find the moments that would work as standalone viral clips.

Every clip you return MUST last between {{min_seconds}} and {{max_seconds}} seconds. Clips outside that range are useless, so leave them out.

Good clips:
- are emotional, funny, surprising, inspiring, controversial or highly relatable
- have a strong hook, punchline or quotable line
- make sense without the rest of the episode, with a clear setup, peak and ending
- feel culturally relevant or meme-worthy

Usually two or three clips per transcript part is right; return more only when the material is exceptionally strong. If nothing is strong enough, or nothing fits the duration range, return an empty list.

Use start and end timestamps copied from the transcript, in SRT format such as 00:21:43,039."#
                .to_string(),

            user: r#"Podcast title: {{title}}
Podcast description: {{description}}

Transcript:
{{transcript}}

For each clip provide:
- "reason": one line on why the moment will perform
- "start_time": SRT timestamp where the clip starts
- "end_time": SRT timestamp where the clip ends
- "title": a catchy title for the short
- "description": two or three lines of description
- "keywords": tags suited to short-form platforms"#
                .to_string(),
        }
    }
}

/// Prompts for choosing the podcast to clip this cycle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorPrompts {
    pub system: String,
    pub user: String,
}

impl Default for SelectorPrompts {
    fn default() -> Self {
        Self {
            system: r#"You pick podcasts to cut into short-form viral clips.

You receive metadata for a list of trending podcast videos: id, title, channel, description, publish time and view count. Choose the single podcast most likely to yield strong short clips, judging by:
1. how viral the topic is (fame, controversy, emotion, relatability, shock)
2. popularity relative to how recently it was published
3. cultural relevance and uniqueness
4. the chance of compelling guests, stories or bold statements

Hard rules:
- Only choose podcasts whose spoken language is one of: {{languages}}. Infer it from the title, description and channel.
- Never choose a podcast whose id appears in the excluded list.
- If every podcast is excluded or unsuitable, set "selected" to false. Otherwise set it to true and return exactly one id.

Excluded ids: {{excluded}}"#
                .to_string(),

            user: r#"Podcasts:

{{podcasts}}

Return the chosen "video_id", its "language" and "selected"."#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let moments_path = custom_path.join("moments.toml");
            if moments_path.exists() {
                let content = std::fs::read_to_string(&moments_path)?;
                prompts.moments = toml::from_str(&content)?;
            }

            let selector_path = custom_path.join("selector.toml");
            if selector_path.exists() {
                let content = std::fs::read_to_string(&selector_path)?;
                prompts.selector = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(&self, template: &str, vars: &HashMap<String, String>) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.moments.system.contains("{{min_seconds}}"));
        assert!(prompts.selector.system.contains("{{excluded}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_provided_vars_override_custom() {
        let mut prompts = Prompts::default();
        prompts.variables.insert("channel".to_string(), "config".to_string());
        prompts.variables.insert("tone".to_string(), "playful".to_string());

        let mut vars = HashMap::new();
        vars.insert("channel".to_string(), "call".to_string());

        let rendered = prompts.render_with_custom("{{channel}}/{{tone}}", &vars);
        assert_eq!(rendered, "call/playful");
    }

    #[test]
    fn test_custom_dir_overrides_moments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("moments.toml"),
            "system = \"custom system\"\nuser = \"custom user\"\n",
        )
        .unwrap();

        let prompts = Prompts::load(dir.path().to_str(), None).unwrap();
        assert_eq!(prompts.moments.system, "custom system");
        assert!(prompts.selector.system.contains("excluded"));
    }
}
