//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::Settings;
use crate::exclusion::ExclusionStore;
use console::style;
use std::io::{self, Write};

/// Simple check result for init command.
struct CheckIssue {
    name: String,
    hint: String,
}

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("podclip setup");
    println!();
    println!("Let's make sure everything is configured correctly.\n");

    println!("{}", style("Step 1: Checking prerequisites").bold().cyan());
    println!();

    let tool_issues = check_prerequisites();

    if !tool_issues.is_empty() {
        Output::warning("Some tools are missing. Please install them:");
        println!();
        for issue in &tool_issues {
            println!("  {} {} - not found", style("✗").red(), style(&issue.name).bold());
            println!("    {} {}", style("→").dim(), style(&issue.hint).dim());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            println!();
            Output::info("Setup cancelled. Install the missing tools and run 'podclip init' again.");
            return Ok(());
        }
    } else {
        Output::success("All required tools are installed!");
    }

    println!();

    println!("{}", style("Step 2: Checking credentials").bold().cyan());
    println!();

    let key_var = &settings.llm.api_key_env;
    if std::env::var(key_var).is_err() {
        Output::warning(&format!("{} environment variable is not set.", key_var));
        println!();
        println!("  podclip needs a model API key to pick podcasts and find moments.");
        println!("  Set it in your shell configuration (~/.bashrc, ~/.zshrc, etc.):");
        println!("  {}", style(format!("export {}='sk-...'", key_var)).green());
        println!();

        if !prompt_continue("Continue without API key?")? {
            println!();
            Output::info("Setup cancelled. Set your API key and run 'podclip init' again.");
            return Ok(());
        }
    } else {
        Output::success("Model API key is configured!");
    }

    if settings.publish.has_credentials() {
        Output::success("YouTube upload credentials are configured!");
    } else {
        Output::warning("YouTube upload credentials are missing; 'podclip run' will refuse to start.");
        println!(
            "  Set {} in the [publish] section or the environment.",
            style("client_id, client_secret, refresh_token").green()
        );
    }

    println!();

    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    for (name, dir) in [("data", settings.data_dir()), ("work", settings.work_dir())] {
        if !dir.exists() {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!("Created {} directory: {}", name, dir.display()));
        } else {
            Output::info(&format!("The {} directory exists: {}", name, dir.display()));
        }
    }

    let store = ExclusionStore::new(settings.exclusion_path());
    if store.path().exists() {
        Output::info(&format!("Exclusion store exists: {}", store.path().display()));
    } else {
        store.initialize()?;
        Output::success(&format!("Created exclusion store: {}", store.path().display()));
    }

    println!();

    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!();
        println!("  Edit your config with: {}", style("podclip config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();

    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Check system status", style("podclip doctor").cyan());
    println!("  {} Try moment finding on a local transcript", style("podclip moments talk.srt -t \"<title>\"").cyan());
    println!("  {} Run one full cycle", style("podclip run --once").cyan());
    println!();
    println!("For more help: {}", style("podclip --help").cyan());

    Ok(())
}

/// Check prerequisites and return any issues.
fn check_prerequisites() -> Vec<CheckIssue> {
    use std::process::Command;

    let mut issues = Vec::new();

    // Check yt-dlp
    if Command::new("yt-dlp").arg("--version").output().is_err() {
        issues.push(CheckIssue {
            name: "yt-dlp".to_string(),
            hint: install_hint("yt-dlp").to_string(),
        });
    }

    // Check ffmpeg
    if Command::new("ffmpeg").arg("-version").output().is_err() {
        issues.push(CheckIssue {
            name: "ffmpeg".to_string(),
            hint: install_hint("ffmpeg").to_string(),
        });
    }

    issues
}

/// Get platform-specific install hint.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "yt-dlp" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install yt-dlp"
            } else if cfg!(target_os = "linux") {
                "Install with: pip install yt-dlp"
            } else {
                "Install from: https://github.com/yt-dlp/yt-dlp"
            }
        }
        "ffmpeg" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install ffmpeg"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install ffmpeg"
            } else {
                "Install from: https://ffmpeg.org/download.html"
            }
        }
        _ => "Check the documentation for installation instructions",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} ", style("?").cyan(), message);
    print!("{} ", style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(input.trim().to_lowercase() == "y" || input.trim().to_lowercase() == "yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_hint_ytdlp() {
        let hint = install_hint("yt-dlp");
        assert!(hint.contains("yt-dlp"));
    }

    #[test]
    fn test_install_hint_ffmpeg() {
        let hint = install_hint("ffmpeg");
        assert!(hint.contains("ffmpeg"));
    }
}
