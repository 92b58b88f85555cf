//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::Settings;
use crate::exclusion::ExclusionStore;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("podclip doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let tool_checks = vec![
        check_tool("yt-dlp", "yt-dlp --version", install_hint_ytdlp()),
        check_tool("ffmpeg", "ffmpeg -version", install_hint_ffmpeg()),
    ];
    for check in &tool_checks {
        check.print();
    }
    checks.extend(tool_checks);

    println!();

    println!("{}", style("Credentials").bold());
    let credential_checks = vec![
        check_api_key(&settings.llm.api_key_env),
        check_publish_credentials(settings),
        check_telegram(settings),
    ];
    for check in &credential_checks {
        check.print();
    }
    checks.extend(credential_checks);

    println!();

    println!("{}", style("Directories").bold());
    let dir_checks = check_directories(settings);
    for check in &dir_checks {
        check.print();
    }
    checks.extend(dir_checks);

    println!();

    println!("{}", style("Configuration").bold());
    let config_checks = vec![check_config_file(), check_duration_bounds(settings)];
    for check in &config_checks {
        check.print();
    }
    checks.extend(config_checks);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before running the pipeline.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! podclip is ready to run.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(name: &str, version_cmd: &str, hint: &str) -> CheckResult {
    let parts: Vec<&str> = version_cmd.split_whitespace().collect();
    let cmd = parts[0];
    let args = &parts[1..];

    match Command::new(cmd).args(args).output() {
        Ok(output) if output.status.success() => {
            // Try to extract version from first line
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            // Truncate long version strings
            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok(name, &version_display)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

/// Check that the model API key variable is set.
fn check_api_key(var: &str) -> CheckResult {
    match std::env::var(var) {
        Ok(key) if key.starts_with("sk-") && key.len() > 20 => {
            let masked = format!("{}...{}", &key[..7], &key[key.len() - 4..]);
            CheckResult::ok(var, &format!("configured ({})", masked))
        }
        Ok(key) if key.trim().is_empty() => {
            CheckResult::error(var, "empty", &format!("Set with: export {}='sk-...'", var))
        }
        Ok(_) => CheckResult::warning(
            var,
            "set but format looks unusual",
            "Expected format: sk-... (fine for OpenAI-compatible endpoints)",
        ),
        Err(_) => CheckResult::error(var, "not set", &format!("Set with: export {}='sk-...'", var)),
    }
}

fn check_publish_credentials(settings: &Settings) -> CheckResult {
    if settings.publish.has_credentials() {
        CheckResult::ok(
            "YouTube upload",
            &format!("configured (privacy: {})", settings.publish.privacy_status),
        )
    } else {
        CheckResult::error(
            "YouTube upload",
            "credentials missing",
            "Set PODCLIP_YT_CLIENT_ID, PODCLIP_YT_CLIENT_SECRET and PODCLIP_YT_REFRESH_TOKEN",
        )
    }
}

fn check_telegram(settings: &Settings) -> CheckResult {
    match settings.notify.telegram() {
        Some((_, chat_id)) => CheckResult::ok("Telegram alerts", &format!("chat {}", chat_id)),
        None => CheckResult::warning(
            "Telegram alerts",
            "not configured, alerts go to the log",
            "Set telegram_bot_token and telegram_chat_id in [notify]",
        ),
    }
}

/// Check data directories and the exclusion store.
fn check_directories(settings: &Settings) -> Vec<CheckResult> {
    let mut results = Vec::new();

    for (name, dir) in [("Data directory", settings.data_dir()), ("Work directory", settings.work_dir())] {
        if dir.exists() {
            results.push(CheckResult::ok(name, &format!("{}", dir.display())));
        } else {
            results.push(CheckResult::warning(
                name,
                &format!("{} (will be created)", dir.display()),
                "Directory will be created on first use",
            ));
        }
    }

    let store = ExclusionStore::new(settings.exclusion_path());
    let path = store.path().display().to_string();
    if !store.path().exists() {
        results.push(CheckResult::warning(
            "Exclusion store",
            &format!("{} (not created yet)", path),
            "Create with: podclip init",
        ));
    } else {
        match store.list() {
            Ok(ids) => {
                let size = std::fs::metadata(store.path())
                    .map(|m| format_size(m.len()))
                    .unwrap_or_else(|_| "unknown size".to_string());
                results.push(CheckResult::ok(
                    "Exclusion store",
                    &format!("{} ({} ids, {})", path, ids.len(), size),
                ));
            }
            Err(e) => results.push(CheckResult::error(
                "Exclusion store",
                &e.to_string(),
                "Fix or remove the file; it must be a JSON array of video ids",
            )),
        }
    }

    results
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: podclip init (or podclip config edit)",
        )
    }
}

fn check_duration_bounds(settings: &Settings) -> CheckResult {
    let (min, max) = (settings.moments.min_seconds, settings.moments.max_seconds);
    if min <= max {
        CheckResult::ok("Clip length", &format!("{}s to {}s", min, max))
    } else {
        CheckResult::error(
            "Clip length",
            &format!("min_seconds {} is larger than max_seconds {}", min, max),
            "Fix [moments] in the config file",
        )
    }
}

/// Format file size in human-readable format.
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

/// Platform-specific install hint for ffmpeg.
fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
