use crate::error::{HarvestError, UserFriendlyError};
use crate::pipeline::{RunReport, SourcePlan};
use crate::ui::progress::format_duration;
use console::{style, Emoji, Term};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    Human,
    Json,
    Plain,
}

// Emojis with text fallbacks
static CHECKMARK: Emoji = Emoji("✅ ", "✓ ");
static CROSS: Emoji = Emoji("❌ ", "✗ ");
static INFO: Emoji = Emoji("ℹ️  ", "i ");
static WARNING: Emoji = Emoji("⚠️  ", "! ");
static SPARKLES: Emoji = Emoji("✨ ", "* ");

pub struct OutputFormatter {
    mode: OutputMode,
    use_colors: bool,
    verbose_level: u8,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(mode: OutputMode, verbose: u8, quiet: bool) -> Self {
        let use_colors = match mode {
            OutputMode::Human => Term::stdout().features().colors_supported() && !quiet,
            _ => false,
        };

        Self {
            mode,
            use_colors,
            verbose_level: if quiet { 0 } else { verbose },
            quiet,
        }
    }

    // Core messaging methods
    pub fn success(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Success, message),
                OutputMode::Json => self.print_json_message("success", message),
                OutputMode::Plain => println!("SUCCESS: {}", message),
            }
        }
    }

    // Errors are shown even in quiet mode
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Human => self.print_human_message(MessageType::Error, message),
            OutputMode::Json => eprintln!("{}", json_line(&json_message("error", message))),
            OutputMode::Plain => eprintln!("ERROR: {}", message),
        }
    }

    pub fn warning(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Warning, message),
                OutputMode::Json => self.print_json_message("warning", message),
                OutputMode::Plain => println!("WARNING: {}", message),
            }
        }
    }

    pub fn info(&self, message: &str) {
        if self.should_show_message(0) {
            match self.mode {
                OutputMode::Human => self.print_human_message(MessageType::Info, message),
                OutputMode::Json => self.print_json_message("info", message),
                OutputMode::Plain => println!("INFO: {}", message),
            }
        }
    }

    pub fn debug(&self, message: &str) {
        if self.should_show_message(1) {
            match self.mode {
                OutputMode::Human => {
                    if self.use_colors {
                        println!("  {}", style(message).dim());
                    } else {
                        println!("  DEBUG: {}", message);
                    }
                }
                OutputMode::Json => self.print_json_message("debug", message),
                OutputMode::Plain => println!("DEBUG: {}", message),
            }
        }
    }

    // Per-item lines
    pub fn downloaded(&self, relative_path: &Path) {
        self.success(&format!("Downloaded: {}", relative_path.display()));
    }

    pub fn skipped(&self, relative_path: &Path) {
        self.info(&format!("Skipped (already exists): {}", relative_path.display()));
    }

    pub fn download_failed(&self, url: &str, error: &HarvestError) {
        self.error(&format!("Failed to download: {} ({})", url, short_reason(error)));
    }

    pub fn link_rejected(&self, error: &HarvestError) {
        self.warning(&error.to_string());
    }

    pub fn file_failed(&self, error: &HarvestError) {
        self.error(&error.user_message());
    }

    // User-friendly error handling
    pub fn print_user_friendly_error(&self, error: &HarvestError) {
        let user_message = error.user_message();
        self.error(&user_message);

        if let Some(suggestion) = error.suggestion() {
            self.print_suggestion(&suggestion);
        }
    }

    /// The "nothing to do" exit: a warning rather than an error.
    pub fn print_soft_exit(&self, error: &HarvestError) {
        self.warning(&error.user_message());

        if let Some(suggestion) = error.suggestion() {
            if self.should_show_message(1) {
                self.print_suggestion(&suggestion);
            }
        }
    }

    // Summary and reporting
    pub fn print_run_report(&self, report: &RunReport) {
        match self.mode {
            OutputMode::Human => self.print_human_summary(report),
            OutputMode::Json => {
                let json_output =
                    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string());
                println!("{}", json_output);
            }
            OutputMode::Plain => self.print_plain_summary(report),
        }
    }

    pub fn print_plan(&self, directory: &Path, plans: &[SourcePlan]) {
        if self.mode == OutputMode::Json {
            let files: Vec<serde_json::Value> = plans
                .iter()
                .map(|plan| {
                    serde_json::json!({
                        "source": plan.source.path.display().to_string(),
                        "target_folder": plan.target_folder.display().to_string(),
                        "links": plan.links.iter().map(|u| u.as_str()).collect::<Vec<_>>(),
                        "rejected": plan.rejected,
                        "read_error": plan.read_error.as_ref().map(|e| e.to_string()),
                    })
                })
                .collect();
            self.print_json_object(&serde_json::json!({ "type": "plan", "files": files }));
            return;
        }

        self.print_header("Download plan");

        for plan in plans {
            let folder = plan
                .target_folder
                .strip_prefix(directory)
                .unwrap_or(&plan.target_folder);

            match &plan.read_error {
                Some(error) => println!("{}: {}", plan.source.filename, error),
                None if plan.links.is_empty() => {
                    println!("{}: no image links", plan.source.filename)
                }
                None => {
                    println!(
                        "{} -> {}/ ({} links)",
                        plan.source.filename,
                        folder.display(),
                        plan.links.len()
                    );
                    for url in &plan.links {
                        println!("    {}", url);
                    }
                }
            }

            if plan.rejected > 0 {
                println!("    ({} invalid links would be skipped)", plan.rejected);
            }
        }

        self.print_separator();
    }

    pub fn print_header(&self, title: &str) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                println!();
                if self.use_colors {
                    println!("{} {}", SPARKLES, style(title).bold().cyan());
                } else {
                    println!("=== {} ===", title);
                }
                println!();
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "header",
                    "title": title
                }));
            }
            OutputMode::Plain => {
                println!("=== {} ===", title);
            }
        }
    }

    pub fn print_separator(&self) {
        if self.quiet {
            return;
        }

        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!("{}", style("─".repeat(60)).dim());
                } else {
                    println!("{}", "-".repeat(60));
                }
            }
            OutputMode::Plain => {
                println!("{}", "-".repeat(60));
            }
            OutputMode::Json => {} // No separator in JSON mode
        }
    }

    // Private helper methods
    fn should_show_message(&self, min_verbose_level: u8) -> bool {
        !self.quiet && self.verbose_level >= min_verbose_level
    }

    fn print_suggestion(&self, suggestion: &str) {
        match self.mode {
            OutputMode::Human => {
                if self.use_colors {
                    println!(
                        "{}{}",
                        INFO,
                        style(&format!("Suggestion: {}", suggestion)).cyan()
                    );
                } else {
                    println!("Suggestion: {}", suggestion);
                }
            }
            OutputMode::Json => {
                self.print_json_object(&serde_json::json!({
                    "type": "suggestion",
                    "message": suggestion
                }));
            }
            OutputMode::Plain => {
                println!("SUGGESTION: {}", suggestion);
            }
        }
    }

    fn print_human_message(&self, msg_type: MessageType, message: &str) {
        #[allow(clippy::type_complexity)]
        let (emoji, color_fn): (Emoji, Box<dyn Fn(&str) -> console::StyledObject<&str>>) =
            match msg_type {
                MessageType::Success => (CHECKMARK, Box::new(|msg| style(msg).green())),
                MessageType::Error => (CROSS, Box::new(|msg| style(msg).red().bold())),
                MessageType::Warning => (WARNING, Box::new(|msg| style(msg).yellow())),
                MessageType::Info => (INFO, Box::new(|msg| style(msg).cyan())),
            };

        if self.use_colors {
            match msg_type {
                MessageType::Error => eprintln!("{}{}", emoji, color_fn(message)),
                _ => println!("{}{}", emoji, color_fn(message)),
            }
        } else {
            let prefix = match msg_type {
                MessageType::Success => "✓",
                MessageType::Error => "✗",
                MessageType::Warning => "!",
                MessageType::Info => "i",
            };

            match msg_type {
                MessageType::Error => eprintln!("{} {}", prefix, message),
                _ => println!("{} {}", prefix, message),
            }
        }
    }

    fn print_json_message(&self, level: &str, message: &str) {
        self.print_json_object(&json_message(level, message));
    }

    fn print_json_object(&self, obj: &serde_json::Value) {
        println!("{}", json_line(obj));
    }

    fn print_human_summary(&self, report: &RunReport) {
        let summary = &report.summary;

        println!();
        if self.use_colors {
            println!("{}", style(summary.headline()).green().bold());
        } else {
            println!("{}", summary.headline());
        }

        if !self.should_show_message(1) {
            return;
        }

        self.print_separator();
        println!("  Skipped:       {}", summary.images_skipped);
        println!("  Failed:        {}", summary.downloads_failed);
        println!("  Invalid links: {}", summary.links_rejected);
        println!("  Failed files:  {}", summary.files_failed);
        println!("  Written:       {}", format_bytes(summary.bytes_written));
        println!(
            "  Time taken:    {}",
            format_duration(Duration::from_millis(report.duration_ms as u64))
        );
        self.print_separator();
    }

    fn print_plain_summary(&self, report: &RunReport) {
        let summary = &report.summary;

        println!("COMPLETED: {}", summary.headline());
        println!("Skipped: {}", summary.images_skipped);
        println!("Failed: {}", summary.downloads_failed);
        println!("Invalid links: {}", summary.links_rejected);
        println!("Duration: {}ms", report.duration_ms);
    }
}

#[derive(Debug, Clone, Copy)]
enum MessageType {
    Success,
    Error,
    Warning,
    Info,
}

fn json_message(level: &str, message: &str) -> serde_json::Value {
    serde_json::json!({
        "type": "message",
        "level": level,
        "message": message,
        "timestamp": chrono::Utc::now().to_rfc3339()
    })
}

fn json_line(obj: &serde_json::Value) -> String {
    serde_json::to_string(obj).unwrap_or_else(|_| "{}".to_string())
}

fn short_reason(error: &HarvestError) -> String {
    match error {
        HarvestError::HttpStatus { status, .. } => format!("HTTP {}", status),
        HarvestError::Network { message, .. } => message.clone(),
        HarvestError::Timeout { .. } => "timed out".to_string(),
        other => other.to_string(),
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

// Progress-aware output wrapper
pub struct ProgressAwareOutput<'a> {
    formatter: &'a OutputFormatter,
    progress_manager: Option<&'a crate::ui::ProgressManager>,
}

impl<'a> ProgressAwareOutput<'a> {
    pub fn new(
        formatter: &'a OutputFormatter,
        progress_manager: Option<&'a crate::ui::ProgressManager>,
    ) -> Self {
        Self {
            formatter,
            progress_manager,
        }
    }

    pub fn suspend_and_print<F>(&self, f: F)
    where
        F: FnOnce(&OutputFormatter),
    {
        if let Some(pm) = self.progress_manager {
            pm.suspend(|| f(self.formatter));
        } else {
            f(self.formatter);
        }
    }
}
