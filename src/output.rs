// ABOUTME: Terminal presentation for progress, warnings, errors and the final summary.
// ABOUTME: Supports normal, quiet (CI), and JSON-lines output modes.

use serde::Serialize;
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly output with progress messages
    Normal,
    /// Minimal output for CI (only final result)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Facts printed after a successful deploy.
#[derive(Debug, Clone, Serialize)]
pub struct DeploySummary {
    pub repository: String,
    pub branch: String,
    pub host: String,
    pub recipe: String,
    pub app_url: String,
    pub proxy_url: String,
    pub log_file: String,
    pub warnings: usize,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
        }
    }

    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.start_time.map(|_| self.elapsed_secs())
    }

    fn emit_json(&self, event: &str, message: &str, to_stderr: bool) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.duration(),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            if to_stderr {
                eprintln!("{json}");
            } else {
                println!("{json}");
            }
        }
    }

    /// Progress message (suppressed in quiet mode).
    pub fn progress(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => println!("==> {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_json("progress", message, false),
        }
    }

    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    println!("{message} ({:.1}s)", elapsed);
                } else {
                    println!("{message}");
                }
            }
            OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => self.emit_json("success", message, false),
        }
    }

    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => eprintln!("Warning: {message}"),
            OutputMode::Quiet => {}
            OutputMode::Json => self.emit_json("warning", message, true),
        }
    }

    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => self.emit_json("error", message, true),
        }
    }

    pub fn summary(&self, summary: &DeploySummary) {
        match self.mode {
            OutputMode::Normal => {
                println!();
                println!("Deployment complete ({:.1}s)", self.elapsed_secs());
                println!("  repository: {}", summary.repository);
                println!("  branch:     {}", summary.branch);
                println!("  host:       {}", summary.host);
                println!("  recipe:     {}", summary.recipe);
                println!("  app:        {}", summary.app_url);
                println!("  proxy:      {}", summary.proxy_url);
                println!("  log:        {}", summary.log_file);
                if summary.warnings > 0 {
                    println!("  warnings:   {} (see log)", summary.warnings);
                }
            }
            OutputMode::Quiet => println!("{}", summary.proxy_url),
            OutputMode::Json => {
                let event = JsonSummary {
                    event: "summary",
                    summary,
                    duration_secs: self.duration(),
                };
                if let Ok(json) = serde_json::to_string(&event) {
                    println!("{json}");
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    event: &'a str,
    #[serde(flatten)]
    summary: &'a DeploySummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}
