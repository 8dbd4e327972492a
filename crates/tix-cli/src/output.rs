//! Shared output layer: human text or stable JSON for every command.
//!
//! Precedence (highest wins):
//! 1. hidden `--json` flag
//! 2. `TIX_FORMAT` env var → `"human"` | `"json"`
//! 3. Default: human.

use serde::Serialize;
use std::io::{self, Write};
use tix_core::error::ErrorCode;
use tix_core::model::{SentimentTone, Ticket};
use tix_core::notify::{Notification, NotificationKind};

/// The two output modes supported by the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-readable text.
    Human,
    /// Machine-readable JSON.
    Json,
}

impl OutputMode {
    pub fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Core resolution logic, separated from I/O for testability.
fn resolve_output_mode_inner(json_flag: bool, format_env: Option<&str>) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }
    match format_env.map(str::to_lowercase).as_deref() {
        Some("json") => OutputMode::Json,
        // Unknown values fall through to the default.
        _ => OutputMode::Human,
    }
}

/// Resolve the output mode from the `--json` flag and `TIX_FORMAT`.
pub fn resolve_output_mode(json_flag: bool) -> OutputMode {
    let env_val = std::env::var("TIX_FORMAT").ok();
    resolve_output_mode_inner(json_flag, env_val.as_deref())
}

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2001").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

impl CliError {
    /// Build from a coded error, pulling hint and code from the taxonomy.
    pub fn from_code(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            suggestion: code.hint().map(str::to_string),
            error_code: Some(code.code().to_string()),
        }
    }
}

/// Render a serializable value to stdout in the requested format.
///
/// In JSON mode, the value is serialized with `serde_json`. In human mode,
/// the provided closure produces the text output.
pub fn render<T: Serialize>(
    mode: OutputMode,
    value: &T,
    human_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputMode::Human => human_fn(value, &mut out)?,
    }
    Ok(())
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({ "error": error });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Human => {
            writeln!(out, "error: {}", error.message)?;
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

/// One human-readable line per ticket:
/// `<short id>  <tone marker>  <category>  <description>`.
pub fn ticket_line(ticket: &Ticket, w: &mut dyn Write) -> io::Result<()> {
    let tone = SentimentTone::from_label(ticket.sentiment.as_deref());
    let category = ticket.category.as_deref().unwrap_or("-");
    let pending = if ticket.processed { "" } else { " (pending)" };
    writeln!(
        w,
        "{}  {}  {:<12}  {}{}",
        ticket.id.short(),
        tone.marker(),
        category,
        ticket.description,
        pending
    )
}

/// Render one queued notification in human form.
pub fn notification_line(notice: &Notification, w: &mut dyn Write) -> io::Result<()> {
    let prefix = match notice.kind {
        NotificationKind::Success => "✓",
        NotificationKind::Error => "✗",
        NotificationKind::Info => "·",
    };
    writeln!(w, "{prefix} {}", notice.message)
}
