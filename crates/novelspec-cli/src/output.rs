//! Output formatting utilities for CLI commands.

use std::io::Write;

use serde::Serialize;

use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;

pub mod color;

pub use color::{ColorMode, Palette};

/// Trait for types that can be formatted for output
pub trait FormattedOutput: Serialize {
    fn format_text(&self, palette: &Palette) -> String;

    fn format_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

/// Render `value` in the selected format.
pub fn render<T: FormattedOutput>(ctx: &CommandContext, value: &T) -> Result<String, CliError> {
    Ok(match ctx.format {
        OutputFormat::Text => value.format_text(&ctx.palette),
        OutputFormat::Json => value.format_json()?,
    })
}

/// Print formatted output to stdout
pub fn print_output<T: FormattedOutput>(ctx: &CommandContext, value: &T) -> Result<(), CliError> {
    let output = render(ctx, value)?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", output.trim_end())?;
    Ok(())
}

/// Helper for success status outputs
#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub status: &'static str,
    pub message: String,
}

impl StatusOutput {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: "success",
            message: message.into(),
        }
    }
}

impl FormattedOutput for StatusOutput {
    fn format_text(&self, palette: &Palette) -> String {
        format!("{} {}", palette.success("✓"), self.message)
    }
}
