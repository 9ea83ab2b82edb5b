//! Validate command implementation.

use std::fmt::Write as _;

use clap::Parser;
use novelspec_spec::{ValidationOptions, ValidationResult, Validator};
use serde::Serialize;

use super::resolve_change;
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, Palette, StatusOutput};

/// Validate change proposals
#[derive(Debug, Parser)]
pub struct ValidateCommand {
    /// Change to validate; all active changes when omitted
    pub change_id: Option<String>,

    /// Also check modal keywords and WHEN/THEN conditions
    #[arg(long)]
    pub strict: bool,

    /// Show a worked example under each error
    #[arg(long)]
    pub explain: bool,
}

#[derive(Debug, Serialize)]
struct ChangeReport {
    change: String,
    #[serde(flatten)]
    result: ValidationResult,
}

#[derive(Debug, Serialize)]
struct ValidateOutput {
    strict: bool,
    #[serde(skip)]
    explain: bool,
    changes: Vec<ChangeReport>,
}

impl ValidateOutput {
    fn invalid_count(&self) -> usize {
        self.changes.iter().filter(|c| !c.result.valid).count()
    }
}

fn location(file: &str, line: Option<usize>) -> String {
    match line {
        Some(line) => format!("{file}:{line}"),
        None => file.to_string(),
    }
}

impl FormattedOutput for ValidateOutput {
    fn format_text(&self, palette: &Palette) -> String {
        let mut out = String::new();

        for report in &self.changes {
            let result = &report.result;
            if result.valid {
                let _ = writeln!(out, "{} {} is valid", palette.success("✓"), report.change);
            } else {
                let _ = writeln!(
                    out,
                    "{} {} has {} error(s)",
                    palette.error("✗"),
                    report.change,
                    result.errors.len()
                );
            }

            for error in &result.errors {
                let _ = writeln!(
                    out,
                    "  {} [{}] {} {}",
                    palette.error("error"),
                    error.kind.as_str(),
                    palette.dim(&location(&error.file, error.line)),
                    error.message
                );
                let _ = writeln!(out, "    {} {}", palette.hint("suggestion:"), error.suggestion);
                if self.explain {
                    if let Some(example) = error.key.example() {
                        let _ = writeln!(out, "    {}", palette.hint("example:"));
                        for line in example.lines() {
                            let _ = writeln!(out, "      {line}");
                        }
                    }
                }
            }

            for warning in &result.warnings {
                let _ = writeln!(
                    out,
                    "  {} {} {}",
                    palette.warning("warning"),
                    palette.dim(&location(&warning.file, warning.line)),
                    warning.message
                );
            }
        }

        let total = self.changes.len();
        let invalid = self.invalid_count();
        let _ = writeln!(
            out,
            "\n{} change(s) checked{}: {} valid, {} invalid",
            total,
            if self.strict { " (strict)" } else { "" },
            total - invalid,
            invalid
        );
        out
    }
}

impl ValidateCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let targets = match &self.change_id {
            Some(id) => vec![(id.clone(), resolve_change(ctx, id)?)],
            None => {
                ctx.require_changes_dir()?;
                ctx.layout
                    .active_changes()?
                    .into_iter()
                    .map(|change| (change.id, change.path))
                    .collect()
            }
        };

        if targets.is_empty() {
            return print_output(ctx, &StatusOutput::success("No active changes to validate"));
        }

        let strict = self.strict || ctx.config.validation.strict;
        let validator =
            Validator::new(ValidationOptions::from(&ctx.config.validation).strict(strict));

        let changes = targets
            .into_iter()
            .map(|(change, dir)| {
                tracing::debug!(change = %change, "validating");
                ChangeReport {
                    result: validator.validate_change(&dir),
                    change,
                }
            })
            .collect();

        let output = ValidateOutput {
            strict,
            explain: self.explain,
            changes,
        };
        print_output(ctx, &output)?;

        match output.invalid_count() {
            0 => Ok(()),
            n => Err(CliError::validation_with_hint(
                format!("{n} change(s) failed validation"),
                if self.explain {
                    "Fix the errors above and validate again"
                } else {
                    "Run with --explain to see an example for each error"
                },
            )),
        }
    }
}
