//! Archive command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use chrono::Local;
use clap::Parser;
use novelspec_spec::{delta_files, Archiver, SkippedDelta, TaskList};
use serde::Serialize;

use super::resolve_change;
use crate::cli::{CommandContext, OutputFormat};
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, Palette, StatusOutput};
use crate::prompts;

/// Pending tasks listed in the error hint.
const MAX_LISTED_TASKS: usize = 5;

/// Merge a finished change into the specs and archive it
#[derive(Debug, Parser)]
pub struct ArchiveCommand {
    /// Change to archive
    pub change_id: String,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct ArchiveOutput {
    change_id: String,
    archive_path: PathBuf,
    merged: Vec<String>,
    skipped: Vec<SkippedDelta>,
}

impl FormattedOutput for ArchiveOutput {
    fn format_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        for capability in &self.merged {
            let _ = writeln!(out, "  {} specs/{capability}/spec.md", palette.success("merged"));
        }
        for skipped in &self.skipped {
            let _ = writeln!(
                out,
                "  {} {} ({})",
                palette.warning("skipped"),
                skipped.path.display(),
                skipped.reason
            );
        }
        let _ = writeln!(
            out,
            "{} Archived {} to {}",
            palette.success("✓"),
            self.change_id,
            self.archive_path.display()
        );
        out
    }
}

impl ArchiveCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let change_dir = resolve_change(ctx, &self.change_id)?;
        self.check_tasks(&change_dir)?;

        if !self.yes {
            if !prompts::is_interactive() {
                return Err(CliError::user_with_hint(
                    "archiving needs confirmation but stdin is not interactive",
                    "Pass --yes (-y) to archive without prompting",
                ));
            }

            let capabilities: Vec<String> = delta_files(&change_dir)?
                .iter()
                .map(|file| file.label().to_string())
                .collect();
            if ctx.format == OutputFormat::Text {
                eprintln!(
                    "Merging {} into specs: {}",
                    self.change_id,
                    if capabilities.is_empty() {
                        "(no delta specs)".to_string()
                    } else {
                        capabilities.join(", ")
                    }
                );
            }

            if !prompts::confirm(&format!("Archive change '{}'?", self.change_id), false)? {
                return print_output(ctx, &StatusOutput::success("Archive cancelled"));
            }
        }

        let archiver = Archiver::new(ctx.layout.clone(), ctx.config.clone());
        let outcome = archiver.archive(&self.change_id, Local::now().date_naive())?;

        print_output(
            ctx,
            &ArchiveOutput {
                change_id: outcome.change_id,
                archive_path: outcome.archive_path,
                merged: outcome.merged,
                skipped: outcome.skipped,
            },
        )
    }

    /// Refuse early, with the unfinished tasks in the hint.
    fn check_tasks(&self, change_dir: &std::path::Path) -> Result<(), CliError> {
        let Some(tasks) = TaskList::load(change_dir)? else {
            return Err(CliError::validation_with_hint(
                format!("change '{}' has no tasks.md", self.change_id),
                "Add a tasks.md checklist and check off every task before archiving",
            ));
        };

        let pending: Vec<&str> = tasks.pending().map(|task| task.text.as_str()).collect();
        if pending.is_empty() {
            return Ok(());
        }

        let mut hint = String::from("Unfinished tasks:");
        for text in pending.iter().take(MAX_LISTED_TASKS) {
            let _ = write!(hint, "\n  - [ ] {text}");
        }
        if pending.len() > MAX_LISTED_TASKS {
            let _ = write!(hint, "\n  ... and {} more", pending.len() - MAX_LISTED_TASKS);
        }

        Err(CliError::validation_with_hint(
            format!(
                "change '{}' has {} unfinished task(s)",
                self.change_id,
                pending.len()
            ),
            hint,
        ))
    }
}
