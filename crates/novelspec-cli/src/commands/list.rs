//! List command implementation.

use std::fmt::Write as _;

use clap::Parser;
use novelspec_spec::{ArchivedChange, SpecSummary, TaskList, TaskProgress};
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, Palette};

/// List active changes, archived changes or specs
#[derive(Debug, Parser)]
pub struct ListCommand {
    /// List archived changes
    #[arg(long, conflicts_with = "specs")]
    pub archive: bool,

    /// List base specs
    #[arg(long)]
    pub specs: bool,
}

#[derive(Debug, Serialize)]
struct ActiveChange {
    id: String,
    description: String,
    tasks: TaskProgress,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", content = "items", rename_all = "lowercase")]
enum ListOutput {
    Changes(Vec<ActiveChange>),
    Archive(Vec<ArchivedChange>),
    Specs(Vec<SpecSummary>),
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

impl FormattedOutput for ListOutput {
    fn format_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        match self {
            Self::Changes(changes) if changes.is_empty() => out.push_str("No active changes."),
            Self::Changes(changes) => {
                let _ = writeln!(out, "{}", palette.heading("Active changes:"));
                for change in changes {
                    let progress = if change.tasks.total == 0 {
                        "no tasks".to_string()
                    } else {
                        format!(
                            "{}/{} tasks ({}%)",
                            change.tasks.completed,
                            change.tasks.total,
                            change.tasks.percent()
                        )
                    };
                    let _ = writeln!(
                        out,
                        "  {}  {}  {}",
                        change.id,
                        palette.dim(&progress),
                        or_dash(&change.description)
                    );
                }
            }
            Self::Archive(archived) if archived.is_empty() => out.push_str("No archived changes."),
            Self::Archive(archived) => {
                let _ = writeln!(out, "{}", palette.heading("Archived changes:"));
                for change in archived {
                    let _ = writeln!(
                        out,
                        "  {}  {}",
                        palette.dim(or_dash(&change.date)),
                        change.name
                    );
                }
            }
            Self::Specs(specs) if specs.is_empty() => out.push_str("No specs."),
            Self::Specs(specs) => {
                let _ = writeln!(out, "{}", palette.heading("Specs:"));
                let mut category = "";
                for spec in specs {
                    if spec.category != category {
                        category = &spec.category;
                        let _ = writeln!(out, "  {}", palette.heading(category));
                    }
                    let _ = writeln!(out, "    {}  {}", spec.name, palette.dim(or_dash(&spec.purpose)));
                }
            }
        }
        out
    }
}

impl ListCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let output = if self.specs {
            ListOutput::Specs(ctx.layout.base_specs()?)
        } else {
            ctx.require_changes_dir()?;
            if self.archive {
                ListOutput::Archive(ctx.layout.archived_changes()?)
            } else {
                let mut changes = Vec::new();
                for change in ctx.layout.active_changes()? {
                    let tasks = TaskList::load(&change.path)?
                        .map(|list| list.progress())
                        .unwrap_or_default();
                    changes.push(ActiveChange {
                        id: change.id,
                        description: change.description,
                        tasks,
                    });
                }
                ListOutput::Changes(changes)
            }
        };

        print_output(ctx, &output)
    }
}
