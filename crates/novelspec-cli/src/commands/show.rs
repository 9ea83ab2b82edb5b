//! Show command implementation.

use std::fmt::Write as _;

use clap::{Parser, ValueEnum};
use novelspec_spec::{parse_spec, ChangeDetails, SpecDocument};
use serde::Serialize;

use super::{is_similar, resolve_change};
use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, Palette};

/// Show a change or a spec
#[derive(Debug, Parser)]
pub struct ShowCommand {
    /// Change id or spec path (e.g. characters/protagonist)
    pub id: String,

    /// What the id names; detected when omitted
    #[arg(long = "type", value_enum)]
    pub item_type: Option<ItemType>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ItemType {
    Change,
    Spec,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum ShowOutput {
    Change(ChangeDetails),
    Spec { name: String, document: SpecDocument },
}

fn write_section(out: &mut String, palette: &Palette, title: &str, body: &str) {
    let _ = writeln!(out, "\n{}", palette.heading(title));
    if body.is_empty() {
        let _ = writeln!(out, "  {}", palette.dim("(empty)"));
    }
    for line in body.lines() {
        let _ = writeln!(out, "  {line}");
    }
}

impl FormattedOutput for ShowOutput {
    fn format_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        match self {
            Self::Change(details) => {
                let _ = writeln!(out, "{} {}", palette.heading("Change:"), details.id);
                write_section(&mut out, palette, "Why", &details.proposal.why);
                write_section(&mut out, palette, "What Changes", &details.proposal.what_changes);
                write_section(&mut out, palette, "Impact", &details.proposal.impact);

                let tasks = &details.tasks;
                let _ = writeln!(
                    out,
                    "\n{} {}/{} ({}%)",
                    palette.heading("Tasks:"),
                    tasks.completed,
                    tasks.total,
                    tasks.percent()
                );
                let _ = writeln!(
                    out,
                    "{} {}",
                    palette.heading("Design:"),
                    if details.has_design { "yes" } else { "no" }
                );
                let _ = writeln!(out, "{}", palette.heading("Delta specs:"));
                if details.delta_specs.is_empty() {
                    let _ = writeln!(out, "  {}", palette.dim("(none)"));
                }
                for capability in &details.delta_specs {
                    let label = if capability.is_empty() { "unknown" } else { capability };
                    let _ = writeln!(out, "  - {label}");
                }
            }
            Self::Spec { name, document } => {
                let _ = writeln!(out, "{} {name}", palette.heading("Spec:"));
                write_section(&mut out, palette, "Purpose", &document.purpose);
                let _ = writeln!(
                    out,
                    "\n{} ({})",
                    palette.heading("Requirements"),
                    document.requirements.len()
                );
                for requirement in &document.requirements {
                    let _ = writeln!(
                        out,
                        "  - {} {} {}",
                        requirement.name,
                        palette.dim(&format!("[{}]", requirement.level)),
                        palette.dim(&format!("{} scenario(s)", requirement.scenarios.len()))
                    );
                }
            }
        }
        out
    }
}

impl ShowCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let item_type = match self.item_type {
            Some(item_type) => item_type,
            None => self.detect(ctx)?,
        };

        let output = match item_type {
            ItemType::Change => {
                let dir = resolve_change(ctx, &self.id)?;
                ShowOutput::Change(ChangeDetails::load(&self.id, &dir)?)
            }
            ItemType::Spec => self.load_spec(ctx)?,
        };

        print_output(ctx, &output)
    }

    fn detect(&self, ctx: &CommandContext) -> Result<ItemType, CliError> {
        if ctx.layout.change_dir(&self.id).is_dir() && self.id != "archive" {
            return Ok(ItemType::Change);
        }
        if ctx.layout.spec_file(&self.id).is_file() {
            return Ok(ItemType::Spec);
        }

        let mut suggestions: Vec<String> = ctx
            .layout
            .active_changes()?
            .into_iter()
            .map(|change| change.id)
            .chain(ctx.layout.base_specs()?.into_iter().map(|spec| spec.name))
            .filter(|candidate| is_similar(candidate, &self.id))
            .collect();
        suggestions.dedup();
        Err(CliError::not_found_with_suggestions(
            "change or spec",
            &self.id,
            suggestions,
        ))
    }

    fn load_spec(&self, ctx: &CommandContext) -> Result<ShowOutput, CliError> {
        if self.id.split('/').any(|segment| segment == "..") {
            return Err(CliError::user(format!("invalid spec path: {}", self.id)));
        }

        let path = ctx.layout.spec_file(&self.id);
        if !path.is_file() {
            let suggestions = ctx
                .layout
                .base_specs()?
                .into_iter()
                .map(|spec| spec.name)
                .filter(|candidate| is_similar(candidate, &self.id))
                .collect();
            return Err(CliError::not_found_with_suggestions(
                "spec",
                &self.id,
                suggestions,
            ));
        }

        let content = novelspec_common_fs::read_document(&path)?;
        Ok(ShowOutput::Spec {
            name: self.id.clone(),
            document: parse_spec(&content, &path),
        })
    }
}
