//! Init command implementation.

use std::fmt::Write as _;
use std::path::PathBuf;

use clap::Parser;
use novelspec_common_config::{ConfigLoader, NovelSpecConfig};
use novelspec_spec::ProjectLayout;
use serde::Serialize;

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, FormattedOutput, Palette};

/// Initialize a new novel project
#[derive(Debug, Parser)]
pub struct InitCommand {
    /// Novel name; also the directory created unless --here is given
    pub name: String,

    /// Initialize in the project directory instead of a new subdirectory
    #[arg(long)]
    pub here: bool,
}

#[derive(Debug, Serialize)]
struct InitOutput {
    name: String,
    root: PathBuf,
    already_initialized: bool,
    created: Vec<PathBuf>,
}

impl FormattedOutput for InitOutput {
    fn format_text(&self, palette: &Palette) -> String {
        let mut out = String::new();
        if self.already_initialized {
            let _ = writeln!(
                out,
                "{} {} is already a NovelSpec project; missing files were added",
                palette.warning("!"),
                self.root.display()
            );
        } else {
            let _ = writeln!(
                out,
                "{} Created novel project \"{}\" in {}",
                palette.success("✓"),
                self.name,
                self.root.display()
            );
        }
        for path in &self.created {
            let _ = writeln!(out, "  {} {}", palette.dim("+"), path.display());
        }
        let _ = writeln!(out);
        let _ = writeln!(out, "{}", palette.heading("Next steps:"));
        let _ = writeln!(out, "  1. Fill in novelspec/project.md");
        let _ = writeln!(out, "  2. Describe characters, world and outline under novelspec/specs/");
        let _ = writeln!(out, "  3. Propose chapters under novelspec/changes/<change-id>/");
        out
    }
}

impl InitCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CliError::user("project name must not be empty"));
        }

        let root = if self.here {
            ctx.layout.root().to_path_buf()
        } else {
            if name.contains(|c: char| c == '/' || c == '\\') {
                return Err(CliError::user_with_hint(
                    format!("invalid project name: {name}"),
                    "Use --here to initialize an existing directory",
                ));
            }
            ctx.layout.root().join(name)
        };

        let layout = ProjectLayout::new(&root);
        let already_initialized = layout.is_initialized();
        let mut created = layout.initialize(name)?;

        let loader = ConfigLoader::new(&root);
        let config_path = loader.config_path();
        if !config_path.exists() {
            loader.save(&NovelSpecConfig::default())?;
            created.push(config_path);
        }
        tracing::info!(root = %root.display(), files = created.len(), "project initialized");

        print_output(
            ctx,
            &InitOutput {
                name: name.to_string(),
                root,
                already_initialized,
                created,
            },
        )
    }
}
