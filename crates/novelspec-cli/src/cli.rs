//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, ColorChoice, Parser, Subcommand, ValueHint};
use novelspec_common_config::{ConfigLoader, NovelSpecConfig};
use novelspec_spec::ProjectLayout;

use crate::commands::{ArchiveCommand, InitCommand, ListCommand, ShowCommand, ValidateCommand};
use crate::error::CliError;
use crate::output::{ColorMode, Palette};

/// NovelSpec - spec-driven novel writing
///
/// Keep characters, world rules and outlines as specs, propose chapters as
/// changes, and merge approved changes back into the specs.
#[derive(Debug, Parser)]
#[command(
    name = "novelspec",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error log output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        long,
        global = true,
        env = "NOVELSPEC_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Project root directory
    #[arg(
        long,
        global = true,
        env = "NOVELSPEC_PROJECT",
        default_value = ".",
        value_hint = ValueHint::DirPath
    )]
    pub project: PathBuf,

    /// When to use terminal colors
    #[arg(long, global = true, default_value = "auto", value_enum)]
    pub color: ColorChoice,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Initialize a new novel project
    Init(InitCommand),

    /// Validate change proposals
    Validate(ValidateCommand),

    /// List active changes, archived changes or specs
    List(ListCommand),

    /// Show a change or a spec
    Show(ShowCommand),

    /// Merge a finished change into the specs and archive it
    Archive(ArchiveCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsCommand),
}

/// Shell completions generation
#[derive(Debug, Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl CompletionsCommand {
    pub fn execute(&self) -> Result<(), CliError> {
        use clap::CommandFactory;

        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        clap_complete::generate(self.shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}

impl Cli {
    /// Load configuration from `--config` or the project's config file.
    pub fn load_config(&self) -> Result<NovelSpecConfig, CliError> {
        let loader = ConfigLoader::new(&self.project);
        let config = match &self.config {
            Some(path) => loader.load_file(path)?,
            None => loader.load()?,
        };
        Ok(config)
    }

    /// Palette for stderr diagnostics.
    pub fn error_palette(&self) -> Palette {
        Palette::new(ColorMode::for_stderr(self.color))
    }

    /// Execute the selected command
    pub fn execute(self) -> Result<(), CliError> {
        if let Command::Completions(cmd) = &self.command {
            return cmd.execute();
        }

        let config = self.load_config()?;
        let ctx = CommandContext {
            layout: ProjectLayout::new(&self.project),
            config,
            format: self.format,
            palette: Palette::new(ColorMode::for_stdout(self.color)),
        };

        match self.command {
            Command::Init(cmd) => cmd.execute(&ctx),
            Command::Validate(cmd) => cmd.execute(&ctx),
            Command::List(cmd) => cmd.execute(&ctx),
            Command::Show(cmd) => cmd.execute(&ctx),
            Command::Archive(cmd) => cmd.execute(&ctx),
            Command::Completions(_) => Ok(()),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub layout: ProjectLayout,
    pub config: NovelSpecConfig,
    pub format: OutputFormat,
    pub palette: Palette,
}

impl CommandContext {
    /// Fail unless `novelspec/changes/` exists.
    pub fn require_changes_dir(&self) -> Result<(), CliError> {
        if self.layout.changes_dir().is_dir() {
            return Ok(());
        }
        Err(CliError::user_with_hint(
            format!(
                "no changes directory at {}",
                self.layout.changes_dir().display()
            ),
            "Run `novelspec init <name>` first, or pass --project",
        ))
    }
}
