//! NovelSpec CLI
//!
//! Main entry point for the `novelspec` binary.

use std::process::ExitCode;

use clap::{ColorChoice, Parser};
use novelspec_cli::cli::{Cli, OutputFormat};
use novelspec_cli::error::ErrorFormatter;
use novelspec_common_log::{LogConfig, LogLevel};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let palette = cli.error_palette();
    let format = cli.format;
    let verbose = cli.verbose > 0;

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(code = e.code(), "command failed");
            let formatter = ErrorFormatter::new(palette).verbose(verbose);
            match format {
                OutputFormat::Text => eprint!("{}", formatter.format(&e)),
                OutputFormat::Json => eprintln!("{}", formatter.format_json(&e)),
            }
            e.exit_code()
        }
    }
}

fn init_logging(cli: &Cli) {
    let mut config = LogConfig::from_env();
    if cli.verbose > 0 || cli.quiet {
        config = config.with_level(LogLevel::from_verbosity(cli.verbose, cli.quiet));
    }
    if cli.color == ColorChoice::Never {
        config.ansi = false;
    }

    if let Err(e) = novelspec_common_log::init(config) {
        eprintln!("warning: logging disabled: {e}");
    }
}
