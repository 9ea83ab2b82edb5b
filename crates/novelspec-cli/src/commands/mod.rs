//! Command implementations.

mod archive;
mod init;
mod list;
mod show;
mod validate;

pub use archive::ArchiveCommand;
pub use init::InitCommand;
pub use list::ListCommand;
pub use show::ShowCommand;
pub use validate::ValidateCommand;

use std::path::PathBuf;

use crate::cli::CommandContext;
use crate::error::CliError;

/// Resolve an active change directory, suggesting close ids when it is missing.
fn resolve_change(ctx: &CommandContext, id: &str) -> Result<PathBuf, CliError> {
    ctx.require_changes_dir()?;
    novelspec_spec::validate_change_id(id)?;

    let dir = ctx.layout.change_dir(id);
    if dir.is_dir() {
        return Ok(dir);
    }

    let suggestions = ctx
        .layout
        .active_changes()?
        .into_iter()
        .map(|change| change.id)
        .filter(|candidate| is_similar(candidate, id))
        .collect();
    Err(CliError::not_found_with_suggestions("change", id, suggestions))
}

/// Loose match used for "did you mean" lists.
fn is_similar(candidate: &str, wanted: &str) -> bool {
    let candidate = candidate.to_lowercase();
    let wanted = wanted.to_lowercase();
    candidate.contains(&wanted) || wanted.contains(&candidate)
}
