//! `proposal.md` sections and change summaries.

use std::path::Path;

use novelspec_common_core::Result;
use serde::{Deserialize, Serialize};

use crate::tasks::{TaskList, TaskProgress};

pub const PROPOSAL_FILE: &str = "proposal.md";
pub const DESIGN_FILE: &str = "design.md";

/// Headings a proposal must contain.
pub const REQUIRED_SECTIONS: [&str; 3] = ["Why", "What Changes", "Impact"];

/// Trimmed body under an exact `## <heading>` line, up to the next `##` line.
///
/// Returns `None` when the heading is absent.
pub fn section_body(content: &str, heading: &str) -> Option<String> {
    let wanted = format!("## {heading}");
    let mut lines = content.lines();
    lines.by_ref().find(|line| line.trim() == wanted)?;

    let body: Vec<&str> = lines
        .take_while(|line| !line.trim_start().starts_with("##"))
        .collect();
    Some(body.join("\n").trim().to_string())
}

/// The three required sections of a proposal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSummary {
    pub why: String,
    pub what_changes: String,
    pub impact: String,
}

impl ProposalSummary {
    pub fn parse(content: &str) -> Self {
        let body = |heading| section_body(content, heading).unwrap_or_default();
        Self {
            why: body("Why"),
            what_changes: body("What Changes"),
            impact: body("Impact"),
        }
    }

    /// First line of the Why section, used as a one-line description.
    pub fn headline(&self) -> &str {
        self.why.lines().next().unwrap_or("").trim()
    }
}

/// Everything `show` reports about an active change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetails {
    pub id: String,
    pub proposal: ProposalSummary,
    pub tasks: TaskProgress,
    pub has_design: bool,
    /// Capabilities with a delta `spec.md`
    pub delta_specs: Vec<String>,
}

impl ChangeDetails {
    /// Collect details from a change directory.
    pub fn load(id: impl Into<String>, change_dir: impl AsRef<Path>) -> Result<Self> {
        let change_dir = change_dir.as_ref();

        let proposal_path = change_dir.join(PROPOSAL_FILE);
        let proposal = if novelspec_common_fs::is_file(&proposal_path) {
            ProposalSummary::parse(&novelspec_common_fs::read_document(&proposal_path)?)
        } else {
            ProposalSummary::default()
        };

        let tasks = TaskList::load(change_dir)?
            .map(|list| list.progress())
            .unwrap_or_default();

        let delta_specs = crate::layout::delta_files(change_dir)?
            .into_iter()
            .map(|file| file.capability)
            .collect();

        Ok(Self {
            id: id.into(),
            proposal,
            tasks,
            has_design: novelspec_common_fs::is_file(change_dir.join(DESIGN_FILE)),
            delta_specs,
        })
    }
}
