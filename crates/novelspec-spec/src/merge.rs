//! Textual merge of delta operations into base documents.
//!
//! The base text is patched rather than re-rendered: only requirement blocks
//! named by the delta change, everything else (prose, extra sections,
//! formatting) is preserved apart from the final whitespace pass.

use std::fmt::Write as _;
use std::ops::Range;
use std::path::Path;

use novelspec_common_config::{MissingRequirementPolicy, NovelSpecConfig};
use novelspec_common_core::{Error, Result, ResultExt};
use regex::Regex;

use crate::model::{DeltaSpec, OperationKind, Requirement};
use crate::parser::REQUIREMENT_PREFIX;

/// Merge settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOptions {
    /// Title suffix of synthesized base documents
    pub spec_label: String,
    /// Handling of MODIFIED requirements with no match in the base
    pub missing_requirement: MissingRequirementPolicy,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self::from(&NovelSpecConfig::default())
    }
}

impl From<&NovelSpecConfig> for MergeOptions {
    fn from(config: &NovelSpecConfig) -> Self {
        Self {
            spec_label: config.spec_label.clone(),
            missing_requirement: config.merge.missing_requirement,
        }
    }
}

/// Starting text for a capability that has no base document yet.
pub fn skeleton(capability: &str, label: &str) -> String {
    format!("# {capability} {label}\n\n## Purpose\n\n## Requirements\n\n")
}

/// Render a requirement as a Markdown block ending in a newline.
pub fn format_requirement(requirement: &Requirement) -> String {
    let mut md = format!("{REQUIREMENT_PREFIX} {}\n", requirement.name);

    let description = requirement.description.trim();
    if !description.is_empty() {
        md.push_str(description);
        md.push('\n');
    }

    for scenario in &requirement.scenarios {
        let _ = write!(md, "\n#### Scenario: {}\n", scenario.name);
        for condition in &scenario.conditions {
            let _ = writeln!(md, "- **{}** {}", condition.kind, condition.text);
        }
    }

    md
}

/// Collapse runs of blank lines, trim, and end with exactly one newline.
pub fn normalize(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 1);
    let mut newlines = 0usize;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(ch);
    }

    let mut out = out.trim().to_string();
    out.push('\n');
    out
}

/// Locates `### Requirement:` blocks in a base text.
struct BlockFinder {
    any_heading: Regex,
}

impl BlockFinder {
    fn new() -> Result<Self> {
        Ok(Self {
            any_heading: compile(&format!("(?m)^{}", regex::escape(REQUIREMENT_PREFIX)))?,
        })
    }

    /// Byte ranges of every block whose heading names exactly `name`.
    /// A block runs to the next requirement heading or the end of text.
    fn blocks(&self, text: &str, name: &str) -> Result<Vec<Range<usize>>> {
        let heading = compile(&format!(
            r"(?m)^{} {}[ \t]*\r?$",
            regex::escape(REQUIREMENT_PREFIX),
            regex::escape(name)
        ))?;

        Ok(heading
            .find_iter(text)
            .map(|m| {
                let end = self
                    .any_heading
                    .find_at(text, m.end())
                    .map(|next| next.start())
                    .unwrap_or(text.len());
                m.start()..end
            })
            .collect())
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).with_context(|| format!("invalid pattern '{pattern}'"))
}

/// Replace the given non-overlapping ranges, in order, with `replacement`.
fn splice(text: &str, ranges: &[Range<usize>], replacement: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in ranges {
        out.push_str(&text[last..range.start]);
        out.push_str(replacement);
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}

fn append_block(text: &mut String, block: &str) {
    if !text.is_empty() && !text.ends_with("\n\n") {
        text.push_str(if text.ends_with('\n') { "\n" } else { "\n\n" });
    }
    text.push_str(block);
    text.push('\n');
}

/// Apply a delta to a base text (`None` when the base file does not exist).
///
/// Operations run in file order. RENAMED blocks are skipped.
pub fn apply_delta_text(
    base: Option<&str>,
    delta: &DeltaSpec,
    options: &MergeOptions,
) -> Result<String> {
    let mut text = match base {
        Some(base) => base.to_string(),
        None => skeleton(&delta.capability, &options.spec_label),
    };
    let finder = BlockFinder::new()?;

    for operation in &delta.operations {
        match operation.kind {
            OperationKind::Added => {
                for requirement in &operation.requirements {
                    append_block(&mut text, &format_requirement(requirement));
                }
            }
            OperationKind::Modified => {
                for requirement in &operation.requirements {
                    let block = format_requirement(requirement);
                    let ranges = finder.blocks(&text, &requirement.name)?;
                    if !ranges.is_empty() {
                        text = splice(&text, &ranges, &format!("{block}\n"));
                        continue;
                    }

                    match options.missing_requirement {
                        MissingRequirementPolicy::Ignore => {
                            tracing::warn!(
                                capability = %delta.capability,
                                requirement = %requirement.name,
                                "MODIFIED requirement not found in base, ignored"
                            );
                        }
                        MissingRequirementPolicy::Append => {
                            tracing::info!(
                                capability = %delta.capability,
                                requirement = %requirement.name,
                                "MODIFIED requirement not found in base, appended"
                            );
                            append_block(&mut text, &block);
                        }
                        MissingRequirementPolicy::Error => {
                            return Err(Error::merge(
                                &delta.capability,
                                format!(
                                    "MODIFIED requirement '{}' does not exist in the base spec",
                                    requirement.name
                                ),
                            ));
                        }
                    }
                }
            }
            OperationKind::Removed => {
                for requirement in &operation.requirements {
                    let ranges = finder.blocks(&text, &requirement.name)?;
                    if ranges.is_empty() {
                        tracing::debug!(
                            capability = %delta.capability,
                            requirement = %requirement.name,
                            "REMOVED requirement not present"
                        );
                    }
                    text = splice(&text, &ranges, "");
                }
            }
            OperationKind::Renamed => {
                tracing::warn!(
                    capability = %delta.capability,
                    count = operation.requirements.len(),
                    "RENAMED block not applied"
                );
            }
        }
    }

    Ok(normalize(&text))
}

/// Apply a delta to the file at `target`, creating it when absent.
pub fn apply_delta(delta: &DeltaSpec, target: impl AsRef<Path>, options: &MergeOptions) -> Result<()> {
    let target = target.as_ref();
    let base = if target.is_file() {
        Some(novelspec_common_fs::read_document(target)?)
    } else {
        None
    };

    let merged = apply_delta_text(base.as_deref(), delta, options)?;
    if let Some(parent) = target.parent() {
        novelspec_common_fs::ensure_dir(parent)?;
    }
    novelspec_common_fs::write_string_atomic(target, &merged)
}
