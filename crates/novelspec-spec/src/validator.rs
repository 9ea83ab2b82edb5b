//! Structural validation of a change directory.
//!
//! Findings are data: every check runs, every problem is collected, and the
//! caller decides what to do with the [`ValidationResult`].

use std::collections::HashSet;
use std::path::Path;

use novelspec_common_config::ValidationConfig;
use serde::{Deserialize, Serialize};

use crate::layout::{delta_files, DeltaFile};
use crate::messages::MessageKey;
use crate::model::{ConditionKind, OperationKind};
use crate::parser::parse_delta;
use crate::proposal::{PROPOSAL_FILE, REQUIRED_SECTIONS};
use crate::tasks::TASKS_FILE;

/// Error class of a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    /// Violation of the Markdown dialect
    Format,
    /// Strict-mode content rule
    Semantic,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Format => "format",
            Self::Semantic => "semantic",
        }
    }
}

/// A finding that makes the change invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Path relative to the change directory
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub key: MessageKey,
    pub message: String,
    pub suggestion: String,
}

/// An advisory finding. Never affects validity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    pub key: MessageKey,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Outcome of validating one change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    fn from_findings(errors: Vec<ValidationError>, warnings: Vec<ValidationWarning>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

/// Validator settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Run semantic checks
    pub strict: bool,
    /// Warn above this many description characters, 0 disables
    pub max_description_chars: usize,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self::from(&ValidationConfig::default())
    }
}

impl From<&ValidationConfig> for ValidationOptions {
    fn from(config: &ValidationConfig) -> Self {
        Self {
            strict: config.strict,
            max_description_chars: config.max_description_chars,
        }
    }
}

impl ValidationOptions {
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// Validate a change directory with default options.
pub fn validate_change(change_dir: impl AsRef<Path>, strict: bool) -> ValidationResult {
    Validator::new(ValidationOptions::default().strict(strict)).validate_change(change_dir)
}

/// Runs every check over a change directory.
#[derive(Debug, Clone, Default)]
pub struct Validator {
    options: ValidationOptions,
}

#[derive(Default)]
struct Findings {
    errors: Vec<ValidationError>,
    warnings: Vec<ValidationWarning>,
}

impl Findings {
    fn error(&mut self, file: &str, line: Option<usize>, kind: ErrorKind, key: MessageKey, name: &str) {
        self.errors.push(ValidationError {
            file: file.to_string(),
            line,
            kind,
            key,
            message: key.message(name),
            suggestion: key.suggestion().to_string(),
        });
    }

    fn format(&mut self, file: &str, key: MessageKey) {
        self.error(file, None, ErrorKind::Format, key, "");
    }

    fn warning(&mut self, file: &str, line: Option<usize>, key: MessageKey, name: &str) {
        self.warnings.push(ValidationWarning {
            file: file.to_string(),
            line,
            key,
            message: key.message(name),
            suggestion: Some(key.suggestion().to_string()),
        });
    }
}

impl Validator {
    pub fn new(options: ValidationOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ValidationOptions {
        self.options
    }

    pub fn validate_change(&self, change_dir: impl AsRef<Path>) -> ValidationResult {
        let change_dir = change_dir.as_ref();
        let mut findings = Findings::default();

        self.check_proposal(change_dir, &mut findings);
        self.check_tasks(change_dir, &mut findings);
        self.check_deltas(change_dir, &mut findings);

        let result = ValidationResult::from_findings(findings.errors, findings.warnings);
        tracing::info!(
            change = %change_dir.display(),
            valid = result.valid,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            strict = self.options.strict,
            "validated change"
        );
        result
    }

    fn check_proposal(&self, change_dir: &Path, findings: &mut Findings) {
        let path = change_dir.join(PROPOSAL_FILE);
        if !path.is_file() {
            findings.format(PROPOSAL_FILE, MessageKey::MissingProposal);
            return;
        }

        let Some(content) = read_or_report(&path, PROPOSAL_FILE, findings) else {
            return;
        };

        for section in REQUIRED_SECTIONS {
            let heading = format!("## {section}");
            if !content.lines().any(|line| line.trim() == heading) {
                if let Some(key) = MessageKey::for_section(section) {
                    findings.format(PROPOSAL_FILE, key);
                }
            }
        }
    }

    fn check_tasks(&self, change_dir: &Path, findings: &mut Findings) {
        let path = change_dir.join(TASKS_FILE);
        if !path.is_file() {
            findings.format(TASKS_FILE, MessageKey::MissingTasks);
            return;
        }

        let Some(content) = read_or_report(&path, TASKS_FILE, findings) else {
            return;
        };

        let has_task_list = content.lines().any(|line| {
            let line = line.trim();
            line.starts_with("- [ ]") || line.starts_with("- [x]")
        });
        if !has_task_list {
            findings.format(TASKS_FILE, MessageKey::NoTaskList);
        }
    }

    fn check_deltas(&self, change_dir: &Path, findings: &mut Findings) {
        const SPECS_LABEL: &str = "specs/";

        if !change_dir.join("specs").is_dir() {
            findings.format(SPECS_LABEL, MessageKey::MissingSpecsDir);
            return;
        }

        let files = match delta_files(change_dir) {
            Ok(files) => files,
            Err(e) => {
                findings.error(
                    SPECS_LABEL,
                    None,
                    ErrorKind::Format,
                    MessageKey::UnreadableFile,
                    &e.to_string(),
                );
                return;
            }
        };

        if files.is_empty() {
            findings.format(SPECS_LABEL, MessageKey::NoDeltaFile);
            return;
        }

        for file in &files {
            self.check_delta_file(file, findings);
        }
    }

    fn check_delta_file(&self, file: &DeltaFile, findings: &mut Findings) {
        let shown = file.display_path();
        let Some(content) = read_or_report(&file.path, &shown, findings) else {
            return;
        };

        let has_marker = content
            .lines()
            .any(|line| OperationKind::from_exact_line(line.trim()).is_some());
        if !has_marker {
            findings.format(&shown, MessageKey::NoDeltaMarker);
        }

        let delta = parse_delta(&content, file.label());
        tracing::debug!(
            file = %shown,
            operations = delta.operations.len(),
            "parsed delta"
        );

        for operation in &delta.operations {
            if operation.kind == OperationKind::Renamed {
                findings.warning(&shown, None, MessageKey::RenamedNotApplied, "");
            }

            let mut seen = HashSet::new();
            for requirement in &operation.requirements {
                let name = requirement.name.as_str();

                if !seen.insert(name) {
                    findings.warning(
                        &shown,
                        requirement.line,
                        MessageKey::DuplicateRequirement,
                        name,
                    );
                }

                if requirement.scenarios.is_empty() {
                    findings.error(
                        &shown,
                        requirement.line,
                        ErrorKind::Format,
                        MessageKey::NoScenario,
                        name,
                    );
                }

                if !requirement.level_declared {
                    findings.warning(
                        &shown,
                        requirement.line,
                        MessageKey::MissingKeyword,
                        name,
                    );
                }

                let limit = self.options.max_description_chars;
                if limit > 0 && requirement.description.chars().count() > limit {
                    findings.warning(
                        &shown,
                        requirement.line,
                        MessageKey::LongDescription,
                        name,
                    );
                }

                if self.options.strict {
                    for scenario in &requirement.scenarios {
                        if !scenario.has(ConditionKind::When) || !scenario.has(ConditionKind::Then)
                        {
                            findings.error(
                                &shown,
                                scenario.line,
                                ErrorKind::Semantic,
                                MessageKey::MissingCondition,
                                &scenario.name,
                            );
                        }
                    }
                }
            }
        }
    }
}

/// Read a file, turning a failure into one format error for it.
fn read_or_report(path: &Path, shown: &str, findings: &mut Findings) -> Option<String> {
    match novelspec_common_fs::read_document(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::debug!(file = %shown, error = %e, "unreadable file");
            findings.error(
                shown,
                None,
                ErrorKind::Format,
                MessageKey::UnreadableFile,
                &e.to_string(),
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{tempdir, TempDir};

    const PROPOSAL: &str = "## Why\n\n原因\n\n## What Changes\n- 新增\n\n## Impact\n- outline\n";
    const TASKS: &str = "- [x] 1.1 done\n";
    const DELTA: &str = "\
## ADDED Requirements

### Requirement: 第11章
第11章应该（SHALL）开启宗门大比篇章。

#### Scenario: 大比开幕
- **WHEN** 第11章开始
- **THEN** 宗门宣布大比
";

    fn change(proposal: Option<&str>, tasks: Option<&str>, deltas: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        if let Some(p) = proposal {
            fs::write(dir.path().join(PROPOSAL_FILE), p).unwrap();
        }
        if let Some(t) = tasks {
            fs::write(dir.path().join(TASKS_FILE), t).unwrap();
        }
        for (cap, body) in deltas {
            let cap_dir = dir.path().join("specs").join(cap);
            fs::create_dir_all(&cap_dir).unwrap();
            fs::write(cap_dir.join("spec.md"), body).unwrap();
        }
        dir
    }

    #[test]
    fn test_valid_change() {
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("outline", DELTA)]);
        let result = validate_change(dir.path(), true);
        assert!(result.valid, "{:?}", result.errors);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_missing_impact_only() {
        let proposal = "## Why\nx\n## What Changes\ny\n";
        let dir = change(Some(proposal), Some("- [x] a\n- [x] b\n"), &[("outline", DELTA)]);
        let result = validate_change(dir.path(), false);

        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].key, MessageKey::MissingImpact);
        assert_eq!(result.errors[0].kind, ErrorKind::Format);
        assert_eq!(result.errors[0].file, "proposal.md");
    }

    #[test]
    fn test_missing_files_one_error_each() {
        let dir = tempdir().unwrap();
        let result = validate_change(dir.path(), false);
        let keys: Vec<_> = result.errors.iter().map(|e| e.key).collect();
        assert_eq!(
            keys,
            vec![
                MessageKey::MissingProposal,
                MessageKey::MissingTasks,
                MessageKey::MissingSpecsDir
            ]
        );
        assert!(result.errors.iter().all(|e| !e.suggestion.is_empty()));
    }

    #[test]
    fn test_no_task_list() {
        let dir = change(Some(PROPOSAL), Some("1. plain list\n"), &[("outline", DELTA)]);
        let result = validate_change(dir.path(), false);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].key, MessageKey::NoTaskList);
    }

    #[test]
    fn test_nested_checkbox_counts_as_task_list() {
        let dir = change(Some(PROPOSAL), Some("1. group\n   - [ ] nested\n"), &[("outline", DELTA)]);
        assert!(validate_change(dir.path(), false).valid);
    }

    #[test]
    fn test_empty_specs_dir() {
        let dir = change(Some(PROPOSAL), Some(TASKS), &[]);
        fs::create_dir_all(dir.path().join("specs/outline")).unwrap();
        let result = validate_change(dir.path(), false);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].key, MessageKey::NoDeltaFile);
    }

    #[test]
    fn test_strict_missing_then() {
        let delta = "\
## MODIFIED Requirements

### Requirement: 主角
主角必须（MUST）冷静。

#### Scenario: 危险
- **WHEN** 遇到威胁
";
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("characters/protagonist", delta)]);

        assert!(validate_change(dir.path(), false).valid);

        let result = validate_change(dir.path(), true);
        assert_eq!(result.errors.len(), 1);
        let err = &result.errors[0];
        assert_eq!(err.kind, ErrorKind::Semantic);
        assert_eq!(err.key, MessageKey::MissingCondition);
        assert!(err.message.contains("危险"));
        assert_eq!(err.line, Some(6));
        assert_eq!(err.file, "specs/characters/protagonist/spec.md");
    }

    #[test]
    fn test_missing_marker_and_scenario() {
        let delta = "## Added requirements\n\n### Requirement: A\nA SHALL be.\n";
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("outline", delta)]);
        let result = validate_change(dir.path(), false);
        let keys: Vec<_> = result.errors.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![MessageKey::NoDeltaMarker]);

        let delta = "## ADDED Requirements\n\n### Requirement: A\nA SHALL be.\n";
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("outline", delta)]);
        let result = validate_change(dir.path(), false);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].key, MessageKey::NoScenario);
        assert_eq!(result.errors[0].line, Some(3));
    }

    #[test]
    fn test_marker_with_suffix_is_not_exact() {
        let delta = format!("{}\n", DELTA.replace("## ADDED Requirements", "## ADDED Requirements (new)"));
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("outline", &delta)]);
        let result = validate_change(dir.path(), false);
        let keys: Vec<_> = result.errors.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![MessageKey::NoDeltaMarker]);
    }

    #[test]
    fn test_missing_keyword_is_a_warning_in_both_modes() {
        let delta = "\
## ADDED Requirements

### Requirement: A
plain prose only

#### Scenario: s
- **WHEN** x
- **THEN** y
";
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("outline", delta)]);

        for strict in [false, true] {
            let result = validate_change(dir.path(), strict);
            assert!(result.valid, "{:?}", result.errors);
            assert_eq!(result.warnings.len(), 1);
            assert_eq!(result.warnings[0].key, MessageKey::MissingKeyword);
        }
    }

    #[test]
    fn test_strict_plain_description_missing_then_is_one_error() {
        let delta = "\
## MODIFIED Requirements

### Requirement: 主角
主角保持冷静。

#### Scenario: 危险
- **WHEN** 遇到威胁
";
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("characters/protagonist", delta)]);

        let result = validate_change(dir.path(), true);
        assert_eq!(result.errors.len(), 1, "{:?}", result.errors);
        assert_eq!(result.errors[0].kind, ErrorKind::Semantic);
        assert_eq!(result.errors[0].key, MessageKey::MissingCondition);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.key == MessageKey::MissingKeyword));
    }

    #[test]
    fn test_advisory_warnings() {
        let delta = format!(
            "{DELTA}\n### Requirement: 第11章\n重复 SHALL。\n\n#### Scenario: s\n- **WHEN** a\n- **THEN** b\n\n## RENAMED Requirements\n"
        );
        let dir = change(Some(PROPOSAL), Some(TASKS), &[("outline", &delta)]);
        let result = Validator::new(ValidationOptions {
            strict: false,
            max_description_chars: 5,
        })
        .validate_change(dir.path());

        assert!(result.valid);
        let keys: Vec<_> = result.warnings.iter().map(|w| w.key).collect();
        assert!(keys.contains(&MessageKey::DuplicateRequirement));
        assert!(keys.contains(&MessageKey::RenamedNotApplied));
        assert!(keys.contains(&MessageKey::LongDescription));
    }

    #[test]
    fn test_unreadable_file_is_one_error_and_siblings_still_checked() {
        let dir = change(
            Some(PROPOSAL),
            Some(TASKS),
            &[("outline", DELTA), ("world", "## ADDED Requirements\n### Requirement: X\n")],
        );
        fs::write(dir.path().join("specs/outline/spec.md"), [0xff, 0xfe, 0x00]).unwrap();

        let result = validate_change(dir.path(), false);
        let keys: Vec<_> = result.errors.iter().map(|e| e.key).collect();
        assert_eq!(keys, vec![MessageKey::UnreadableFile, MessageKey::NoScenario]);
        assert_eq!(result.errors[0].file, "specs/outline/spec.md");
        assert_eq!(result.errors[1].file, "specs/world/spec.md");
    }

    #[test]
    fn test_root_level_delta_label() {
        let dir = change(Some(PROPOSAL), Some(TASKS), &[]);
        fs::create_dir_all(dir.path().join("specs")).unwrap();
        fs::write(dir.path().join("specs/spec.md"), "no marker\n").unwrap();
        let result = validate_change(dir.path(), false);
        assert_eq!(result.errors[0].file, "specs/spec.md");
    }
}
