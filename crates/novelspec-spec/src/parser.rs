//! Line-oriented parser for base specs and delta specs.
//!
//! The dialect has fixed heading depths (`###` requirement, `####` scenario)
//! and bullet-prefixed WHEN/THEN conditions, so a single pass over trimmed
//! lines is enough. Parsing never fails: anything that does not match the
//! grammar is ignored, and the validator reports what is missing.

use std::path::Path;

use crate::model::{
    Condition, ConditionKind, DeltaOperation, DeltaSpec, OperationKind, Requirement, Scenario,
    SpecDocument,
};

pub const REQUIREMENT_PREFIX: &str = "### Requirement:";
pub const SCENARIO_PREFIX: &str = "#### Scenario:";
pub const PURPOSE_HEADING: &str = "## Purpose";
const REQUIREMENTS_HEADING: &str = "## Requirements";

/// Requirement/scenario state shared by both parse modes.
#[derive(Debug, Default)]
struct RequirementScanner {
    requirement: Option<Requirement>,
    scenario: Option<Scenario>,
    /// Description lines are still being captured
    describing: bool,
}

impl RequirementScanner {
    /// Feed one trimmed line. Returns the previous requirement when this
    /// line starts a new one.
    fn feed(&mut self, line_no: usize, line: &str) -> Option<Requirement> {
        if let Some(name) = line.strip_prefix(REQUIREMENT_PREFIX) {
            let finished = self.finish();
            let mut requirement = Requirement::new(name.trim());
            requirement.line = Some(line_no);
            self.requirement = Some(requirement);
            self.describing = true;
            return finished;
        }

        if let Some(name) = line.strip_prefix(SCENARIO_PREFIX) {
            self.close_scenario();
            if self.requirement.is_some() {
                let mut scenario = Scenario::new(name.trim());
                scenario.line = Some(line_no);
                self.scenario = Some(scenario);
            }
            self.describing = false;
            return None;
        }

        if line.starts_with("## ") && !line.starts_with(REQUIREMENTS_HEADING) {
            self.describing = false;
            return None;
        }

        if let Some(scenario) = self.scenario.as_mut() {
            if let Some(condition) = parse_condition(line) {
                scenario.conditions.push(condition);
            }
        } else if self.describing && !line.starts_with('#') {
            if let Some(requirement) = self.requirement.as_mut() {
                requirement.push_description_line(line);
            }
        }

        None
    }

    fn close_scenario(&mut self) {
        if let Some(scenario) = self.scenario.take() {
            if let Some(requirement) = self.requirement.as_mut() {
                requirement.scenarios.push(scenario);
            }
        }
    }

    /// Close the open scenario and hand back the open requirement.
    fn finish(&mut self) -> Option<Requirement> {
        self.close_scenario();
        self.describing = false;
        self.requirement.take()
    }
}

fn parse_condition(line: &str) -> Option<Condition> {
    [ConditionKind::When, ConditionKind::Then]
        .into_iter()
        .find_map(|kind| {
            line.strip_prefix(kind.marker()).map(|text| Condition {
                kind,
                text: text.trim().to_string(),
            })
        })
}

/// Parse a base specification document.
pub fn parse_spec(content: &str, path: impl AsRef<Path>) -> SpecDocument {
    let mut requirements = Vec::new();
    let mut scanner = RequirementScanner::default();

    for (idx, raw) in content.lines().enumerate() {
        if let Some(done) = scanner.feed(idx + 1, raw.trim()) {
            requirements.push(done);
        }
    }
    requirements.extend(scanner.finish());

    SpecDocument {
        path: path.as_ref().to_path_buf(),
        purpose: extract_purpose(content),
        requirements,
    }
}

/// Parse a delta file into its operation blocks.
///
/// An operation header closes the open requirement into the block that was
/// open before it. Requirements that appear before any header are dropped.
pub fn parse_delta(content: &str, capability: impl Into<String>) -> DeltaSpec {
    let mut delta = DeltaSpec::new(capability);
    let mut scanner = RequirementScanner::default();
    let mut orphans = 0usize;

    let mut attach = |operations: &mut Vec<DeltaOperation>, requirement: Requirement| {
        match operations.last_mut() {
            Some(op) => op.requirements.push(requirement),
            None => orphans += 1,
        }
    };

    for (idx, raw) in content.lines().enumerate() {
        let line = raw.trim();

        if let Some(kind) = OperationKind::from_line(line) {
            if let Some(done) = scanner.finish() {
                attach(&mut delta.operations, done);
            }
            delta.operations.push(DeltaOperation::new(kind));
            continue;
        }

        if let Some(done) = scanner.feed(idx + 1, line) {
            attach(&mut delta.operations, done);
        }
    }
    if let Some(done) = scanner.finish() {
        attach(&mut delta.operations, done);
    }

    if orphans > 0 {
        tracing::debug!(
            capability = %delta.capability,
            dropped = orphans,
            "requirements before any operation header ignored"
        );
    }

    delta
}

/// Trimmed body lines under `## Purpose`, joined with spaces.
fn extract_purpose(content: &str) -> String {
    let mut lines = content.lines().map(str::trim);
    if lines.by_ref().find(|line| *line == PURPOSE_HEADING).is_none() {
        return String::new();
    }

    lines
        .take_while(|line| !line.starts_with("##"))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Level;

    #[test]
    fn test_parse_single_requirement() {
        let doc = parse_spec(
            "### Requirement: Foo\nMust do X.\n\n#### Scenario: bar\n- **WHEN** a\n- **THEN** b\n",
            "spec.md",
        );

        assert_eq!(doc.requirements.len(), 1);
        let req = &doc.requirements[0];
        assert_eq!(req.name, "Foo");
        assert_eq!(req.level, Level::Must);
        assert_eq!(req.description, "Must do X.");
        assert_eq!(req.line, Some(1));
        assert_eq!(req.scenarios.len(), 1);
        assert_eq!(req.scenarios[0].name, "bar");
        assert_eq!(req.scenarios[0].line, Some(4));
        assert_eq!(
            req.scenarios[0].conditions,
            vec![Condition::when("a"), Condition::then("b")]
        );
    }

    #[test]
    fn test_parse_spec_purpose() {
        let content = "# outline 规格\n\n## Purpose\n\n整部小说的大纲。\n分卷记录。\n\n## Requirements\n";
        let doc = parse_spec(content, "novelspec/specs/outline/spec.md");
        assert_eq!(doc.purpose, "整部小说的大纲。 分卷记录。");
        assert!(doc.requirements.is_empty());
    }

    #[test]
    fn test_purpose_heading_must_match_exactly() {
        let doc = parse_spec("## Purposeful\nnot a purpose\n", "spec.md");
        assert_eq!(doc.purpose, "");
    }

    #[test]
    fn test_requirement_without_scenarios_is_kept() {
        let doc = parse_spec("### Requirement: Lonely\nIt SHALL exist.\n", "spec.md");
        assert_eq!(doc.requirements.len(), 1);
        assert!(doc.requirements[0].scenarios.is_empty());
    }

    #[test]
    fn test_last_scenario_kept_when_next_requirement_starts() {
        let content = "\
### Requirement: A
A SHALL be.

#### Scenario: a1
- **WHEN** x
- **THEN** y

### Requirement: B
B MAY be.
";
        let doc = parse_spec(content, "spec.md");
        assert_eq!(doc.requirements.len(), 2);
        assert_eq!(doc.requirements[0].scenarios.len(), 1);
        assert_eq!(doc.requirements[1].level, Level::May);
    }

    #[test]
    fn test_other_section_stops_description() {
        let content = "\
### Requirement: A
A SHALL be.
## Notes
Readers MAY skip this.
";
        let doc = parse_spec(content, "spec.md");
        assert_eq!(doc.requirements[0].description, "A SHALL be.");
        assert_eq!(doc.requirements[0].level, Level::Shall);
    }

    #[test]
    fn test_conditions_after_other_section_still_attach() {
        let content = "\
### Requirement: A
#### Scenario: s
- **WHEN** x
## Notes
- **THEN** y
";
        let doc = parse_spec(content, "spec.md");
        assert_eq!(doc.requirements[0].scenarios[0].conditions.len(), 2);
    }

    #[test]
    fn test_default_level_when_no_keyword() {
        let doc = parse_spec("### Requirement: A\nplain words\n", "spec.md");
        assert_eq!(doc.requirements[0].level, Level::Shall);
        assert!(!doc.requirements[0].level_declared);
    }

    #[test]
    fn test_condition_text_is_trimmed_remainder() {
        let doc = parse_spec(
            "### Requirement: A\n#### Scenario: s\n  - **WHEN**   主角出场  \n- **THEN**姓名：陈凡\n",
            "spec.md",
        );
        let conditions = &doc.requirements[0].scenarios[0].conditions;
        assert_eq!(conditions[0].text, "主角出场");
        assert_eq!(conditions[1].text, "姓名：陈凡");
    }

    #[test]
    fn test_parse_delta_operations_in_order() {
        let content = "\
## ADDED Requirements

### Requirement: 第11章
第11章应该（SHALL）开启宗门大比篇章。

#### Scenario: 大比开幕
- **WHEN** 第11章开始
- **THEN** 宗门宣布大比

## REMOVED Requirements

### Requirement: 旧设定

## MODIFIED Requirements

### Requirement: 主角
主角必须（MUST）冷静。

#### Scenario: 危险
- **WHEN** 遇到威胁
- **THEN** 保持冷静
";
        let delta = parse_delta(content, "outline");
        assert_eq!(delta.capability, "outline");

        let kinds: Vec<_> = delta.operations.iter().map(|op| op.kind).collect();
        assert_eq!(
            kinds,
            vec![
                OperationKind::Added,
                OperationKind::Removed,
                OperationKind::Modified
            ]
        );

        assert_eq!(delta.operations[0].requirements[0].name, "第11章");
        assert_eq!(delta.operations[0].requirements[0].scenarios.len(), 1);
        assert_eq!(delta.operations[1].requirements[0].name, "旧设定");
        assert_eq!(delta.operations[2].requirements[0].level, Level::Must);
        assert_eq!(delta.operations[2].requirements[0].scenarios.len(), 1);
    }

    #[test]
    fn test_header_closes_requirement_into_previous_operation() {
        let content = "\
## ADDED Requirements
### Requirement: A
#### Scenario: s
- **WHEN** x
- **THEN** y
## REMOVED Requirements
";
        let delta = parse_delta(content, "c");
        assert_eq!(delta.operations.len(), 2);
        assert_eq!(delta.operations[0].requirements.len(), 1);
        assert_eq!(delta.operations[0].requirements[0].scenarios.len(), 1);
        assert!(delta.operations[1].requirements.is_empty());
    }

    #[test]
    fn test_requirements_before_header_dropped() {
        let content = "### Requirement: Early\n## ADDED Requirements\n### Requirement: Late\n";
        let delta = parse_delta(content, "c");
        assert_eq!(delta.operations.len(), 1);
        let names: Vec<_> = delta.operations[0]
            .requirements
            .iter()
            .map(|r| r.name.as_str())
            .collect();
        assert_eq!(names, vec!["Late"]);
    }

    #[test]
    fn test_delta_without_headers_has_no_operations() {
        let delta = parse_delta("# just prose\n", "c");
        assert!(delta.is_empty());
    }

    #[test]
    fn test_crlf_input() {
        let delta = parse_delta(
            "## ADDED Requirements\r\n### Requirement: A\r\n#### Scenario: s\r\n- **WHEN** x\r\n",
            "c",
        );
        let req = &delta.operations[0].requirements[0];
        assert_eq!(req.name, "A");
        assert_eq!(req.scenarios[0].conditions[0].text, "x");
    }
}
