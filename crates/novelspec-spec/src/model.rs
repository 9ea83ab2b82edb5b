//! Document model shared by the parser, validator and merge engine.

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Kind of a scenario condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConditionKind {
    When,
    Then,
}

impl ConditionKind {
    /// Bullet marker that introduces this condition in Markdown.
    pub fn marker(self) -> &'static str {
        match self {
            Self::When => "- **WHEN**",
            Self::Then => "- **THEN**",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::When => "WHEN",
            Self::Then => "THEN",
        }
    }
}

impl fmt::Display for ConditionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single WHEN/THEN line of a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    pub text: String,
}

impl Condition {
    pub fn when(text: impl Into<String>) -> Self {
        Self {
            kind: ConditionKind::When,
            text: text.into(),
        }
    }

    pub fn then(text: impl Into<String>) -> Self {
        Self {
            kind: ConditionKind::Then,
            text: text.into(),
        }
    }
}

/// A `#### Scenario:` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    /// Conditions in source order
    pub conditions: Vec<Condition>,
    /// 1-based line of the scenario heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            conditions: Vec::new(),
            line: None,
        }
    }

    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn has(&self, kind: ConditionKind) -> bool {
        self.conditions.iter().any(|c| c.kind == kind)
    }
}

/// Normative strength of a requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    #[default]
    Shall,
    Must,
    May,
    Should,
}

impl Level {
    /// Detection priority when one line carries several keywords.
    const PRIORITY: [Level; 4] = [Level::Shall, Level::Must, Level::May, Level::Should];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Shall => "SHALL",
            Self::Must => "MUST",
            Self::May => "MAY",
            Self::Should => "SHOULD",
        }
    }

    fn capitalized(self) -> &'static str {
        match self {
            Self::Shall => "Shall",
            Self::Must => "Must",
            Self::May => "May",
            Self::Should => "Should",
        }
    }

    /// Find the modal keyword of one description line.
    ///
    /// Keywords match as whole words, upper-case or capitalised, so
    /// `Must do X.` is MUST and the bilingual `必须（MUST）` is too. Ordinary
    /// prose such as `readers may skip` or `mayor` declares nothing.
    pub fn detect(line: &str) -> Option<Level> {
        Self::PRIORITY.into_iter().find(|level| {
            contains_word(line, level.as_str()) || contains_word(line, level.capitalized())
        })
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn contains_word(haystack: &str, word: &str) -> bool {
    let bytes = haystack.as_bytes();
    haystack.match_indices(word).any(|(start, _)| {
        let end = start + word.len();
        let before = start == 0 || !bytes[start - 1].is_ascii_alphanumeric();
        let after = end == bytes.len() || !bytes[end].is_ascii_alphanumeric();
        before && after
    })
}

/// A `### Requirement:` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub name: String,
    /// Last modal keyword seen in the description, SHALL when none
    pub level: Level,
    /// Whether any description line carried a modal keyword
    pub level_declared: bool,
    pub description: String,
    pub scenarios: Vec<Scenario>,
    /// 1-based line of the requirement heading
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

impl Requirement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::default(),
            level_declared: false,
            description: String::new(),
            scenarios: Vec::new(),
            line: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description.clear();
        for line in description.into().lines() {
            self.push_description_line(line.trim());
        }
        self
    }

    pub fn with_scenario(mut self, scenario: Scenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// Append one trimmed description line and re-detect the level.
    pub(crate) fn push_description_line(&mut self, line: &str) {
        if line.is_empty() {
            return;
        }
        if !self.description.is_empty() {
            self.description.push(' ');
        }
        self.description.push_str(line);

        if let Some(level) = Level::detect(line) {
            self.level = level;
            self.level_declared = true;
        }
    }
}

/// A base specification document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecDocument {
    pub path: PathBuf,
    pub purpose: String,
    pub requirements: Vec<Requirement>,
}

impl SpecDocument {
    pub fn requirement(&self, name: &str) -> Option<&Requirement> {
        self.requirements.iter().find(|r| r.name == name)
    }
}

/// The four delta operation kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationKind {
    Added,
    Modified,
    Removed,
    Renamed,
}

impl OperationKind {
    pub const ALL: [OperationKind; 4] = [
        OperationKind::Added,
        OperationKind::Modified,
        OperationKind::Removed,
        OperationKind::Renamed,
    ];

    /// The `## <KIND> Requirements` heading line.
    pub fn header(self) -> &'static str {
        match self {
            Self::Added => "## ADDED Requirements",
            Self::Modified => "## MODIFIED Requirements",
            Self::Removed => "## REMOVED Requirements",
            Self::Renamed => "## RENAMED Requirements",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Modified => "MODIFIED",
            Self::Removed => "REMOVED",
            Self::Renamed => "RENAMED",
        }
    }

    /// Operation opened by a trimmed line starting with its header.
    pub fn from_line(trimmed: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| trimmed.starts_with(kind.header()))
    }

    /// Operation whose header is exactly the trimmed line.
    pub fn from_exact_line(trimmed: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| trimmed == kind.header())
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation block of a delta file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaOperation {
    #[serde(rename = "type")]
    pub kind: OperationKind,
    pub requirements: Vec<Requirement>,
}

impl DeltaOperation {
    pub fn new(kind: OperationKind) -> Self {
        Self {
            kind,
            requirements: Vec::new(),
        }
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }
}

/// A parsed delta file for one capability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeltaSpec {
    /// Path under `specs/`, e.g. `characters/protagonist`
    pub capability: String,
    /// Operations in file order
    pub operations: Vec<DeltaOperation>,
}

impl DeltaSpec {
    pub fn new(capability: impl Into<String>) -> Self {
        Self {
            capability: capability.into(),
            operations: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: DeltaOperation) -> Self {
        self.operations.push(operation);
        self
    }

    /// Every requirement across all operations, in file order.
    pub fn requirements(&self) -> impl Iterator<Item = (OperationKind, &Requirement)> {
        self.operations
            .iter()
            .flat_map(|op| op.requirements.iter().map(move |r| (op.kind, r)))
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}
