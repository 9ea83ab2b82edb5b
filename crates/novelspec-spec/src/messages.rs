//! Catalogue of validation messages.
//!
//! Every finding the validator reports draws its text from here, so each
//! one carries a suggestion and, where it helps, a worked example.

use serde::{Deserialize, Serialize};

/// Identifies one catalogue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MessageKey {
    MissingProposal,
    MissingWhy,
    MissingWhatChanges,
    MissingImpact,
    MissingTasks,
    NoTaskList,
    IncompleteTasks,
    MissingSpecsDir,
    NoDeltaFile,
    NoDeltaMarker,
    NoScenario,
    MissingKeyword,
    MissingCondition,
    UnreadableFile,
    DuplicateRequirement,
    RenamedNotApplied,
    LongDescription,
}

/// Text of one catalogue entry. `{name}` in `message` is replaced by the
/// subject of the finding (a requirement, scenario or section name).
#[derive(Debug, Clone, Copy)]
pub struct Entry {
    pub message: &'static str,
    pub suggestion: &'static str,
    pub example: Option<&'static str>,
}

impl MessageKey {
    /// Key for a missing required proposal section.
    pub fn for_section(section: &str) -> Option<Self> {
        match section {
            "Why" => Some(Self::MissingWhy),
            "What Changes" => Some(Self::MissingWhatChanges),
            "Impact" => Some(Self::MissingImpact),
            _ => None,
        }
    }

    pub fn entry(self) -> Entry {
        match self {
            Self::MissingProposal => Entry {
                message: "proposal.md is missing",
                suggestion: "Create proposal.md with the sections ## Why, ## What Changes and ## Impact.",
                example: None,
            },
            Self::MissingWhy => Entry {
                message: "proposal.md has no ## Why section",
                suggestion: "Add a ## Why section explaining the intent of the change: \
                             what these chapters do for the story and which plot lines or \
                             characters they move forward.",
                example: Some(
                    "## Why\n\
                     前10章完成了主角入门和基础修炼，第11-20章需要：\n\
                     - 通过宗门大比展现主角实力和成长\n\
                     - 为第二卷埋下伏笔",
                ),
            },
            Self::MissingWhatChanges => Entry {
                message: "proposal.md has no ## What Changes section",
                suggestion: "Add a ## What Changes section listing the specs that are added \
                             or modified and the chapter range being written.",
                example: Some(
                    "## What Changes\n\
                     - 新增第11-20章大纲规格\n\
                     - 主角等级从炼气7层 → 炼气9层",
                ),
            },
            Self::MissingImpact => Entry {
                message: "proposal.md has no ## Impact section",
                suggestion: "Add an ## Impact section naming the affected spec files and chapters.",
                example: Some(
                    "## Impact\n\
                     - specs/outline/spec.md（新增10章）\n\
                     - specs/characters/protagonist/spec.md（等级更新）",
                ),
            },
            Self::MissingTasks => Entry {
                message: "tasks.md is missing",
                suggestion: "Create tasks.md using a Markdown checklist (- [ ] or - [x]).",
                example: None,
            },
            Self::NoTaskList => Entry {
                message: "tasks.md contains no checklist items",
                suggestion: "Write tasks as a Markdown checklist using - [ ] or - [x]. Group them \
                             into spec updates, chapter writing and consistency checks.",
                example: Some(
                    "## 1. 规格更新\n\
                     - [ ] 1.1 更新主角规格（specs/characters/protagonist/spec.md）\n\n\
                     ## 2. 章节创作\n\
                     - [ ] 2.1 第11章：宗门大比开幕",
                ),
            },
            Self::IncompleteTasks => Entry {
                message: "tasks.md still has unchecked tasks",
                suggestion: "Finish every top-level task and mark it [x] before archiving, \
                             or remove tasks that no longer apply.",
                example: None,
            },
            Self::MissingSpecsDir => Entry {
                message: "specs/ directory is missing",
                suggestion: "Create specs/<capability>/spec.md inside the change for every \
                             spec the change touches.",
                example: None,
            },
            Self::NoDeltaFile => Entry {
                message: "specs/ contains no spec.md files",
                suggestion: "Add at least one specs/<capability>/spec.md delta file.",
                example: None,
            },
            Self::NoDeltaMarker => Entry {
                message: "delta spec has no ADDED/MODIFIED/REMOVED/RENAMED header",
                suggestion: "Start each block of the delta with one of ## ADDED Requirements, \
                             ## MODIFIED Requirements, ## REMOVED Requirements or \
                             ## RENAMED Requirements on a line of its own.",
                example: Some(
                    "## ADDED Requirements\n\n\
                     ### Requirement: 第11章 - 宗门大比开幕\n\
                     第11章应该（SHALL）开启宗门大比篇章。\n\n\
                     #### Scenario: 大比开幕\n\
                     - **WHEN** 第11章开始\n\
                     - **THEN** 宗门宣布三年一度大比",
                ),
            },
            Self::NoScenario => Entry {
                message: "requirement \"{name}\" has no scenario",
                suggestion: "Give every requirement at least one #### Scenario: with WHEN/THEN \
                             lines describing a concrete plot event or behavior.",
                example: Some(
                    "### Requirement: 主角行为模式\n\
                     主角应该（SHALL）展现一致的行为模式。\n\n\
                     #### Scenario: 面对危险时\n\
                     - **WHEN** 遇到生命威胁\n\
                     - **THEN** 保持冷静，理性分析局势",
                ),
            },
            Self::MissingKeyword => Entry {
                message: "requirement \"{name}\" uses no SHALL/MUST/MAY/SHOULD keyword",
                suggestion: "State how binding the requirement is: SHALL (应该) for the normal \
                             rule, MUST (必须) for hard constraints, MAY (可以) for options.",
                example: Some(
                    "### Requirement: 修炼体系\n\
                     修炼体系必须（MUST）清晰且一致。",
                ),
            },
            Self::MissingCondition => Entry {
                message: "scenario \"{name}\" needs at least one WHEN and one THEN",
                suggestion: "Describe the trigger with - **WHEN** and the expected outcome \
                             with - **THEN**.",
                example: Some(
                    "#### Scenario: 身份信息\n\
                     - **WHEN** 主角出场或被提及\n\
                     - **THEN** 姓名：陈凡",
                ),
            },
            Self::UnreadableFile => Entry {
                message: "could not read file: {name}",
                suggestion: "Check that the file exists, is readable and is UTF-8 encoded.",
                example: None,
            },
            Self::DuplicateRequirement => Entry {
                message: "requirement \"{name}\" appears more than once in the same block",
                suggestion: "Merge the duplicates into one requirement; only the last one \
                             would survive the merge.",
                example: None,
            },
            Self::RenamedNotApplied => Entry {
                message: "RENAMED Requirements blocks are not applied when archiving",
                suggestion: "Express a rename as REMOVED for the old name plus ADDED for the new one.",
                example: None,
            },
            Self::LongDescription => Entry {
                message: "requirement \"{name}\" has a very long description",
                suggestion: "Keep the description to the rule itself and move detail into \
                             scenarios or separate requirements.",
                example: None,
            },
        }
    }

    /// Message text with `{name}` filled in.
    pub fn message(self, name: &str) -> String {
        self.entry().message.replace("{name}", name)
    }

    pub fn suggestion(self) -> &'static str {
        self.entry().suggestion
    }

    pub fn example(self) -> Option<&'static str> {
        self.entry().example
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [MessageKey; 17] = [
        MessageKey::MissingProposal,
        MessageKey::MissingWhy,
        MessageKey::MissingWhatChanges,
        MessageKey::MissingImpact,
        MessageKey::MissingTasks,
        MessageKey::NoTaskList,
        MessageKey::IncompleteTasks,
        MessageKey::MissingSpecsDir,
        MessageKey::NoDeltaFile,
        MessageKey::NoDeltaMarker,
        MessageKey::NoScenario,
        MessageKey::MissingKeyword,
        MessageKey::MissingCondition,
        MessageKey::UnreadableFile,
        MessageKey::DuplicateRequirement,
        MessageKey::RenamedNotApplied,
        MessageKey::LongDescription,
    ];

    #[test]
    fn test_every_entry_has_suggestion() {
        for key in ALL {
            assert!(!key.entry().message.is_empty(), "{key:?}");
            assert!(!key.suggestion().is_empty(), "{key:?}");
        }
    }

    #[test]
    fn test_name_substitution() {
        assert_eq!(
            MessageKey::NoScenario.message("第11章"),
            "requirement \"第11章\" has no scenario"
        );
        assert_eq!(
            MessageKey::MissingProposal.message("ignored"),
            "proposal.md is missing"
        );
    }

    #[test]
    fn test_for_section() {
        assert_eq!(MessageKey::for_section("Impact"), Some(MessageKey::MissingImpact));
        assert_eq!(MessageKey::for_section("Design"), None);
    }
}
