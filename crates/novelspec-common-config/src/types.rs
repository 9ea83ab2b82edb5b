//! Configuration types.

use serde::{Deserialize, Serialize};

/// Suffix used for synthesized base-document titles (`# <capability> 规格`).
pub const DEFAULT_SPEC_LABEL: &str = "规格";

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NovelSpecConfig {
    /// Title suffix of base documents created by a merge.
    pub spec_label: String,
    /// Merge engine configuration.
    pub merge: MergeConfig,
    /// Validator configuration.
    pub validation: ValidationConfig,
    /// Archive configuration.
    pub archive: ArchiveConfig,
}

impl Default for NovelSpecConfig {
    fn default() -> Self {
        Self {
            spec_label: DEFAULT_SPEC_LABEL.to_string(),
            merge: MergeConfig::default(),
            validation: ValidationConfig::default(),
            archive: ArchiveConfig::default(),
        }
    }
}

/// What to do when a MODIFIED requirement is absent from the base document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingRequirementPolicy {
    /// Leave the base document untouched.
    #[default]
    Ignore,
    /// Append the requirement as if it had been ADDED.
    Append,
    /// Fail the merge.
    Error,
}

/// Merge engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Handling of MODIFIED requirements with no match in the base.
    pub missing_requirement: MissingRequirementPolicy,
    /// Buffer every capability in memory and roll back on a failed write.
    pub atomic: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            missing_requirement: MissingRequirementPolicy::Ignore,
            atomic: true,
        }
    }
}

/// Validator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Run semantic checks even without `--strict`.
    pub strict: bool,
    /// Warn above this many description characters (0 disables).
    pub max_description_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            strict: false,
            max_description_chars: 2000,
        }
    }
}

/// Archive configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveConfig {
    /// Hold `novelspec/.archive.lock` while merging and moving.
    pub lock: bool,
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self { lock: true }
    }
}
