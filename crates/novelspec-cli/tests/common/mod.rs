//! Common test utilities for CLI testing.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use tempfile::{tempdir, TempDir};

pub const PROPOSAL: &str = "\
# 第11-20章：宗门大比

## Why
前10章完成了主角入门和基础修炼。

## What Changes
- 新增第11-20章大纲规格

## Impact
- specs/outline/spec.md
";

pub const OUTLINE_DELTA: &str = "\
## ADDED Requirements

### Requirement: 第11章 - 宗门大比开幕
第11章应该（SHALL）开启宗门大比篇章。

#### Scenario: 大比开幕
- **WHEN** 第11章开始
- **THEN** 宗门宣布三年一度大比
";

/// Test context with a temporary project directory
pub struct TestContext {
    pub temp_dir: TempDir,
}

impl TestContext {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("Failed to create temp dir"),
        }
    }

    /// Context with `novelspec init --here` already run
    pub fn initialized() -> Self {
        let ctx = Self::new();
        ctx.command().args(["init", "测试小说", "--here"]).assert().success();
        ctx
    }

    /// Get path to temp directory
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Path under `novelspec/`
    pub fn novelspec(&self, rel: &str) -> PathBuf {
        self.path().join("novelspec").join(rel)
    }

    /// Write a file under `novelspec/`, creating parents
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let path = self.novelspec(rel);
        std::fs::create_dir_all(path.parent().expect("file has a parent"))
            .expect("Failed to create dirs");
        std::fs::write(&path, content).expect("Failed to write file");
        self
    }

    pub fn read(&self, rel: &str) -> String {
        std::fs::read_to_string(self.novelspec(rel)).expect("Failed to read file")
    }

    /// Add a change with a proposal, tasks and one outline delta
    pub fn with_change(&self, id: &str, tasks: &str) -> &Self {
        self.write(&format!("changes/{id}/proposal.md"), PROPOSAL)
            .write(&format!("changes/{id}/tasks.md"), tasks)
            .write(&format!("changes/{id}/specs/outline/spec.md"), OUTLINE_DELTA)
    }

    /// Create a command configured for this context
    pub fn command(&self) -> Command {
        let mut cmd = Command::cargo_bin("novelspec").expect("Binary not found");
        cmd.current_dir(self.path())
            .env_remove("NOVELSPEC_CONFIG")
            .env_remove("NOVELSPEC_PROJECT")
            .env_remove("NOVELSPEC_LOG_LEVEL")
            .env_remove("RUST_LOG")
            .env("NO_COLOR", "1") // Disable colors for predictable output
            .write_stdin("");
        cmd
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}

/// JSON output assertions
pub mod json {
    use serde_json::Value;

    pub fn parse_output(output: &[u8]) -> Value {
        serde_json::from_slice(output).expect("Failed to parse JSON output")
    }

    pub fn assert_error(json: &Value, code: &str) {
        assert_eq!(
            json.get("success").and_then(|v| v.as_bool()),
            Some(false),
            "Expected success: false in JSON output"
        );
        assert_eq!(
            json.get("error")
                .and_then(|e| e.get("code"))
                .and_then(|c| c.as_str()),
            Some(code),
            "Expected error code: {code}"
        );
    }
}
