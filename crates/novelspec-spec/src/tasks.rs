//! `tasks.md` checklists.

use std::path::Path;

use novelspec_common_core::Result;
use serde::{Deserialize, Serialize};

/// File name of a change's task list.
pub const TASKS_FILE: &str = "tasks.md";

/// One top-level `- [ ]` / `- [x]` item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskItem {
    pub text: String,
    pub checked: bool,
    /// 1-based line number
    pub line: usize,
}

/// Parsed task list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskList {
    pub items: Vec<TaskItem>,
}

/// Counts shown by `show` and checked by `archive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskProgress {
    pub total: usize,
    pub completed: usize,
}

impl TaskProgress {
    /// Rounded completion percentage, 0 for an empty list.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u8
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}

impl TaskList {
    /// Parse top-level items. Indented (nested) items are notes, not tasks.
    pub fn parse(content: &str) -> Self {
        let items = content
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                let rest = line.strip_prefix("- [")?;
                let mut chars = rest.chars();
                let mark = chars.next()?;
                let rest = chars.as_str().strip_prefix(']')?;
                let checked = match mark {
                    ' ' => false,
                    'x' | 'X' => true,
                    _ => return None,
                };
                Some(TaskItem {
                    text: rest.trim().to_string(),
                    checked,
                    line: idx + 1,
                })
            })
            .collect();

        Self { items }
    }

    pub fn progress(&self) -> TaskProgress {
        TaskProgress {
            total: self.items.len(),
            completed: self.items.iter().filter(|t| t.checked).count(),
        }
    }

    /// Unchecked items, in file order.
    pub fn pending(&self) -> impl Iterator<Item = &TaskItem> {
        self.items.iter().filter(|t| !t.checked)
    }

    /// Load `tasks.md` from a change directory; `None` when the file is absent.
    pub fn load(change_dir: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = change_dir.as_ref().join(TASKS_FILE);
        if !novelspec_common_fs::is_file(&path) {
            return Ok(None);
        }
        let content = novelspec_common_fs::read_document(&path)?;
        Ok(Some(Self::parse(&content)))
    }
}

/// Whether every top-level task of a change is checked.
///
/// A missing `tasks.md` is never complete; a file without tasks is.
pub fn tasks_complete(change_dir: impl AsRef<Path>) -> Result<bool> {
    Ok(TaskList::load(change_dir)?
        .map(|tasks| tasks.progress().is_complete())
        .unwrap_or(false))
}
