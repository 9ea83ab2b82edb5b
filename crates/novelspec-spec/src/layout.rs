//! On-disk layout of a NovelSpec project.
//!
//! ```text
//! <project>/
//!   chapters/
//!   novelspec/
//!     project.md
//!     config.yaml
//!     specs/<capability...>/spec.md
//!     changes/<change-id>/{proposal.md, tasks.md, design.md, specs/...}
//!     changes/archive/<YYYY-MM-DD>-<change-id>/
//! ```

use std::path::{Path, PathBuf};

use novelspec_common_core::{ensure, Error, ErrorCode, Result};
use serde::{Deserialize, Serialize};

use crate::proposal::{ProposalSummary, PROPOSAL_FILE};

/// Well-known names inside a project.
pub mod names {
    pub const NOVELSPEC_DIR: &str = "novelspec";
    pub const SPECS_DIR: &str = "specs";
    pub const CHANGES_DIR: &str = "changes";
    pub const ARCHIVE_DIR: &str = "archive";
    pub const CHAPTERS_DIR: &str = "chapters";
    pub const SPEC_FILE: &str = "spec.md";
    pub const PROJECT_FILE: &str = "project.md";
    pub const CONFIG_FILE: &str = "config.yaml";
    pub const LOCK_FILE: &str = ".archive.lock";
    pub const GITKEEP: &str = ".gitkeep";

    /// Capability directories created by `init`.
    pub const DEFAULT_CATEGORIES: [&str; 3] = ["characters", "worldbuilding", "outline"];
}

/// A delta `spec.md` inside a change's `specs/` tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaFile {
    /// Directory path between `specs/` and `spec.md`, `/`-separated.
    /// Empty when the file sits directly in `specs/`.
    pub capability: String,
    pub path: PathBuf,
}

impl DeltaFile {
    /// Capability name for reports, `unknown` for a root-level file.
    pub fn label(&self) -> &str {
        if self.capability.is_empty() {
            "unknown"
        } else {
            &self.capability
        }
    }

    /// Path for reports, relative to the change directory.
    pub fn display_path(&self) -> String {
        if self.capability.is_empty() {
            format!("{}/{}", names::SPECS_DIR, names::SPEC_FILE)
        } else {
            format!(
                "{}/{}/{}",
                names::SPECS_DIR,
                self.capability,
                names::SPEC_FILE
            )
        }
    }
}

/// `/`-joined directory components of `file`'s parent relative to `root`.
fn capability_of(root: &Path, file: &Path) -> String {
    file.parent()
        .and_then(|dir| dir.strip_prefix(root).ok())
        .map(|rel| {
            rel.components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .unwrap_or_default()
}

/// Every delta `spec.md` under `<change_dir>/specs`, in walk order.
/// Returns an empty list when `specs/` is absent.
pub fn delta_files(change_dir: impl AsRef<Path>) -> Result<Vec<DeltaFile>> {
    let specs_dir = change_dir.as_ref().join(names::SPECS_DIR);
    if !specs_dir.is_dir() {
        return Ok(Vec::new());
    }

    Ok(novelspec_common_fs::find_files_named(&specs_dir, names::SPEC_FILE)?
        .into_iter()
        .map(|path| DeltaFile {
            capability: capability_of(&specs_dir, &path),
            path,
        })
        .collect())
}

/// An active change under `changes/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub id: String,
    /// First line of the proposal's Why section
    pub description: String,
    pub path: PathBuf,
}

/// An archived change under `changes/archive/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchivedChange {
    /// Directory name, e.g. `2025-01-15-add-ch-11`
    pub id: String,
    /// `YYYY-MM-DD` prefix, empty when the name has none
    pub date: String,
    /// Change id without the date prefix
    pub name: String,
    pub path: PathBuf,
}

impl ArchivedChange {
    fn from_dir_name(id: String, path: PathBuf) -> Self {
        let (date, name) = match split_date_prefix(&id) {
            Some((date, name)) => (date.to_string(), name.to_string()),
            None => (String::new(), id.clone()),
        };
        Self {
            id,
            date,
            name,
            path,
        }
    }
}

/// Split `YYYY-MM-DD-<rest>` when the prefix is a real date.
fn split_date_prefix(name: &str) -> Option<(&str, &str)> {
    let date = name.get(..10)?;
    let rest = name.get(10..)?.strip_prefix('-')?;
    if rest.is_empty() {
        return None;
    }
    chrono::NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
    Some((date, rest))
}

/// A base spec under `specs/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpecSummary {
    /// Capability path, e.g. `characters/protagonist`
    pub name: String,
    /// First path segment, `root` for a top-level `spec.md`
    pub category: String,
    /// First line of the Purpose section
    pub purpose: String,
    pub path: PathBuf,
}

/// Resolved paths of one project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
}

impl ProjectLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn novelspec_dir(&self) -> PathBuf {
        self.root.join(names::NOVELSPEC_DIR)
    }

    pub fn specs_dir(&self) -> PathBuf {
        self.novelspec_dir().join(names::SPECS_DIR)
    }

    pub fn changes_dir(&self) -> PathBuf {
        self.novelspec_dir().join(names::CHANGES_DIR)
    }

    pub fn archive_dir(&self) -> PathBuf {
        self.changes_dir().join(names::ARCHIVE_DIR)
    }

    pub fn project_file(&self) -> PathBuf {
        self.novelspec_dir().join(names::PROJECT_FILE)
    }

    pub fn config_file(&self) -> PathBuf {
        self.novelspec_dir().join(names::CONFIG_FILE)
    }

    pub fn lock_file(&self) -> PathBuf {
        self.novelspec_dir().join(names::LOCK_FILE)
    }

    pub fn change_dir(&self, id: &str) -> PathBuf {
        self.changes_dir().join(id)
    }

    /// Base `spec.md` of a `/`-separated capability path.
    pub fn spec_file(&self, capability: &str) -> PathBuf {
        capability
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.specs_dir(), |dir, segment| dir.join(segment))
            .join(names::SPEC_FILE)
    }

    pub fn is_initialized(&self) -> bool {
        self.novelspec_dir().is_dir()
    }

    /// Resolve an existing change directory.
    pub fn require_change(&self, id: &str) -> Result<PathBuf> {
        validate_change_id(id)?;

        let changes_dir = self.changes_dir();
        if !changes_dir.is_dir() {
            return Err(Error::dir_not_found(changes_dir));
        }

        let dir = self.change_dir(id);
        if !dir.is_dir() {
            return Err(Error::dir_not_found(dir));
        }
        Ok(dir)
    }

    /// Active changes sorted by id. Empty when `changes/` is absent.
    pub fn active_changes(&self) -> Result<Vec<ChangeInfo>> {
        let changes_dir = self.changes_dir();
        if !changes_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut changes = Vec::new();
        for path in novelspec_common_fs::list_dirs(&changes_dir)? {
            let id = dir_name(&path);
            if id == names::ARCHIVE_DIR {
                continue;
            }

            let proposal = path.join(PROPOSAL_FILE);
            let description = if proposal.is_file() {
                read_for_listing(&proposal)
                    .map(|content| ProposalSummary::parse(&content).headline().to_string())
                    .unwrap_or_default()
            } else {
                String::new()
            };

            changes.push(ChangeInfo {
                id,
                description,
                path,
            });
        }
        Ok(changes)
    }

    /// Archived changes, newest date first.
    pub fn archived_changes(&self) -> Result<Vec<ArchivedChange>> {
        let archive_dir = self.archive_dir();
        if !archive_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut archived: Vec<_> = novelspec_common_fs::list_dirs(&archive_dir)?
            .into_iter()
            .map(|path| ArchivedChange::from_dir_name(dir_name(&path), path))
            .collect();
        // list_dirs is name-sorted; the stable sort keeps that order within a date
        archived.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(archived)
    }

    /// Every base spec in walk order. Empty when `specs/` is absent.
    pub fn base_specs(&self) -> Result<Vec<SpecSummary>> {
        let specs_dir = self.specs_dir();
        if !specs_dir.is_dir() {
            return Ok(Vec::new());
        }

        let mut specs = Vec::new();
        for path in novelspec_common_fs::find_files_named(&specs_dir, names::SPEC_FILE)? {
            let name = capability_of(&specs_dir, &path);
            let category = name
                .split('/')
                .next()
                .filter(|s| !s.is_empty())
                .unwrap_or("root")
                .to_string();
            let purpose = read_for_listing(&path)
                .and_then(|content| {
                    crate::proposal::section_body(&content, "Purpose")
                        .and_then(|body| body.lines().next().map(|l| l.trim().to_string()))
                })
                .unwrap_or_default();

            specs.push(SpecSummary {
                name,
                category,
                purpose,
                path,
            });
        }
        Ok(specs)
    }

    /// Create the project skeleton. Existing files are left untouched.
    ///
    /// Returns the files that were written.
    pub fn initialize(&self, project_name: &str) -> Result<Vec<PathBuf>> {
        let mut dirs = vec![
            self.specs_dir(),
            self.archive_dir(),
            self.root.join(names::CHAPTERS_DIR),
        ];
        dirs.extend(
            names::DEFAULT_CATEGORIES
                .iter()
                .map(|category| self.specs_dir().join(category)),
        );
        for dir in &dirs {
            novelspec_common_fs::ensure_dir(dir)?;
        }

        let mut written = Vec::new();
        let files = [
            (self.project_file(), project_template(project_name)),
            (self.archive_dir().join(names::GITKEEP), String::new()),
        ];
        for (path, contents) in files {
            if novelspec_common_fs::write_if_absent(&path, &contents)? {
                tracing::debug!(path = %path.display(), "created");
                written.push(path);
            }
        }

        Ok(written)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Reject ids that would escape `changes/` or collide with the archive.
pub fn validate_change_id(id: &str) -> Result<()> {
    let bad = id.is_empty()
        || id == "."
        || id == ".."
        || id == names::ARCHIVE_DIR
        || id.contains(|c: char| c == '/' || c == '\\');
    ensure!(!bad, ErrorCode::INVALID_INPUT, format!("invalid change id: '{id}'"));
    Ok(())
}

fn project_template(project_name: &str) -> String {
    format!(
        "# {project_name} Context

## 项目信息
- **小说名称**: {project_name}
- **类型**: [玄幻/武侠/都市/科幻/其他]
- **目标字数**: [例如：100]万字

## 创作原则

1. **逻辑自洽**: 世界观设定一旦确立，必须保持一致
2. **角色一致性**: 角色行为必须符合性格设定和成长轨迹
3. **情节合理性**: 情节发展需有因果逻辑

## 规格管理

- 角色规格: `novelspec/specs/characters/<name>/spec.md`
- 世界观规格: `novelspec/specs/worldbuilding/<topic>/spec.md`
- 大纲规格: `novelspec/specs/outline/spec.md`
- 变更提案: `novelspec/changes/<change-id>/`
"
    )
}

/// Listings show an empty summary for a document that cannot be read.
fn read_for_listing(path: &Path) -> Option<String> {
    match novelspec_common_fs::read_document(path) {
        Ok(content) => Some(content),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable document");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_paths() {
        let layout = ProjectLayout::new("/novel");
        assert_eq!(layout.changes_dir(), PathBuf::from("/novel/novelspec/changes"));
        assert_eq!(
            layout.archive_dir(),
            PathBuf::from("/novel/novelspec/changes/archive")
        );
        assert_eq!(
            layout.spec_file("characters/protagonist"),
            PathBuf::from("/novel/novelspec/specs/characters/protagonist/spec.md")
        );
    }

    #[test]
    fn test_initialize_never_overwrites() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());

        let written = layout.initialize("青云志").unwrap();
        assert_eq!(written.len(), 2);
        assert!(layout.specs_dir().join("outline").is_dir());
        assert!(layout.archive_dir().join(".gitkeep").is_file());
        assert!(fs::read_to_string(layout.project_file())
            .unwrap()
            .starts_with("# 青云志 Context"));

        fs::write(layout.project_file(), "mine").unwrap();
        let written = layout.initialize("other").unwrap();
        assert!(written.is_empty());
        assert_eq!(fs::read_to_string(layout.project_file()).unwrap(), "mine");
    }

    #[test]
    fn test_active_changes_skip_archive() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        layout.initialize("n").unwrap();

        let b = layout.change_dir("b-change");
        fs::create_dir_all(&b).unwrap();
        fs::write(b.join("proposal.md"), "## Why\n\n第一行\n第二行\n").unwrap();
        fs::create_dir_all(layout.change_dir("a-change")).unwrap();

        let changes = layout.active_changes().unwrap();
        let ids: Vec<_> = changes.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a-change", "b-change"]);
        assert_eq!(changes[1].description, "第一行");
    }

    #[test]
    fn test_unreadable_documents_do_not_break_listings() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        layout.initialize("n").unwrap();

        let bad = layout.change_dir("bad");
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join("proposal.md"), [0xff, 0xfe, 0x00]).unwrap();
        let good = layout.change_dir("good");
        fs::create_dir_all(&good).unwrap();
        fs::write(good.join("proposal.md"), "## Why

原因
").unwrap();

        let changes = layout.active_changes().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].id, "bad");
        assert_eq!(changes[0].description, "");
        assert_eq!(changes[1].description, "原因");

        let spec = layout.spec_file("world");
        fs::create_dir_all(spec.parent().unwrap()).unwrap();
        fs::write(&spec, [0xff, 0xfe, 0x00]).unwrap();
        let specs = layout.base_specs().unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "world");
        assert_eq!(specs[0].purpose, "");
    }

    #[test]
    fn test_archived_changes_newest_first() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        for name in ["2024-12-01-old", "2025-01-15-new", "manual"] {
            fs::create_dir_all(layout.archive_dir().join(name)).unwrap();
        }

        let archived = layout.archived_changes().unwrap();
        let names: Vec<_> = archived.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["new", "old", "manual"]);
        assert_eq!(archived[0].date, "2025-01-15");
        assert_eq!(archived[2].date, "");
    }

    #[test]
    fn test_base_specs() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        let file = layout.spec_file("characters/protagonist");
        fs::create_dir_all(file.parent().unwrap()).unwrap();
        fs::write(&file, "# 主角\n\n## Purpose\n\n陈凡的设定。\n更多。\n\n## Requirements\n").unwrap();

        let specs = layout.base_specs().unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "characters/protagonist");
        assert_eq!(specs[0].category, "characters");
        assert_eq!(specs[0].purpose, "陈凡的设定。");
    }

    #[test]
    fn test_missing_dirs_list_empty() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());
        assert!(layout.active_changes().unwrap().is_empty());
        assert!(layout.archived_changes().unwrap().is_empty());
        assert!(layout.base_specs().unwrap().is_empty());
    }

    #[test]
    fn test_require_change() {
        let dir = tempdir().unwrap();
        let layout = ProjectLayout::new(dir.path());

        let err = layout.require_change("x").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::DIR_NOT_FOUND));

        layout.initialize("n").unwrap();
        fs::create_dir_all(layout.change_dir("x")).unwrap();
        assert!(layout.require_change("x").is_ok());
        assert!(layout.require_change("archive").is_err());

        let err = layout.require_change("../x").unwrap_err();
        assert_eq!(err.code(), Some(ErrorCode::INVALID_INPUT));
        assert!(err.to_string().contains("invalid change id"));
    }

    #[test]
    fn test_delta_files() {
        let dir = tempdir().unwrap();
        let change = dir.path();
        fs::create_dir_all(change.join("specs/characters/li-jian")).unwrap();
        fs::write(change.join("specs/characters/li-jian/spec.md"), "").unwrap();
        fs::write(change.join("specs/spec.md"), "").unwrap();

        let files = delta_files(change).unwrap();
        let caps: Vec<_> = files.iter().map(|f| f.capability.as_str()).collect();
        assert_eq!(caps, vec!["characters/li-jian", ""]);
        assert_eq!(files[1].label(), "unknown");
        assert_eq!(files[0].display_path(), "specs/characters/li-jian/spec.md");
    }

    #[test]
    fn test_split_date_prefix() {
        assert_eq!(split_date_prefix("2025-01-15-x"), Some(("2025-01-15", "x")));
        assert_eq!(split_date_prefix("2025-13-15-x"), None);
        assert_eq!(split_date_prefix("2025-01-15-"), None);
        assert_eq!(split_date_prefix("short"), None);
    }
}
