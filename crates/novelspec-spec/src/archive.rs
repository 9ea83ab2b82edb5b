//! Archiving: merge a change's deltas into the base specs, then move the
//! change directory under `changes/archive/`.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use novelspec_common_config::NovelSpecConfig;
use novelspec_common_core::{ensure, Error, ErrorCode, Result};
use novelspec_common_fs::LockFile;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::layout::{delta_files, ProjectLayout};
use crate::merge::{apply_delta_text, MergeOptions};
use crate::parser::parse_delta;
use crate::tasks::tasks_complete;

/// A delta file that was not merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDelta {
    pub capability: String,
    pub path: PathBuf,
    pub reason: String,
}

/// Result of merging one change's deltas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeReport {
    /// Capabilities whose base spec was written, in discovery order
    pub merged: Vec<String>,
    pub skipped: Vec<SkippedDelta>,
}

impl MergeReport {
    pub fn merged_count(&self) -> usize {
        self.merged.len()
    }
}

/// Result of a completed archive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveOutcome {
    pub change_id: String,
    pub archive_path: PathBuf,
    pub merged: Vec<String>,
    pub skipped: Vec<SkippedDelta>,
}

/// A merged base document waiting to be written.
struct PendingWrite {
    capability: String,
    target: PathBuf,
    original: Option<String>,
    merged: String,
}

/// Merges and archives changes of one project.
#[derive(Debug, Clone)]
pub struct Archiver {
    layout: ProjectLayout,
    config: NovelSpecConfig,
}

impl Archiver {
    pub fn new(layout: ProjectLayout, config: NovelSpecConfig) -> Self {
        Self { layout, config }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Destination of a change archived on `date`.
    pub fn archive_path(&self, change_id: &str, date: NaiveDate) -> PathBuf {
        self.layout
            .archive_dir()
            .join(format!("{}-{change_id}", date.format("%Y-%m-%d")))
    }

    /// Merge every delta of a change into the base specs.
    ///
    /// All merged documents are computed before anything is written. With
    /// `merge.atomic` a failed write restores the files already written.
    pub fn merge_deltas(&self, change_dir: impl AsRef<Path>) -> Result<MergeReport> {
        let change_dir = change_dir.as_ref();
        let options = MergeOptions::from(&self.config);
        let mut report = MergeReport::default();
        let mut pending = Vec::new();

        for file in delta_files(change_dir)? {
            if file.capability.is_empty() {
                warn!(path = %file.path.display(), "delta spec outside a capability directory skipped");
                report.skipped.push(SkippedDelta {
                    capability: file.label().to_string(),
                    path: file.path,
                    reason: "not inside a capability directory".into(),
                });
                continue;
            }

            let content = novelspec_common_fs::read_document(&file.path)?;
            let delta = parse_delta(&content, &file.capability);
            if delta.is_empty() {
                debug!(capability = %file.capability, "delta has no operations");
                report.skipped.push(SkippedDelta {
                    capability: file.capability,
                    path: file.path,
                    reason: "no delta operations".into(),
                });
                continue;
            }

            let target = self.layout.spec_file(&file.capability);
            let original = if novelspec_common_fs::is_file(&target) {
                Some(novelspec_common_fs::read_document(&target)?)
            } else {
                None
            };
            let merged = apply_delta_text(original.as_deref(), &delta, &options)?;

            pending.push(PendingWrite {
                capability: file.capability,
                target,
                original,
                merged,
            });
        }

        if self.config.merge.atomic {
            flush_all(&pending)?;
        } else {
            for write in &pending {
                novelspec_common_fs::write_string_atomic(&write.target, &write.merged)?;
            }
        }

        for write in pending {
            info!(capability = %write.capability, path = %write.target.display(), "merged delta");
            report.merged.push(write.capability);
        }
        Ok(report)
    }

    /// Move a change directory under the archive, dated today.
    pub fn move_to_archive(&self, change_dir: impl AsRef<Path>, change_id: &str) -> Result<PathBuf> {
        self.move_to_archive_on(change_dir, change_id, Local::now().date_naive())
    }

    /// Move a change directory under the archive with an explicit date.
    pub fn move_to_archive_on(
        &self,
        change_dir: impl AsRef<Path>,
        change_id: &str,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        let destination = self.archive_path(change_id, date);
        if destination.exists() {
            return Err(Error::Archive(format!(
                "archive destination already exists: {}",
                destination.display()
            )));
        }

        novelspec_common_fs::move_dir(change_dir, &destination)?;
        info!(change = change_id, path = %destination.display(), "change archived");
        Ok(destination)
    }

    /// Archive a change: check tasks, merge its deltas, move it.
    pub fn archive(&self, change_id: &str, date: NaiveDate) -> Result<ArchiveOutcome> {
        let change_dir = self.layout.require_change(change_id)?;

        ensure!(
            tasks_complete(&change_dir)?,
            ErrorCode::TASKS_INCOMPLETE,
            format!("change '{change_id}' has unfinished tasks")
        );

        // Checked before merging so a collision never leaves merged specs behind.
        let destination = self.archive_path(change_id, date);
        if destination.exists() {
            return Err(Error::Archive(format!(
                "archive destination already exists: {}",
                destination.display()
            )));
        }

        let _lock = if self.config.archive.lock {
            Some(LockFile::acquire(
                self.layout.lock_file(),
                Some(format!("archive {change_id}")),
            )?)
        } else {
            None
        };

        let report = self.merge_deltas(&change_dir)?;
        let archive_path = self.move_to_archive_on(&change_dir, change_id, date)?;

        Ok(ArchiveOutcome {
            change_id: change_id.to_string(),
            archive_path,
            merged: report.merged,
            skipped: report.skipped,
        })
    }
}

/// Write every pending document; on failure undo the ones already written.
fn flush_all(pending: &[PendingWrite]) -> Result<()> {
    for (index, write) in pending.iter().enumerate() {
        if let Err(e) = novelspec_common_fs::write_string_atomic(&write.target, &write.merged) {
            rollback(&pending[..index]);
            return Err(Error::merge(
                &write.capability,
                format!("{e}; earlier capabilities were restored"),
            ));
        }
    }
    Ok(())
}

fn rollback(written: &[PendingWrite]) {
    for write in written.iter().rev() {
        let restored = match &write.original {
            Some(original) => novelspec_common_fs::write_string_atomic(&write.target, original),
            None => novelspec_common_fs::remove_file_if_exists(&write.target).map(|_| ()),
        };
        match restored {
            Ok(()) => debug!(capability = %write.capability, "rolled back"),
            Err(e) => warn!(
                capability = %write.capability,
                error = %e,
                "failed to roll back merged spec"
            ),
        }
    }
}
