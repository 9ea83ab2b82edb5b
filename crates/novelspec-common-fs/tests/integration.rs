use std::fs;

use novelspec_common_core::{ErrorCategory, ErrorCode, Result};
use novelspec_common_fs as nfs;
use tempfile::tempdir;

#[test]
fn test_integration_with_core_types() {
    let result: Result<String> = nfs::read_to_string("/nonexistent/file", 1024);
    let error = result.unwrap_err();
    assert_eq!(error.category(), ErrorCategory::FileSystem);
    assert_eq!(error.code(), Some(ErrorCode::FILE_NOT_FOUND));
}

#[test]
fn test_move_then_find() {
    let dir = tempdir().unwrap();
    let change = dir.path().join("changes/add-ch-1");
    fs::create_dir_all(change.join("specs/outline")).unwrap();
    fs::create_dir_all(change.join("specs/worldbuilding/magic-system")).unwrap();
    fs::write(change.join("specs/outline/spec.md"), "## ADDED Requirements\n").unwrap();
    fs::write(
        change.join("specs/worldbuilding/magic-system/spec.md"),
        "## MODIFIED Requirements\n",
    )
    .unwrap();

    let archived = dir.path().join("changes/archive/2025-03-01-add-ch-1");
    nfs::move_dir(&change, &archived).unwrap();

    let found = nfs::find_files_named(archived.join("specs"), "spec.md").unwrap();
    assert_eq!(found.len(), 2);
    assert!(nfs::is_dir(dir.path().join("changes/archive")));
    assert!(!nfs::is_dir(&change));
}

#[test]
fn test_move_missing_source_is_dir_not_found() {
    let dir = tempdir().unwrap();
    let err = nfs::move_dir(dir.path().join("missing"), dir.path().join("dst")).unwrap_err();
    assert_eq!(err.code(), Some(ErrorCode::DIR_NOT_FOUND));
}
