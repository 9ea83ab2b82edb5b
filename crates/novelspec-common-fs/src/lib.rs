//! File system utilities for NovelSpec.

use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use novelspec_common_core::{Error, ErrorCode, Result, ResultExt};
use walkdir::WalkDir;

pub mod lock;

pub use lock::{LockFile, LockMetadata};

/// Upper bound for any markdown document read by the tool.
pub const MAX_DOCUMENT_SIZE: usize = 8 * 1024 * 1024;

/// Read a file to string with size limit.
pub fn read_to_string(path: impl AsRef<Path>, max_size: usize) -> Result<String> {
    let path = path.as_ref();

    let metadata = fs::metadata(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => Error::io(
            ErrorCode::FILE_NOT_FOUND,
            format!("file not found: {}", path.display()),
            path,
            e,
        ),
        io::ErrorKind::PermissionDenied => Error::io(
            ErrorCode::FILE_READ_ERROR,
            format!("permission denied: {}", path.display()),
            path,
            e,
        ),
        _ => Error::io(
            ErrorCode::FILE_READ_ERROR,
            format!("failed to read metadata: {}", path.display()),
            path,
            e,
        ),
    })?;

    if metadata.len() as usize > max_size {
        return Err(Error::FileSystem {
            code: ErrorCode::FILE_READ_ERROR,
            message: format!("file too large: {} bytes (max: {})", metadata.len(), max_size),
            path: Some(path.to_path_buf()),
            source: None,
        });
    }

    fs::read_to_string(path).map_err(|e| {
        Error::io(
            ErrorCode::FILE_READ_ERROR,
            format!("failed to read file: {}", path.display()),
            path,
            e,
        )
    })
}

/// Read a markdown document using the default size limit.
pub fn read_document(path: impl AsRef<Path>) -> Result<String> {
    read_to_string(path, MAX_DOCUMENT_SIZE)
}

/// Write to a file atomically (write to temp, then rename).
pub fn write_atomic(path: impl AsRef<Path>, contents: &[u8]) -> Result<()> {
    let path = path.as_ref();
    let parent = path.parent().unwrap_or(Path::new("."));

    ensure_dir(parent)?;

    let mut temp_path = path.to_path_buf();
    if let Some(name) = path.file_name() {
        temp_path.set_file_name(format!(".{}.tmp", name.to_string_lossy()));
    } else {
        temp_path.push(".tmp");
    }

    {
        let mut file = File::create(&temp_path).map_err(|e| {
            Error::io(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to create temporary file: {}", temp_path.display()),
                &temp_path,
                e,
            )
        })?;

        file.write_all(contents).map_err(|e| {
            Error::io(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to write to temporary file: {}", temp_path.display()),
                &temp_path,
                e,
            )
        })?;

        file.sync_all().map_err(|e| {
            Error::io(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to sync temporary file: {}", temp_path.display()),
                &temp_path,
                e,
            )
        })?;
    }

    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::io(
            ErrorCode::FILE_WRITE_ERROR,
            format!("failed to rename temporary file to target: {}", path.display()),
            path,
            e,
        )
    })
}

/// Write string to file atomically.
pub fn write_string_atomic(path: impl AsRef<Path>, contents: &str) -> Result<()> {
    write_atomic(path, contents.as_bytes())
}

/// Write a file only if it does not exist yet. Returns whether it was written.
pub fn write_if_absent(path: impl AsRef<Path>, contents: &str) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        return Ok(false);
    }
    write_string_atomic(path, contents)?;
    Ok(true)
}

/// Ensure a directory exists (safe directory creation).
pub fn ensure_dir(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            Error::io(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to create directory: {}", path.display()),
                path,
                e,
            )
        })?;
    }
    Ok(())
}

/// Check if a path exists and is a file.
pub fn is_file(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_file()
}

/// Check if a path exists and is a directory.
pub fn is_dir(path: impl AsRef<Path>) -> bool {
    path.as_ref().is_dir()
}

/// Delete a file if it exists.
pub fn remove_file_if_exists(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    if path.exists() {
        fs::remove_file(path).map_err(|e| {
            Error::io(
                ErrorCode::FILE_WRITE_ERROR,
                format!("failed to remove file: {}", path.display()),
                path,
                e,
            )
        })?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// List directories in a directory, sorted by name.
pub fn list_dirs(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut dirs = Vec::new();

    let read_dir = fs::read_dir(dir).map_err(|e| {
        Error::io(
            ErrorCode::FILE_READ_ERROR,
            format!("failed to read directory: {}", dir.display()),
            dir,
            e,
        )
    })?;

    for entry in read_dir {
        let entry = entry.map_err(|e| {
            Error::io(
                ErrorCode::FILE_READ_ERROR,
                format!("failed to read directory entry: {}", dir.display()),
                dir,
                e,
            )
        })?;

        let path = entry.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }

    dirs.sort();
    Ok(dirs)
}

/// Recursively find every file literally named `file_name` below `root`.
///
/// Results are in a stable, name-sorted walk order.
pub fn find_files_named(root: impl AsRef<Path>, file_name: &str) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut found = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            Error::FileSystem {
                code: ErrorCode::FILE_READ_ERROR,
                message: format!("failed to walk directory: {}", path.display()),
                path: Some(path),
                source: Some(Box::new(e)),
            }
        })?;

        if entry.file_type().is_file() && entry.file_name() == OsStr::new(file_name) {
            found.push(entry.into_path());
        }
    }

    Ok(found)
}

/// Recursively copy a directory tree.
pub fn copy_dir_all(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| Error::FileSystem {
            code: ErrorCode::FILE_READ_ERROR,
            message: format!("failed to walk directory: {}", src.display()),
            path: Some(src.to_path_buf()),
            source: Some(Box::new(e)),
        })?;

        let relative = entry
            .path()
            .strip_prefix(src)
            .with_context(|| format!("path escaped copy root: {}", entry.path().display()))?;
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            ensure_dir(&target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| {
                Error::io(
                    ErrorCode::FILE_WRITE_ERROR,
                    format!("failed to copy {} to {}", entry.path().display(), target.display()),
                    &target,
                    e,
                )
            })?;
        }
    }

    Ok(())
}

/// Move a directory to `dst`.
///
/// Uses a rename first; when that fails (typically because source and
/// destination sit on different volumes) the tree is copied and the source
/// removed. The destination must not exist.
pub fn move_dir(src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
    let src = src.as_ref();
    let dst = dst.as_ref();

    if !src.is_dir() {
        return Err(Error::dir_not_found(src));
    }
    if dst.exists() {
        return Err(Error::FileSystem {
            code: ErrorCode::FILE_EXISTS,
            message: format!("destination already exists: {}", dst.display()),
            path: Some(dst.to_path_buf()),
            source: None,
        });
    }
    if let Some(parent) = dst.parent() {
        ensure_dir(parent)?;
    }

    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(rename_err) => {
            tracing::debug!(
                src = %src.display(),
                dst = %dst.display(),
                error = %rename_err,
                "rename failed, falling back to copy"
            );

            if let Err(e) = copy_dir_all(src, dst) {
                let _ = fs::remove_dir_all(dst);
                return Err(e);
            }

            fs::remove_dir_all(src).map_err(|e| {
                Error::io(
                    ErrorCode::FILE_WRITE_ERROR,
                    format!("copied to {} but failed to remove source", dst.display()),
                    src,
                    e,
                )
            })
        }
    }
}
