//! Error types for NovelSpec.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Stable error code attached to filesystem and validation failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub &'static str);

impl ErrorCode {
    pub const FILE_NOT_FOUND: Self = Self("FS001");
    pub const FILE_READ_ERROR: Self = Self("FS002");
    pub const FILE_WRITE_ERROR: Self = Self("FS003");
    pub const DIR_NOT_FOUND: Self = Self("FS004");
    pub const FILE_EXISTS: Self = Self("FS005");
    pub const INVALID_INPUT: Self = Self("VAL001");
    pub const TASKS_INCOMPLETE: Self = Self("VAL002");
    pub const LOCKED: Self = Self("LCK001");
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Broad grouping of [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    FileSystem,
    Validation,
    Merge,
    Archive,
    Lock,
    Internal,
}

/// The main error type for NovelSpec operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Filesystem failure with the offending path.
    #[error("{message}")]
    FileSystem {
        code: ErrorCode,
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Input is structurally unusable for the requested operation.
    #[error("{message}")]
    Validation { code: ErrorCode, message: String },

    /// A delta could not be merged into its base document.
    #[error("failed to merge '{capability}': {message}")]
    Merge { capability: String, message: String },

    /// The change directory could not be archived.
    #[error("archive failed: {0}")]
    Archive(String),

    /// Another process holds the project lock.
    #[error("project is locked by {holder} ({path})")]
    Lock { holder: String, path: PathBuf },

    /// Internal error with optional cause.
    #[error("{message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl Error {
    /// Create a validation error with the generic input code.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            code: ErrorCode::INVALID_INPUT,
            message: msg.into(),
        }
    }

    /// Create a merge error for one capability.
    pub fn merge(capability: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Merge {
            capability: capability.into(),
            message: msg.into(),
        }
    }

    /// Create a directory-not-found error.
    pub fn dir_not_found(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self::FileSystem {
            code: ErrorCode::DIR_NOT_FOUND,
            message: format!("directory not found: {}", path.display()),
            path: Some(path),
            source: None,
        }
    }

    /// Wrap an I/O error that happened on `path`.
    pub fn io(
        code: ErrorCode,
        message: impl Into<String>,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::FileSystem {
            code,
            message: message.into(),
            path: Some(path.into()),
            source: Some(Box::new(source)),
        }
    }

    /// Category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileSystem { .. } => ErrorCategory::FileSystem,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::Merge { .. } => ErrorCategory::Merge,
            Self::Archive(_) => ErrorCategory::Archive,
            Self::Lock { .. } => ErrorCategory::Lock,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// Error code, when the variant carries one.
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::FileSystem { code, .. } | Self::Validation { code, .. } => Some(*code),
            Self::Lock { .. } => Some(ErrorCode::LOCKED),
            _ => None,
        }
    }

    /// Path involved in the failure, if any.
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            Self::FileSystem { path, .. } => path.as_ref(),
            Self::Lock { path, .. } => Some(path),
            _ => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Internal {
            message: format!("I/O error: {err}"),
            source: Some(Box::new(err)),
        }
    }
}

/// Result type alias using NovelSpec's Error.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_not_found_carries_path_and_code() {
        let err = Error::dir_not_found("novelspec/changes");
        assert_eq!(err.category(), ErrorCategory::FileSystem);
        assert_eq!(err.code(), Some(ErrorCode::DIR_NOT_FOUND));
        assert_eq!(err.path().unwrap(), &PathBuf::from("novelspec/changes"));
        assert!(err.to_string().contains("novelspec/changes"));
    }

    #[test]
    fn test_merge_error_message_names_capability() {
        let err = Error::merge("outline", "target is not valid UTF-8");
        assert_eq!(err.category(), ErrorCategory::Merge);
        assert_eq!(
            err.to_string(),
            "failed to merge 'outline': target is not valid UTF-8"
        );
    }

    #[test]
    fn test_io_conversion_keeps_source() {
        use std::error::Error as _;
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err: Error = io.into();
        assert_eq!(err.category(), ErrorCategory::Internal);
        assert!(err.source().is_some());
    }
}
