//! CLI error handling and formatting.

use std::path::PathBuf;
use std::process::ExitCode;

use novelspec_common_config::ConfigError;
use novelspec_common_core::{Error as CoreError, ErrorCategory, ErrorCode};
use thiserror::Error;

pub mod formatter;

pub use formatter::ErrorFormatter;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// CLI error type with rich context
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{message}")]
    Config {
        message: String,
        #[source]
        source: Option<BoxError>,
        hint: Option<String>,
    },

    #[error("{message}")]
    Io {
        message: String,
        #[source]
        source: Option<BoxError>,
        path: Option<PathBuf>,
    },

    #[error("{message}")]
    Validation {
        message: String,
        hint: Option<String>,
    },

    #[error("{message}")]
    NotFound {
        message: String,
        resource_type: String,
        resource_name: String,
        suggestions: Vec<String>,
    },

    #[error("{message}")]
    User {
        message: String,
        hint: Option<String>,
    },

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Get the error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config { .. } => "E001",
            Self::Io { .. } => "E002",
            Self::Validation { .. } => "E004",
            Self::NotFound { .. } => "E005",
            Self::User { .. } => "E010",
            Self::Other(_) => "E999",
        }
    }

    /// Process exit status for this error
    pub fn exit_status(&self) -> u8 {
        match self {
            Self::Config { .. } => 2,
            Self::Io { .. } => 3,
            Self::Validation { .. } => 5,
            Self::NotFound { .. } => 6,
            Self::User { .. } | Self::Other(_) => 1,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.exit_status())
    }

    /// Get hint for this error if available
    pub fn hint(&self) -> Option<&str> {
        match self {
            Self::Config { hint, .. } | Self::Validation { hint, .. } | Self::User { hint, .. } => {
                hint.as_deref()
            }
            Self::NotFound { suggestions, .. } if !suggestions.is_empty() => {
                Some("See suggestions below")
            }
            _ => None,
        }
    }

    /// Get suggestions for this error
    pub fn suggestions(&self) -> &[String] {
        match self {
            Self::NotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    pub fn config_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: Some(hint.into()),
        }
    }

    pub fn not_found(resource_type: impl Into<String>, resource_name: impl Into<String>) -> Self {
        Self::not_found_with_suggestions(resource_type, resource_name, Vec::new())
    }

    pub fn not_found_with_suggestions(
        resource_type: impl Into<String>,
        resource_name: impl Into<String>,
        suggestions: Vec<String>,
    ) -> Self {
        let resource_type = resource_type.into();
        let resource_name = resource_name.into();
        Self::NotFound {
            message: format!("{resource_type} not found: {resource_name}"),
            resource_type,
            resource_name,
            suggestions,
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: None,
        }
    }

    pub fn validation_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }

    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: None,
        }
    }

    pub fn user_with_hint(message: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
            hint: Some(hint.into()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(Box::new(err)),
            path: None,
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(anyhow::anyhow!("JSON serialization failed: {err}"))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        let hint = match &err {
            ConfigError::NotFound { .. } => "Check the --config path or NOVELSPEC_CONFIG",
            _ => "Check novelspec/config.yaml",
        };
        Self::Config {
            message: format!("Configuration error: {err}"),
            source: Some(Box::new(err)),
            hint: Some(hint.to_string()),
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err.category() {
            ErrorCategory::FileSystem
                if matches!(
                    err.code(),
                    Some(ErrorCode::DIR_NOT_FOUND | ErrorCode::FILE_NOT_FOUND)
                ) =>
            {
                let name = err
                    .path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default();
                Self::not_found("path", name)
            }
            ErrorCategory::FileSystem => Self::Io {
                message: err.to_string(),
                path: err.path().cloned(),
                source: Some(Box::new(err)),
            },
            ErrorCategory::Validation if err.code() == Some(ErrorCode::TASKS_INCOMPLETE) => {
                Self::validation_with_hint(
                    err.to_string(),
                    "Check off every task in tasks.md before archiving",
                )
            }
            ErrorCategory::Validation | ErrorCategory::Merge => Self::validation(err.to_string()),
            ErrorCategory::Lock => Self::user_with_hint(
                err.to_string(),
                "Wait for the other run to finish, or delete the lock file if it is stale",
            ),
            ErrorCategory::Archive => Self::user(err.to_string()),
            ErrorCategory::Internal => Self::Other(anyhow::Error::new(err)),
        }
    }
}
