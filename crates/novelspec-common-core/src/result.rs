//! Result extensions.

use crate::error::{Error, Result};

/// Extension trait for Result types.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E: std::error::Error + Send + Sync + 'static> ResultExt<T>
    for std::result::Result<T, E>
{
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| Error::Internal {
            message: message.into(),
            source: Some(Box::new(e)),
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| Error::Internal {
            message: f(),
            source: Some(Box::new(e)),
        })
    }
}

/// Ensure macro - return early with a validation error if condition is false.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::error::Error::validation($msg));
        }
    };
    ($cond:expr, $code:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::error::Error::Validation {
                code: $code,
                message: $msg.into(),
            });
        }
    };
}
