//! NovelSpec common core types and utilities.

pub mod error;
pub mod result;

pub use error::{Error, ErrorCategory, ErrorCode, Result};
pub use result::ResultExt;
